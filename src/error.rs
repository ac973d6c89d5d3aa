//! Error values carried by rejected promises and failed fetches.

use thiserror::Error as ThisError;

/// The single opaque error value a rejected promise carries.
///
/// Rejection is threaded explicitly through resolve/reject as a value of
/// this type; `Scheduler::block_on` re-raises it as the `Err` of its result.
/// `Clone` lets one rejection fan out to every child of a promise.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Socket open failure, carrying the OS error code and message.
    #[error("connection failed: {message} (os error {code})")]
    Connection { code: i32, message: String },

    /// The response had no blank-line delimiter between headers and body.
    #[error("malformed response: missing header/body delimiter")]
    Decode,

    /// The URL could not be parsed, or names a transport this client does
    /// not speak.
    #[error("invalid url: {0}")]
    Url(String),

    /// A `then`/`catch` transform failed.
    #[error("handler failed: {0}")]
    Handler(String),

    /// A promise's setup task failed before settling it.
    #[error("setup failed: {0}")]
    Setup(String),
}

impl Error {
    /// Wraps an I/O error, keeping the OS error code when one exists.
    pub(crate) fn connection(source: &std::io::Error) -> Self {
        Error::Connection {
            code: source.raw_os_error().unwrap_or(-1),
            message: source.to_string(),
        }
    }
}
