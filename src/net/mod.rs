//! Non-blocking HTTP client primitives.
//!
//! - [`fetch`]: single-shot HTTP/1.1 GET polled once per scheduler tick
//! - [`url`]: extracts host, port, path, and query from a URL string
//! - [`response`]: splits a complete response into header block and body
//!
//! [`fetch`]: fetch::fetch

pub mod fetch;
pub mod response;
pub mod url;
