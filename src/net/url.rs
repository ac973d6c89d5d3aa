//! URL decomposition for the fetch client.

use crate::error::Error;

use url::Url;

/// The pieces of a URL the wire protocol needs.
pub struct Target {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Option<String>,
}

impl Target {
    /// Splits a URL string into host, port (default 80), path (default `/`),
    /// and optional query.
    ///
    /// Only plain `http` is supported; any other scheme is refused.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let parsed = Url::parse(raw).map_err(|err| Error::Url(err.to_string()))?;

        if parsed.scheme() != "http" {
            return Err(Error::Url(format!(
                "unsupported scheme `{}`",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Url("missing host".to_string()))?
            .to_string();

        Ok(Target {
            host,
            port: parsed.port().unwrap_or(80),
            path: match parsed.path() {
                "" => "/".to_string(),
                path => path.to_string(),
            },
            query: parsed.query().map(str::to_string),
        })
    }

    /// The request-line target: path plus optional query.
    pub fn request_target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}
