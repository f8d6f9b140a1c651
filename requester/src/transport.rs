//! HTTP transport seam.
//!
//! The client only distinguishes connection failures (retried) from every
//! other transport failure (surfaced immediately).

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::error::{RequesterError, RequesterResult};

#[cfg(test)]
use mockall::automock;

/// Failure sending a request or reading its body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not establish a connection.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Any other HTTP-level failure.
    #[error("http failure: {0}")]
    Http(String),
}

/// Sends flattened parameters to the API and returns the raw body.
#[cfg_attr(test, automock)]
pub trait Transport {
    fn post(&self, url: &str, params: &BTreeMap<String, String>) -> Result<String, TransportError>;
}

/// Blocking reqwest transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(verify_ssl: bool, timeout: Option<Duration>) -> RequesterResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(!verify_ssl)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RequesterError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, params: &BTreeMap<String, String>) -> Result<String, TransportError> {
        let response = self
            .client
            .post(url)
            .query(params)
            .send()
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            // The API reports failures in the XML body; keep it for decoding.
            warn!(%status, "Requester API returned non-success status");
        }

        response.text().map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new(true, None).is_ok());
        assert!(HttpTransport::new(false, Some(Duration::from_secs(5))).is_ok());
    }

    #[test]
    fn test_connection_refused_is_connect_error() {
        // Bind then drop a listener so the port is known to be closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new(true, Some(Duration::from_secs(5))).unwrap();
        let err = transport
            .post(&format!("http://127.0.0.1:{port}/"), &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TransportError::Connect("refused".into()).to_string(),
            "connection failed: refused"
        );
    }
}
