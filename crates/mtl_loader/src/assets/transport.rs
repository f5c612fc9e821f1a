//! Byte transport collaborator
//!
//! Everything the loader downloads (MTL text and texture binaries) goes through
//! a [`Transport`]. Production code uses [`HttpTransport`]; tests script
//! failures with in-memory implementations.

use futures::future::BoxFuture;
use thiserror::Error;

/// Transport failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Request never produced a response
    #[error("Request to {url} failed: {reason}")]
    Request {
        /// Requested URL
        url: String,
        /// Reason reported by the transport
        reason: String,
    },

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// URL could not be parsed
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

/// Fetches raw bytes for a URL
pub trait Transport: Send + Sync {
    /// Download the body behind `url`
    fn get(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, TransportError>>;
}

/// HTTP transport backed by `ehttp`
#[cfg(feature = "http")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn get(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, TransportError>> {
        use futures::FutureExt;

        let url = url.to_string();
        async move {
            let parsed = url::Url::parse(&url).map_err(|_| TransportError::InvalidUrl(url.clone()))?;

            let response = ehttp::fetch_async(ehttp::Request::get(parsed.as_str()))
                .await
                .map_err(|reason| TransportError::Request { url: url.clone(), reason })?;

            if !response.ok {
                return Err(TransportError::Status { url, status: response.status });
            }

            log::trace!("Fetched {} bytes from {}", response.bytes.len(), url);
            Ok(response.bytes)
        }
        .boxed()
    }
}
