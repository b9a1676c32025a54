use thiserror::Error;

/// Errors from [`crate::feed::TrafficFeed`] requests.
///
/// URLs are recorded without their query string so the API key never ends
/// up in a log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Request URL without query.
        url: String,
        /// Transport error message.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}: {message}")]
    Http {
        /// Request URL without query.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },
    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL without query.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The response body was not the expected JSON.
    #[error("failed to parse response from {url}: {message}")]
    Parse {
        /// Request URL without query.
        url: String,
        /// Parser message.
        message: String,
    },
    /// The configured host does not form a valid URL.
    #[error("invalid API URL {url:?}: {message}")]
    InvalidUrl {
        /// Offending URL text.
        url: String,
        /// Parser message.
        message: String,
    },
    /// The caller cancelled the request.
    #[error("request to {url} was cancelled")]
    Cancelled {
        /// Request URL without query.
        url: String,
    },
    /// The blocking bridge could not drive the request to completion.
    #[error("traffic feed runtime failed: {message}")]
    Runtime {
        /// What went wrong.
        message: String,
    },
}
