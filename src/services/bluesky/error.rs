//! Typed failures of the Bluesky client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlueskyError {
    /// Identifier or app password missing; never retried
    #[error("Bluesky integration not configured: {0}")]
    Config(String),

    /// The service refused to create (or re-create) a session
    #[error("Bluesky {operation} rejected (status {status:?}): {detail}")]
    Authentication {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },

    /// Non-success HTTP status from an XRPC call
    #[error("Bluesky request to {url} failed with status {status}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Bluesky request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Listing {url} exceeded {pages} pages")]
    PageLimitExceeded { url: String, pages: usize },

    #[error("Bluesky request cancelled")]
    Cancelled,
}

impl BlueskyError {
    /// The service rejected the credential attached to the call.
    ///
    /// Bluesky answers expired or revoked tokens with either 400 or 401.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, BlueskyError::Status { status: 400 | 401, .. })
    }

}
