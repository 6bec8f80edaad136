use thiserror::Error;

/// Errors returned by a profile lookup.
///
/// Every transport, protocol, and payload failure is folded into one of these
/// variants — [`crate::ProfileClient::lookup`] never surfaces a raw `reqwest`
/// or `serde_json` error and never panics on upstream input.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The caller passed an empty or whitespace-only username.
    #[error("username must not be empty")]
    EmptyUsername,

    /// Construction-time failure: the configured endpoint is not a valid URL.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The request exceeded the client's total timeout budget.
    #[error("profile API timed out")]
    Timeout(#[source] reqwest::Error),

    /// Connection, DNS, or TLS failure before a response arrived.
    #[error("network error reaching profile API")]
    Network(#[source] reqwest::Error),

    /// The upstream answered with a non-200 HTTP status.
    #[error("profile API returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    /// The response body was not parseable JSON.
    #[error("profile API returned a malformed body")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
    },

    /// The payload parsed but carried no positive success indicator.
    ///
    /// `message` is the upstream's own explanation when it sent one, or a
    /// generic not-found text otherwise.
    #[error("profile not found: {message}")]
    NotFound { message: String },
}

impl LookupError {
    /// Classify a `reqwest` transport failure as timeout or network error.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout(err)
        } else {
            LookupError::Network(err)
        }
    }
}
