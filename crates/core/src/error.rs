//! Pipeline error model.

use thiserror::Error;

/// Result type used across the pipeline.
pub type GateResult<T> = Result<T, GateError>;

/// Every failure the pipeline knows how to translate into an HTTP response.
///
/// The `Display` text of the client-facing kinds (`Unauthenticated`,
/// `Forbidden`, `BadRequest`) is what callers see; the detail carried by the
/// server-side kinds is for logs only.
#[derive(Debug, Error)]
pub enum GateError {
    /// No credentials, or credentials that could not be verified.
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid credentials without the privilege the route requires.
    #[error("{0}")]
    Forbidden(String),

    /// The request itself was malformed.
    #[error("{0}")]
    BadRequest(String),

    /// No route matched the request.
    #[error("not found")]
    NotFound,

    /// A response payload could not be transformed for transmission.
    #[error("response encryption failed: {0}")]
    Encryption(String),

    /// Storage or another upstream provider could not be reached.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Anything else, including programmer errors in handlers.
    #[error("unclassified error: {0:#}")]
    Unclassified(#[from] anyhow::Error),
}

impl GateError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn encryption(msg: impl Into<String>) -> Self {
        Self::Encryption(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn unclassified(msg: impl Into<String>) -> Self {
        Self::Unclassified(anyhow::anyhow!(msg.into()))
    }

    /// Whether the failure was caused by the server rather than the caller.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Encryption(_) | Self::UpstreamUnavailable(_) | Self::Unclassified(_)
        )
    }
}
