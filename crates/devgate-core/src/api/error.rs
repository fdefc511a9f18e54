//! Typed errors for backend calls, plus the classification that drives the
//! login retry policy.

use thiserror::Error;

/// Backend error code that signals a two-factor code is required to finish
/// logging in. The only code with dedicated retry handling.
pub const CODE_TWO_FACTOR_REQUIRED: u32 = 1246;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend rejected the request with a structured error.
    #[error("{message} (code {code})")]
    Backend { code: u32, message: String },

    /// The request did not complete within the transport timeout.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure (connection refused, TLS, DNS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the documented shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// How the login protocol reacts to a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Re-prompt for a two-factor code and retry the login exactly once.
    TwoFactorRequired,
    /// Terminal for the attempt: sessions are cleared and the message is
    /// surfaced to the user.
    Authentication,
}

impl ApiError {
    /// Classify this error for the retry policy. Kept as an explicit mapping
    /// so the policy stays testable as more codes grow special handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Backend {
                code: CODE_TWO_FACTOR_REQUIRED,
                ..
            } => ErrorKind::TwoFactorRequired,
            _ => ErrorKind::Authentication,
        }
    }
}
