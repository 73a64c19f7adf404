//! Error types for the `AuthZ` decision module.

use thiserror::Error;

/// Errors raised while producing or enforcing an authorization decision.
///
/// Infrastructure failures (`ServiceUnavailable`, `MalformedResponse`, ...)
/// are never read as allow or deny. Deliberate rejections carry their own
/// variants so gates can pick the exact status code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecisionError {
    /// The PDP or the user-management service could not be reached, timed out
    /// or answered with a failure status.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The PDP answered with a body that is not a canonical decision.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The decision request could not be built or is invalid.
    #[error("invalid decision request: {0}")]
    InvalidRequest(String),

    /// No verified identity where one is required.
    #[error("{0}")]
    Unauthenticated(String),

    /// Identity present but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// The PDP did not grant `operation_uri` unconditionally.
    #[error("you are not permitted to perform `{operation_uri}` on required resources.")]
    AuthorizationDenied { operation_uri: String },

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DecisionError {
    #[must_use]
    pub fn denied(operation_uri: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            operation_uri: operation_uri.into(),
        }
    }

    /// `true` for deliberate 401/403 outcomes, `false` for failures.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated(_) | Self::Forbidden(_) | Self::AuthorizationDenied { .. }
        )
    }
}
