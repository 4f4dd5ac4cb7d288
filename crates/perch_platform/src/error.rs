//! Platform error types

use thiserror::Error;

/// Errors reported by the XR platform
///
/// The `Display` form is the platform's own message, unchanged, so it can be
/// surfaced to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The requested mode or feature is not available on this device
    #[error("{0}")]
    NotSupported(String),

    /// The user or the user agent denied the request
    #[error("{0}")]
    NotAllowed(String),

    /// The call was made in a state that does not allow it
    #[error("{0}")]
    InvalidState(String),

    /// The session the call refers to has already ended
    #[error("{0}")]
    SessionEnded(String),

    /// The request was dropped before it resolved
    #[error("{0}")]
    Aborted(String),

    /// Generic platform error
    #[error("{0}")]
    Other(String),
}

impl PlatformError {
    /// Whether this error means the session is gone
    pub fn is_session_lost(&self) -> bool {
        matches!(self, PlatformError::SessionEnded(_))
    }

    /// Short name of the error class, in the style of DOMException names
    pub fn name(&self) -> &'static str {
        match self {
            PlatformError::NotSupported(_) => "NotSupportedError",
            PlatformError::NotAllowed(_) => "NotAllowedError",
            PlatformError::InvalidState(_) => "InvalidStateError",
            PlatformError::SessionEnded(_) => "SessionEndedError",
            PlatformError::Aborted(_) => "AbortError",
            PlatformError::Other(_) => "Error",
        }
    }
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
