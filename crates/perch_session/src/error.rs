//! Session error taxonomy

use perch_platform::PlatformError;
use perch_scene::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message shown when the device cannot run an AR session
pub const UNSUPPORTED_MESSAGE: &str = "AR not supported on this device";

/// Errors raised by a placement session
///
/// Messages carrying platform text keep it verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The capability probe answered no (or failed)
    #[error("AR not supported on this device")]
    CapabilityUnsupported,

    /// The platform refused or failed the session request
    #[error("{0}")]
    SessionRequestFailed(String),

    /// The primary reference space could not be acquired
    #[error("{0}")]
    ReferenceSpaceFailed(String),

    /// A hit-test source request was rejected
    #[error("{0}")]
    HitTestSourceFailed(String),

    /// The template asset failed to load
    #[error("{0}")]
    AssetLoadFailed(String),

    /// A per-frame query failed
    #[error("{0}")]
    FrameProcessing(String),

    /// The operation is not allowed in the current state
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The session ended or restarted while the operation was in flight
    #[error("operation cancelled: session ended")]
    Cancelled,
}

/// Classification of a [`SessionError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    CapabilityUnsupported,
    SessionRequestFailed,
    ReferenceSpaceFailed,
    HitTestSourceFailed,
    AssetLoadFailed,
    FrameProcessing,
    InvalidState,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CapabilityUnsupported => "capability-unsupported",
            ErrorKind::SessionRequestFailed => "session-request-failed",
            ErrorKind::ReferenceSpaceFailed => "reference-space-failed",
            ErrorKind::HitTestSourceFailed => "hit-test-source-failed",
            ErrorKind::AssetLoadFailed => "asset-load-failed",
            ErrorKind::FrameProcessing => "frame-processing",
            ErrorKind::InvalidState => "invalid-state",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::CapabilityUnsupported => ErrorKind::CapabilityUnsupported,
            SessionError::SessionRequestFailed(_) => ErrorKind::SessionRequestFailed,
            SessionError::ReferenceSpaceFailed(_) => ErrorKind::ReferenceSpaceFailed,
            SessionError::HitTestSourceFailed(_) => ErrorKind::HitTestSourceFailed,
            SessionError::AssetLoadFailed(_) => ErrorKind::AssetLoadFailed,
            SessionError::FrameProcessing(_) => ErrorKind::FrameProcessing,
            SessionError::InvalidState { .. } => ErrorKind::InvalidState,
            SessionError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether the error stops the current session attempt
    ///
    /// Terminal errors are surfaced to the user; the rest are logged only.
    pub fn is_terminal(&self) -> bool {
        match self {
            SessionError::CapabilityUnsupported
            | SessionError::SessionRequestFailed(_)
            | SessionError::ReferenceSpaceFailed(_) => true,
            SessionError::HitTestSourceFailed(_)
            | SessionError::AssetLoadFailed(_)
            | SessionError::FrameProcessing(_)
            | SessionError::InvalidState { .. }
            | SessionError::Cancelled => false,
        }
    }

    /// Text for an error banner
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub(crate) fn session_request(err: &PlatformError) -> Self {
        SessionError::SessionRequestFailed(err.to_string())
    }

    pub(crate) fn reference_space(err: &PlatformError) -> Self {
        SessionError::ReferenceSpaceFailed(err.to_string())
    }

    pub(crate) fn hit_test_source(err: &PlatformError) -> Self {
        SessionError::HitTestSourceFailed(err.to_string())
    }

    pub(crate) fn frame(err: &PlatformError) -> Self {
        SessionError::FrameProcessing(err.to_string())
    }
}

impl From<LoadError> for SessionError {
    fn from(err: LoadError) -> Self {
        SessionError::AssetLoadFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = SessionError::CapabilityUnsupported;
        assert_eq!(err.user_message(), "AR not supported on this device");
        assert!(err.is_terminal());
    }

    #[test]
    fn test_platform_text_is_verbatim() {
        let platform = PlatformError::NotAllowed("User denied camera access".into());
        let err = SessionError::session_request(&platform);
        assert_eq!(err.user_message(), "User denied camera access");
        assert_eq!(err.kind(), ErrorKind::SessionRequestFailed);
    }

    #[test]
    fn test_non_terminal() {
        assert!(!SessionError::HitTestSourceFailed("x".into()).is_terminal());
        assert!(!SessionError::from(LoadError::NotFound("a.glb".into())).is_terminal());
        assert_eq!(
            SessionError::InvalidState {
                operation: "start",
                state: "active"
            }
            .to_string(),
            "cannot start while active"
        );
    }
}
