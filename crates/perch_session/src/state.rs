//! Lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracking sub-state of an active session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingState {
    /// The last frame produced a hit; the indicator holds its pose
    Tracking,
    /// No hit on the last frame; placement is rejected
    #[default]
    PoseLost,
}

/// Lifecycle of a placement session
///
/// `Idle -> Requesting -> Active { Tracking | PoseLost } -> Ended`, and back
/// to `Requesting` from `Ended` on the next start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SessionState {
    #[default]
    Idle,
    Requesting,
    Active { tracking: TrackingState },
    Ended,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }

    pub fn is_tracking(&self) -> bool {
        matches!(
            self,
            SessionState::Active {
                tracking: TrackingState::Tracking
            }
        )
    }

    /// Whether `start` may be called
    pub fn can_start(&self) -> bool {
        match self {
            SessionState::Idle | SessionState::Ended => true,
            SessionState::Requesting | SessionState::Active { .. } => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Requesting => "requesting",
            SessionState::Active {
                tracking: TrackingState::Tracking,
            } => "tracking",
            SessionState::Active {
                tracking: TrackingState::PoseLost,
            } => "pose-lost",
            SessionState::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Session generation
///
/// Bumped by every start and every teardown. Asynchronous continuations
/// capture the value current when they were issued and discard their result
/// when it has moved on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn bump(&mut self) -> Generation {
        self.0 += 1;
        *self
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_start() {
        assert!(SessionState::Idle.can_start());
        assert!(SessionState::Ended.can_start());
        assert!(!SessionState::Requesting.can_start());
        assert!(!SessionState::Active {
            tracking: TrackingState::Tracking
        }
        .can_start());
    }

    #[test]
    fn test_generation_bump() {
        let mut generation = Generation::default();
        let first = generation.bump();
        assert_eq!(first.value(), 1);
        assert!(generation.bump() > first);
    }
}
