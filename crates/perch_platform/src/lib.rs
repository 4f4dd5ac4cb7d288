//! Perch Platform Abstraction Layer
//!
//! This crate provides platform-agnostic traits and types for acquiring an
//! immersive AR session and querying it every frame.
//!
//! # Architecture
//!
//! The abstraction is built around two traits:
//!
//! - [`XrSystem`] - capability probe, session / reference space / hit-test
//!   source acquisition and session teardown
//! - [`XrFrame`] - per-frame viewer pose and hit-test results
//!
//! All asynchronous calls return a [`PlatformFuture`]: a `'static`, non-`Send`
//! boxed future. Platforms run on a single logical thread and continuations
//! are scheduled on that same thread.
//!
//! # Platform Implementations
//!
//! - [`ScriptedXr`] - deterministic in-process backend driven by explicit
//!   calls, used by the `perch` simulator and in tests
//!
//! # Example
//!
//! ```ignore
//! use perch_platform::*;
//!
//! async fn probe(xr: &dyn XrSystem) -> bool {
//!     xr.is_session_supported(SessionMode::ImmersiveAr)
//!         .await
//!         .unwrap_or(false)
//! }
//! ```

mod error;
mod frame;
mod scripted;
mod types;
mod xr;

pub use error::{PlatformError, Result};
pub use frame::{HitTestResult, XrFrame};
pub use scripted::{ScriptedFrame, ScriptedXr};
pub use types::{
    EntityType, Feature, HitTestOptions, HitTestSource, ReferenceSpace, ReferenceSpaceKind,
    SessionHandle, SessionInit, SessionMode,
};
pub use xr::{PlatformFuture, XrSystem};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::frame::{HitTestResult, XrFrame};
    pub use crate::types::{
        EntityType, Feature, HitTestOptions, HitTestSource, ReferenceSpace, ReferenceSpaceKind,
        SessionHandle, SessionInit, SessionMode,
    };
    pub use crate::xr::{PlatformFuture, XrSystem};
}
