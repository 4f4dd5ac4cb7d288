//! XR system trait

use crate::error::PlatformError;
use crate::types::{
    HitTestOptions, HitTestSource, ReferenceSpace, ReferenceSpaceKind, SessionHandle, SessionInit,
    SessionMode,
};
use futures::future::LocalBoxFuture;

/// Future returned by every asynchronous platform call
///
/// `'static` so it can be spawned fire-and-forget; not `Send` because the
/// platform is single-threaded.
pub type PlatformFuture<T> = LocalBoxFuture<'static, Result<T, PlatformError>>;

/// Platform abstraction for immersive sessions
///
/// Implemented by each backend to provide a unified interface for acquiring
/// sessions and their tracking resources. Every method is non-blocking; a
/// rejected future carries the platform's error text.
pub trait XrSystem {
    /// Get the platform name
    fn name(&self) -> &'static str;

    /// Whether sessions of `mode` can be created on this device
    fn is_session_supported(&self, mode: SessionMode) -> PlatformFuture<bool>;

    /// Request an immersive session
    fn request_session(&self, mode: SessionMode, init: &SessionInit) -> PlatformFuture<SessionHandle>;

    /// Request a reference space of `kind` for `session`
    fn request_reference_space(
        &self,
        session: &SessionHandle,
        kind: ReferenceSpaceKind,
    ) -> PlatformFuture<ReferenceSpace>;

    /// Request a hit-test source casting from `options.space`
    fn request_hit_test_source(
        &self,
        session: &SessionHandle,
        options: HitTestOptions,
    ) -> PlatformFuture<HitTestSource>;

    /// Release a hit-test source
    fn cancel_hit_test_source(&self, source: &HitTestSource);

    /// Ask the platform to end `session`
    fn end_session(&self, session: &SessionHandle) -> PlatformFuture<()>;
}
