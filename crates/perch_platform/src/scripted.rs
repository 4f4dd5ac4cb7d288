//! Scripted in-process XR backend
//!
//! Resolves every request from explicit configuration instead of a device.
//! Requests can be made to fail once, or be held pending until the caller
//! resolves them, which is how out-of-order completion is reproduced.

use crate::error::PlatformError;
use crate::frame::{HitTestResult, XrFrame};
use crate::types::{
    Feature, HitTestOptions, HitTestSource, ReferenceSpace, ReferenceSpaceKind, SessionHandle,
    SessionInit, SessionMode,
};
use crate::xr::{PlatformFuture, XrSystem};
use futures::channel::oneshot;
use futures::FutureExt;
use perch_core::Pose;
use std::cell::RefCell;
use std::collections::VecDeque;

type Reply<T> = oneshot::Sender<Result<T, PlatformError>>;

/// Deterministic [`XrSystem`] for simulation and tests
pub struct ScriptedXr {
    state: RefCell<ScriptState>,
}

struct ScriptState {
    supported: Result<bool, PlatformError>,
    unsupported_features: Vec<Feature>,
    session_failures: VecDeque<PlatformError>,
    reference_space_failures: VecDeque<PlatformError>,
    hit_test_failures: VecDeque<PlatformError>,
    defer_probes: bool,
    defer_sessions: bool,
    defer_hit_test_sources: bool,
    pending_probes: VecDeque<Reply<bool>>,
    pending_sessions: VecDeque<Reply<SessionHandle>>,
    pending_hit_test_sources: VecDeque<(ReferenceSpaceKind, Reply<HitTestSource>)>,
    next_id: u64,
    live_sessions: Vec<SessionHandle>,
    ended_sessions: Vec<SessionHandle>,
    live_sources: Vec<HitTestSource>,
    cancelled_sources: Vec<HitTestSource>,
    probe_calls: usize,
    session_requests: usize,
    reference_space_requests: Vec<ReferenceSpaceKind>,
    hit_test_source_requests: usize,
    last_session_init: Option<SessionInit>,
}

impl Default for ScriptState {
    fn default() -> Self {
        Self {
            supported: Ok(true),
            unsupported_features: Vec::new(),
            session_failures: VecDeque::new(),
            reference_space_failures: VecDeque::new(),
            hit_test_failures: VecDeque::new(),
            defer_probes: false,
            defer_sessions: false,
            defer_hit_test_sources: false,
            pending_probes: VecDeque::new(),
            pending_sessions: VecDeque::new(),
            pending_hit_test_sources: VecDeque::new(),
            next_id: 1,
            live_sessions: Vec::new(),
            ended_sessions: Vec::new(),
            live_sources: Vec::new(),
            cancelled_sources: Vec::new(),
            probe_calls: 0,
            session_requests: 0,
            reference_space_requests: Vec::new(),
            hit_test_source_requests: 0,
            last_session_init: None,
        }
    }
}

impl ScriptState {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn open_session(&mut self) -> SessionHandle {
        let handle = SessionHandle::new(self.allocate_id());
        self.live_sessions.push(handle);
        handle
    }

    fn open_source(&mut self, space: ReferenceSpaceKind) -> HitTestSource {
        let source = HitTestSource::new(self.allocate_id(), space);
        self.live_sources.push(source);
        source
    }
}

fn ready<T: 'static>(result: Result<T, PlatformError>) -> PlatformFuture<T> {
    futures::future::ready(result).boxed_local()
}

fn pending<T: 'static>(rx: oneshot::Receiver<Result<T, PlatformError>>) -> PlatformFuture<T> {
    async move {
        rx.await
            .unwrap_or_else(|_| Err(PlatformError::Aborted("request was dropped".into())))
    }
    .boxed_local()
}

impl ScriptedXr {
    /// A device that supports immersive AR and grants every request
    pub fn new() -> Self {
        Self {
            state: RefCell::new(ScriptState::default()),
        }
    }

    /// Set the answer of the capability probe
    pub fn set_supported(&self, supported: bool) {
        self.state.borrow_mut().supported = Ok(supported);
    }

    /// Make the capability probe itself reject
    pub fn fail_probe(&self, error: PlatformError) {
        self.state.borrow_mut().supported = Err(error);
    }

    /// Session requests requiring `feature` fail with `NotSupported`
    pub fn set_unsupported_feature(&self, feature: Feature) {
        let mut state = self.state.borrow_mut();
        if !state.unsupported_features.contains(&feature) {
            state.unsupported_features.push(feature);
        }
    }

    /// Queue a rejection for the next session request
    pub fn fail_next_session(&self, error: PlatformError) {
        self.state.borrow_mut().session_failures.push_back(error);
    }

    /// Queue a rejection for the next reference space request
    pub fn fail_next_reference_space(&self, error: PlatformError) {
        self.state.borrow_mut().reference_space_failures.push_back(error);
    }

    /// Queue a rejection for the next hit-test source request
    pub fn fail_next_hit_test_source(&self, error: PlatformError) {
        self.state.borrow_mut().hit_test_failures.push_back(error);
    }

    /// Hold capability probes pending until [`resolve_probe`](Self::resolve_probe)
    pub fn defer_probes(&self, defer: bool) {
        self.state.borrow_mut().defer_probes = defer;
    }

    /// Answer the oldest pending capability probe
    ///
    /// Returns `false` when no probe was pending.
    pub fn resolve_probe(&self, supported: bool) -> bool {
        let reply = self.state.borrow_mut().pending_probes.pop_front();
        match reply {
            Some(reply) => {
                let _ = reply.send(Ok(supported));
                true
            }
            None => false,
        }
    }

    /// Number of capability probes still pending
    pub fn pending_probes(&self) -> usize {
        self.state.borrow().pending_probes.len()
    }

    /// Hold session requests pending until [`resolve_session`](Self::resolve_session)
    pub fn defer_sessions(&self, defer: bool) {
        self.state.borrow_mut().defer_sessions = defer;
    }

    /// Hold hit-test source requests pending until
    /// [`resolve_hit_test_source`](Self::resolve_hit_test_source)
    pub fn defer_hit_test_sources(&self, defer: bool) {
        self.state.borrow_mut().defer_hit_test_sources = defer;
    }

    /// Grant the oldest pending session request
    pub fn resolve_session(&self) -> Option<SessionHandle> {
        let mut state = self.state.borrow_mut();
        let reply = state.pending_sessions.pop_front()?;
        let handle = state.open_session();
        // A dropped receiver means the requester is gone; the session stays live
        let _ = reply.send(Ok(handle));
        Some(handle)
    }

    /// Reject the oldest pending session request
    pub fn reject_session(&self, error: PlatformError) -> bool {
        let reply = self.state.borrow_mut().pending_sessions.pop_front();
        match reply {
            Some(reply) => {
                let _ = reply.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Grant the oldest pending hit-test source request
    pub fn resolve_hit_test_source(&self) -> Option<HitTestSource> {
        let mut state = self.state.borrow_mut();
        let (space, reply) = state.pending_hit_test_sources.pop_front()?;
        let source = state.open_source(space);
        let _ = reply.send(Ok(source));
        Some(source)
    }

    /// Reject the oldest pending hit-test source request
    pub fn reject_hit_test_source(&self, error: PlatformError) -> bool {
        let pending = self.state.borrow_mut().pending_hit_test_sources.pop_front();
        match pending {
            Some((_, reply)) => {
                let _ = reply.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Number of capability probes made
    pub fn probe_calls(&self) -> usize {
        self.state.borrow().probe_calls
    }

    /// Number of session requests made
    pub fn session_requests(&self) -> usize {
        self.state.borrow().session_requests
    }

    /// Kinds of every reference space requested, in order
    pub fn reference_space_requests(&self) -> Vec<ReferenceSpaceKind> {
        self.state.borrow().reference_space_requests.clone()
    }

    /// Number of hit-test source requests made
    pub fn hit_test_source_requests(&self) -> usize {
        self.state.borrow().hit_test_source_requests
    }

    /// Number of hit-test source requests still pending
    pub fn pending_hit_test_sources(&self) -> usize {
        self.state.borrow().pending_hit_test_sources.len()
    }

    /// The init dictionary of the most recent session request
    pub fn last_session_init(&self) -> Option<SessionInit> {
        self.state.borrow().last_session_init.clone()
    }

    pub fn live_sessions(&self) -> Vec<SessionHandle> {
        self.state.borrow().live_sessions.clone()
    }

    pub fn ended_sessions(&self) -> Vec<SessionHandle> {
        self.state.borrow().ended_sessions.clone()
    }

    pub fn live_hit_test_sources(&self) -> Vec<HitTestSource> {
        self.state.borrow().live_sources.clone()
    }

    pub fn cancelled_hit_test_sources(&self) -> Vec<HitTestSource> {
        self.state.borrow().cancelled_sources.clone()
    }
}

impl Default for ScriptedXr {
    fn default() -> Self {
        Self::new()
    }
}

impl XrSystem for ScriptedXr {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_session_supported(&self, mode: SessionMode) -> PlatformFuture<bool> {
        let mut state = self.state.borrow_mut();
        state.probe_calls += 1;
        let answer = match mode {
            SessionMode::Inline => Ok(true),
            _ => state.supported.clone(),
        };
        if state.defer_probes && mode != SessionMode::Inline {
            let (tx, rx) = oneshot::channel();
            state.pending_probes.push_back(tx);
            return pending(rx);
        }
        tracing::trace!(%mode, ?answer, "scripted capability probe");
        ready(answer)
    }

    fn request_session(&self, mode: SessionMode, init: &SessionInit) -> PlatformFuture<SessionHandle> {
        let mut state = self.state.borrow_mut();
        state.session_requests += 1;
        state.last_session_init = Some(init.clone());

        if let Some(error) = state.session_failures.pop_front() {
            return ready(Err(error));
        }
        if !matches!(state.supported, Ok(true)) && mode != SessionMode::Inline {
            return ready(Err(PlatformError::NotSupported(format!(
                "The specified session configuration is not supported: {mode}"
            ))));
        }
        if let Some(missing) = init
            .required_features
            .iter()
            .find(|f| state.unsupported_features.contains(*f))
        {
            return ready(Err(PlatformError::NotSupported(format!(
                "Required feature '{missing}' is not supported"
            ))));
        }

        if state.defer_sessions {
            let (tx, rx) = oneshot::channel();
            state.pending_sessions.push_back(tx);
            return pending(rx);
        }

        let handle = state.open_session();
        tracing::trace!(session = handle.id(), "scripted session granted");
        ready(Ok(handle))
    }

    fn request_reference_space(
        &self,
        session: &SessionHandle,
        kind: ReferenceSpaceKind,
    ) -> PlatformFuture<ReferenceSpace> {
        let mut state = self.state.borrow_mut();
        state.reference_space_requests.push(kind);

        if let Some(error) = state.reference_space_failures.pop_front() {
            return ready(Err(error));
        }
        if !state.live_sessions.contains(session) {
            return ready(Err(PlatformError::SessionEnded(
                "The session has already ended".into(),
            )));
        }

        let space = ReferenceSpace::new(state.allocate_id(), kind);
        ready(Ok(space))
    }

    fn request_hit_test_source(
        &self,
        session: &SessionHandle,
        options: HitTestOptions,
    ) -> PlatformFuture<HitTestSource> {
        let mut state = self.state.borrow_mut();
        state.hit_test_source_requests += 1;

        if let Some(error) = state.hit_test_failures.pop_front() {
            return ready(Err(error));
        }
        if !state.live_sessions.contains(session) {
            return ready(Err(PlatformError::SessionEnded(
                "The session has already ended".into(),
            )));
        }

        let kind = options.space.kind();
        if state.defer_hit_test_sources {
            let (tx, rx) = oneshot::channel();
            state.pending_hit_test_sources.push_back((kind, tx));
            return pending(rx);
        }

        ready(Ok(state.open_source(kind)))
    }

    fn cancel_hit_test_source(&self, source: &HitTestSource) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.live_sources.iter().position(|s| s == source) {
            state.live_sources.remove(index);
            state.cancelled_sources.push(*source);
        }
    }

    fn end_session(&self, session: &SessionHandle) -> PlatformFuture<()> {
        let mut state = self.state.borrow_mut();
        match state.live_sessions.iter().position(|s| s == session) {
            Some(index) => {
                state.live_sessions.remove(index);
                state.ended_sessions.push(*session);
                ready(Ok(()))
            }
            None => ready(Err(PlatformError::InvalidState(
                "The session has already ended".into(),
            ))),
        }
    }
}

/// Frame with fixed contents
#[derive(Clone, Debug)]
pub struct ScriptedFrame {
    viewer: Option<Pose>,
    hits: Vec<HitTestResult>,
    error: Option<PlatformError>,
}

impl ScriptedFrame {
    /// A tracked frame with no surface under the reticle
    pub fn new() -> Self {
        Self {
            viewer: Some(Pose::IDENTITY),
            hits: Vec::new(),
            error: None,
        }
    }

    pub fn with_viewer(mut self, pose: Option<Pose>) -> Self {
        self.viewer = pose;
        self
    }

    pub fn with_hit(mut self, pose: Pose) -> Self {
        self.hits.push(HitTestResult::new(pose));
        self
    }

    pub fn with_results(mut self, results: impl IntoIterator<Item = HitTestResult>) -> Self {
        self.hits.extend(results);
        self
    }

    /// Hit-test queries on this frame fail with `error`
    pub fn with_error(mut self, error: PlatformError) -> Self {
        self.error = Some(error);
        self
    }
}

impl Default for ScriptedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl XrFrame for ScriptedFrame {
    fn viewer_pose(&self, _space: &ReferenceSpace) -> Option<Pose> {
        self.viewer
    }

    fn hit_test_results(
        &self,
        _source: &HitTestSource,
        _space: &ReferenceSpace,
    ) -> Result<Vec<HitTestResult>, PlatformError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.hits.clone()),
        }
    }
}
