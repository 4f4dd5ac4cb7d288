//! The placement session

use crate::config::{HitTestSpace, PlacementPolicy, SessionConfig};
use crate::error::SessionError;
use crate::event::{EndReason, EventEmitter, SessionEvent, SubscriptionId};
use crate::placement::{ColorVariation, ModelNamer, PlacedObject, PlacementIndicator};
use crate::state::{Generation, SessionState, TrackingState};
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::task::{LocalSpawn, LocalSpawnExt};
use perch_core::{Pose, Vec3};
use perch_platform::{
    HitTestOptions, HitTestSource, PlatformError, ReferenceSpace, ReferenceSpaceKind,
    SessionHandle, XrFrame, XrSystem,
};
use perch_scene::{
    placeholder_template, reticle_template, AssetLoader, Object3D, ObjectId, SceneGraph,
};
use std::cell::{Ref, RefCell, RefMut};
use std::future::Future;
use std::rc::Rc;

/// Where the current template object came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSource {
    /// The built-in cube
    Placeholder,
    /// An asset loaded from this URL
    Asset(String),
    /// Installed with [`PlacementSession::set_template`]
    Custom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HitTestSlot {
    /// Not requested yet, or the last request failed
    Absent,
    /// A request is in flight
    Pending,
    Ready(HitTestSource),
    /// Failed too often; no further requests this session
    Exhausted,
}

struct Inner<S> {
    config: SessionConfig,
    scene: S,
    state: SessionState,
    generation: Generation,
    unsupported: bool,
    session: Option<SessionHandle>,
    reference_space: Option<ReferenceSpace>,
    viewer_space: Option<ReferenceSpace>,
    hit_test: HitTestSlot,
    hit_test_failures: u32,
    indicator: PlacementIndicator,
    reticle: ObjectId,
    template: Object3D,
    template_source: TemplateSource,
    placed: Vec<PlacedObject>,
    placement_done: bool,
    namer: ModelNamer,
    colors: ColorVariation,
    last_timestamp: Option<f64>,
    last_error: Option<SessionError>,
}

/// An AR placement session
///
/// Owns at most one platform session at a time: acquires it on
/// [`start`](Self::start), hit-tests every [`update`](Self::update), places a
/// clone of the template object on [`select`](Self::select), and releases
/// everything on [`end`](Self::end). After ending it can be started again.
///
/// Cloning yields another handle to the same session. Everything runs on one
/// thread; asynchronous continuations are scheduled on the supplied
/// spawner and discarded when the session has moved to a newer generation.
pub struct PlacementSession<S: SceneGraph + 'static> {
    inner: Rc<RefCell<Inner<S>>>,
    events: Rc<EventEmitter>,
    xr: Rc<dyn XrSystem>,
    spawner: Rc<dyn LocalSpawn>,
}

impl<S: SceneGraph + 'static> Clone for PlacementSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            events: self.events.clone(),
            xr: self.xr.clone(),
            spawner: self.spawner.clone(),
        }
    }
}

impl<S: SceneGraph + 'static> PlacementSession<S> {
    /// Create an idle session
    ///
    /// Adds the hidden reticle to `scene` and installs the placeholder cube as
    /// the template until [`load_template`](Self::load_template) replaces it.
    pub fn new(
        xr: Rc<dyn XrSystem>,
        mut scene: S,
        spawner: Rc<dyn LocalSpawn>,
        config: SessionConfig,
    ) -> Self {
        let reticle = scene.add_object(reticle_template());
        let template = placeholder_template(config.placeholder_size);
        let colors = ColorVariation::new(config.color_seed);

        tracing::debug!(platform = xr.name(), "placement session created");

        let inner = Inner {
            config,
            scene,
            state: SessionState::Idle,
            generation: Generation::default(),
            unsupported: false,
            session: None,
            reference_space: None,
            viewer_space: None,
            hit_test: HitTestSlot::Absent,
            hit_test_failures: 0,
            indicator: PlacementIndicator::default(),
            reticle,
            template,
            template_source: TemplateSource::Placeholder,
            placed: Vec::new(),
            placement_done: false,
            namer: ModelNamer::default(),
            colors,
            last_timestamp: None,
            last_error: None,
        };

        Self {
            inner: Rc::new(RefCell::new(inner)),
            events: Rc::new(EventEmitter::new()),
            xr,
            spawner,
        }
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register an observer; it sees every event from now on
    pub fn subscribe(&self, listener: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Remove an observer; returns `false` if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Template
    // ------------------------------------------------------------------

    /// Load the configured template asset
    ///
    /// On failure the placeholder cube stays in use and the error is recorded
    /// in [`last_error`](Self::last_error); the session is not affected.
    pub fn load_template(&self, loader: &dyn AssetLoader) -> LocalBoxFuture<'static, TemplateSource> {
        let url = self.inner.borrow().config.template_url.clone();
        let Some(url) = url else {
            tracing::debug!("no template_url configured, using placeholder");
            return future::ready(TemplateSource::Placeholder).boxed_local();
        };

        let load = loader.load(&url);
        let this = self.clone();
        async move {
            let result = load.await;
            let mut guard = this.inner.borrow_mut();
            let inner = &mut *guard;
            match result {
                Ok(mut object) => {
                    tracing::info!("template loaded from {}", url);
                    object.visible = true;
                    inner.template = object;
                    inner.template_source = TemplateSource::Asset(url.clone());
                    TemplateSource::Asset(url)
                }
                Err(e) => {
                    tracing::warn!("failed to load template {}: {}; using placeholder", url, e);
                    inner.last_error = Some(SessionError::from(e));
                    inner.template = placeholder_template(inner.config.placeholder_size);
                    inner.template_source = TemplateSource::Placeholder;
                    TemplateSource::Placeholder
                }
            }
        }
        .boxed_local()
    }

    /// Replace the template object
    pub fn set_template(&self, template: Object3D) {
        let mut inner = self.inner.borrow_mut();
        inner.template = template;
        inner.template_source = TemplateSource::Custom;
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Signal that the surrounding scene is ready
    ///
    /// Spawns [`start`](Self::start) when `auto_start` is configured and the
    /// session can start. Returns whether a start was spawned.
    pub fn scene_ready(&self) -> bool {
        {
            let inner = self.inner.borrow();
            if !inner.config.auto_start || !inner.state.can_start() {
                return false;
            }
        }

        let start = self.start();
        self.spawn(async move {
            if let Err(e) = start.await {
                tracing::debug!("auto start did not complete: {}", e);
            }
        })
    }

    /// Acquire a platform session and enter `Active`
    ///
    /// Allowed from `Idle` and `Ended`. Resolves once the session is active
    /// or the attempt has failed; failures also reach observers as `error`
    /// followed by `ended`.
    pub fn start(&self) -> LocalBoxFuture<'static, Result<(), SessionError>> {
        let this = self.clone();
        async move { this.run_start().await }.boxed_local()
    }

    async fn run_start(&self) -> Result<(), SessionError> {
        let (generation, previous, mode, unsupported) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.can_start() {
                return Err(SessionError::InvalidState {
                    operation: "start",
                    state: inner.state.name(),
                });
            }
            let previous = inner.state;
            let generation = inner.generation.bump();
            // The probe already counts as requesting so `end` can cancel it
            inner.state = SessionState::Requesting;
            (generation, previous, inner.config.mode, inner.unsupported)
        };
        let _abandon = AbandonGuard {
            session: self,
            generation,
            previous,
        };

        // Capability probe; a rejected probe counts as unsupported
        let supported = if unsupported {
            false
        } else {
            self.xr
                .is_session_supported(mode)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("capability probe failed: {}", e);
                    false
                })
        };

        let (init, bind) = {
            let mut inner = self.inner.borrow_mut();
            if inner.generation != generation {
                tracing::debug!("start cancelled during capability probe");
                return Err(SessionError::Cancelled);
            }
            if !supported {
                inner.unsupported = true;
                let err = SessionError::CapabilityUnsupported;
                tracing::error!("{} ({})", err, mode);
                inner.state = SessionState::Ended;
                inner.generation.bump();
                inner.last_error = Some(err.clone());
                self.events.queue(SessionEvent::Error {
                    kind: err.kind(),
                    message: err.user_message(),
                });
                self.events.queue(SessionEvent::Ended {
                    reason: EndReason::Failed,
                });
                drop(inner);
                self.events.flush();
                return Err(err);
            }

            tracing::info!("requesting {} session", mode);
            (inner.config.session_init(), inner.config.hit_test_space)
        };

        let handle = match self.xr.request_session(mode, &init).await {
            Ok(handle) => handle,
            Err(e) => {
                return Err(self.fail_start(generation, SessionError::session_request(&e)));
            }
        };

        {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if inner.generation != generation {
                tracing::debug!("session {} granted after cancellation, ending it", handle.id());
                drop(guard);
                self.spawn_end(handle);
                return Err(SessionError::Cancelled);
            }
            inner.session = Some(handle);
            if let Err(e) = inner.scene.bind_session(Some(&handle)) {
                drop(guard);
                return Err(self.fail_start(generation, SessionError::session_request(&e)));
            }
        }

        let kind = self.inner.borrow().config.reference_space;
        let reference_space = self.xr.request_reference_space(&handle, kind).await;
        let reference_space = match reference_space {
            Ok(space) if self.is_current(generation) => space,
            Ok(_) => return Err(SessionError::Cancelled),
            Err(e) => {
                return Err(self.fail_start(generation, SessionError::reference_space(&e)));
            }
        };
        self.inner.borrow_mut().reference_space = Some(reference_space);

        if bind == HitTestSpace::Viewer && kind != ReferenceSpaceKind::Viewer {
            let viewer = self
                .xr
                .request_reference_space(&handle, ReferenceSpaceKind::Viewer)
                .await;
            if !self.is_current(generation) {
                return Err(SessionError::Cancelled);
            }
            match viewer {
                Ok(space) => self.inner.borrow_mut().viewer_space = Some(space),
                Err(e) => {
                    tracing::warn!("viewer space unavailable ({}), hit-testing from {}", e, kind)
                }
            }
        }

        {
            let mut inner = self.inner.borrow_mut();
            if inner.generation != generation {
                return Err(SessionError::Cancelled);
            }
            inner.state = SessionState::Active {
                tracking: TrackingState::PoseLost,
            };
            tracing::info!(session = handle.id(), generation = %generation, "session active");
        }
        self.events.emit(SessionEvent::Ready);
        Ok(())
    }

    /// Tear down a failed start attempt and report `err`
    fn fail_start(&self, generation: Generation, err: SessionError) -> SessionError {
        let mut inner = self.inner.borrow_mut();
        if inner.generation != generation {
            return SessionError::Cancelled;
        }

        tracing::error!("session start failed: {}", err);
        inner.last_error = Some(err.clone());
        self.events.queue(SessionEvent::Error {
            kind: err.kind(),
            message: err.user_message(),
        });
        let handle = self.teardown(&mut inner, EndReason::Failed);
        drop(inner);

        if let Some(handle) = handle {
            self.spawn_end(handle);
        }
        self.events.flush();
        err
    }

    /// End the session on request
    ///
    /// Returns `false` when there is nothing to end.
    pub fn end(&self) -> bool {
        let handle = {
            let mut inner = self.inner.borrow_mut();
            match inner.state {
                SessionState::Requesting | SessionState::Active { .. } => {}
                SessionState::Idle | SessionState::Ended => return false,
            }
            tracing::info!("ending session");
            self.teardown(&mut inner, EndReason::Requested)
        };

        if let Some(handle) = handle {
            self.spawn_end(handle);
        }
        self.events.flush();
        true
    }

    /// The platform ended the session, e.g. the user left AR
    pub fn handle_platform_end(&self) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            match inner.state {
                SessionState::Requesting | SessionState::Active { .. } => {}
                SessionState::Idle | SessionState::Ended => return false,
            }
            tracing::info!("session ended by platform");
            self.teardown(&mut inner, EndReason::Platform);
        }
        self.events.flush();
        true
    }

    /// Enter `Ended` and release every per-session resource
    ///
    /// Placed objects stay in the scene. Returns the platform session, which
    /// the caller ends unless the platform already did.
    fn teardown(&self, inner: &mut Inner<S>, reason: EndReason) -> Option<SessionHandle> {
        inner.generation.bump();
        inner.state = SessionState::Ended;

        if let HitTestSlot::Ready(source) = inner.hit_test {
            self.xr.cancel_hit_test_source(&source);
        }
        inner.hit_test = HitTestSlot::Absent;
        inner.hit_test_failures = 0;
        inner.reference_space = None;
        inner.viewer_space = None;

        inner.placed.clear();
        inner.placement_done = false;
        inner.indicator.hide();
        let reticle = inner.reticle;
        inner.scene.set_visible(reticle, false);
        // No frames run after this; entrance animations would freeze mid-way
        inner.scene.settle_animations();
        inner.last_timestamp = None;

        if let Err(e) = inner.scene.bind_session(None) {
            tracing::warn!("failed to unbind renderer: {}", e);
        }

        self.events.queue(SessionEvent::Ended { reason });
        let handle = inner.session.take();
        match reason {
            EndReason::Requested | EndReason::Failed => handle,
            EndReason::Platform | EndReason::Fatal => None,
        }
    }

    // ------------------------------------------------------------------
    // Per-frame update
    // ------------------------------------------------------------------

    /// Process one rendered frame
    ///
    /// Does nothing unless the session is `Active`. Requests the hit-test
    /// source on first opportunity, then moves the indicator to the first
    /// acceptable hit or hides it when there is none.
    pub fn update(&self, timestamp_ms: f64, frame: &dyn XrFrame) {
        self.process_frame(timestamp_ms, frame);
        self.events.flush();
    }

    fn process_frame(&self, timestamp_ms: f64, frame: &dyn XrFrame) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;

        let SessionState::Active { tracking } = inner.state else {
            return;
        };

        let dt = inner
            .last_timestamp
            .map(|last| (timestamp_ms - last).max(0.0))
            .unwrap_or(0.0);
        inner.last_timestamp = Some(timestamp_ms);
        inner.scene.advance(dt as f32);

        if inner.hit_test == HitTestSlot::Absent {
            self.request_hit_test_source(inner);
        }

        let (HitTestSlot::Ready(source), Some(space)) = (inner.hit_test, inner.reference_space)
        else {
            return;
        };

        let hits = if frame.viewer_pose(&space).is_none() {
            tracing::debug!("no viewer pose at {:.1}ms", timestamp_ms);
            Vec::new()
        } else {
            match frame.hit_test_results(&source, &space) {
                Ok(hits) => hits,
                Err(e) => {
                    self.frame_error(inner, e);
                    return;
                }
            }
        };

        let filter = inner.config.surface_filter;
        let hit = hits.iter().find(|h| filter.accepts(&h.pose)).map(|h| h.pose);
        let reticle = inner.reticle;

        match hit {
            Some(pose) => {
                if !inner.placement_done {
                    inner.indicator.show_at(pose);
                    inner.scene.set_pose(reticle, &pose);
                    inner.scene.set_visible(reticle, true);
                }
                inner.state = SessionState::Active {
                    tracking: TrackingState::Tracking,
                };
                if tracking == TrackingState::PoseLost {
                    tracing::debug!("tracking acquired");
                    self.events.queue(SessionEvent::TrackingAcquired { pose });
                }
            }
            None => {
                inner.indicator.hide();
                inner.scene.set_visible(reticle, false);
                inner.state = SessionState::Active {
                    tracking: TrackingState::PoseLost,
                };
                if tracking == TrackingState::Tracking {
                    tracing::debug!("tracking lost");
                    self.events.queue(SessionEvent::TrackingLost);
                }
            }
        }
    }

    fn frame_error(&self, inner: &mut Inner<S>, error: PlatformError) {
        let err = SessionError::frame(&error);
        inner.last_error = Some(err.clone());

        if error.is_session_lost() {
            tracing::error!("frame reported session loss: {}", error);
            self.events.queue(SessionEvent::Error {
                kind: err.kind(),
                message: err.user_message(),
            });
            self.teardown(inner, EndReason::Fatal);
        } else {
            tracing::warn!("skipping frame: {}", error);
        }
    }

    /// Issue the hit-test source request without waiting for it
    fn request_hit_test_source(&self, inner: &mut Inner<S>) {
        let Some(session) = inner.session else {
            return;
        };
        let space = match inner.config.hit_test_space {
            HitTestSpace::Viewer => inner.viewer_space.or(inner.reference_space),
            HitTestSpace::Reference => inner.reference_space,
        };
        let Some(space) = space else {
            return;
        };

        let options = HitTestOptions::new(space)
            .with_entity_types(inner.config.entity_types.iter().copied());
        let request = self.xr.request_hit_test_source(&session, options);
        let generation = inner.generation;
        inner.hit_test = HitTestSlot::Pending;
        tracing::debug!("requesting hit-test source from {} space", space.kind());

        let this = self.clone();
        let spawned = self.spawn(async move {
            let result = request.await;
            this.hit_test_source_resolved(generation, result);
        });
        if !spawned {
            inner.hit_test = HitTestSlot::Absent;
        }
    }

    fn hit_test_source_resolved(
        &self,
        generation: Generation,
        result: Result<HitTestSource, PlatformError>,
    ) {
        let mut inner = self.inner.borrow_mut();

        if inner.generation != generation {
            tracing::debug!("discarding hit-test source from stale generation {}", generation);
            if let Ok(source) = result {
                self.xr.cancel_hit_test_source(&source);
            }
            return;
        }

        match result {
            Ok(source) => {
                tracing::info!("hit-test source {} ready", source.id());
                inner.hit_test = HitTestSlot::Ready(source);
                inner.hit_test_failures = 0;
            }
            Err(e) => {
                inner.hit_test_failures += 1;
                tracing::warn!(
                    attempt = inner.hit_test_failures,
                    "hit-test source request failed: {}",
                    e
                );
                inner.last_error = Some(SessionError::hit_test_source(&e));
                inner.hit_test = match inner.config.max_hit_test_attempts {
                    Some(max) if inner.hit_test_failures >= max => {
                        tracing::warn!("giving up on hit testing after {} attempts", max);
                        HitTestSlot::Exhausted
                    }
                    _ => HitTestSlot::Absent,
                };
            }
        }
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Placement gesture
    ///
    /// Places a clone of the template at the indicator's pose. A no-op
    /// returning `None` unless the session is tracking, or when a single-shot
    /// session has already placed its object.
    pub fn select(&self) -> Option<PlacedObject> {
        let placed = self.place();
        self.events.flush();
        placed
    }

    fn place(&self) -> Option<PlacedObject> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;

        match inner.state {
            SessionState::Active {
                tracking: TrackingState::Tracking,
            } => {}
            SessionState::Active {
                tracking: TrackingState::PoseLost,
            }
            | SessionState::Idle
            | SessionState::Requesting
            | SessionState::Ended => {
                tracing::debug!("select ignored while {}", inner.state);
                return None;
            }
        }
        if inner.placement_done {
            tracing::debug!("select ignored, single-shot placement already made");
            return None;
        }
        let hit_pose = inner.indicator.pose()?;

        let pose = inner.config.orientation.apply(&hit_pose);
        let name = inner.namer.next_name();
        let mut object = inner.scene.clone_template(&inner.template, &name);
        object.set_pose(&pose);
        object.movable = inner.config.movable;
        if inner.config.color_variation {
            object.material.color = inner.colors.next_color();
        }

        let id = inner.scene.add_object(object);
        if let Some(entrance) = inner.config.entrance {
            inner.scene.animate_scale(id, entrance);
        }

        let record = PlacedObject {
            id,
            name,
            pose,
            index: inner.placed.len(),
        };
        inner.placed.push(record.clone());
        tracing::info!("placed {} at {:?}", record.name, pose.position);

        if inner.config.placement == PlacementPolicy::SingleShot {
            inner.placement_done = true;
            inner.indicator.hide();
            let reticle = inner.reticle;
            inner.scene.set_visible(reticle, false);
        }

        self.events.queue(SessionEvent::Placed {
            object: record.clone(),
        });
        Some(record)
    }

    /// Drag a movable object to `position`
    ///
    /// Works on any object this session placed, including those from earlier
    /// sessions. Returns `false` for unknown or non-movable objects.
    pub fn move_object(&self, id: ObjectId, position: Vec3) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            match inner.scene.object(id) {
                Some(object) if object.movable && id != inner.reticle => {}
                _ => return false,
            }
            inner.scene.set_position(id, position);
            if let Some(record) = inner.placed.iter_mut().find(|p| p.id == id) {
                record.pose.position = position;
            }
            self.events.queue(SessionEvent::Moved { id, position });
        }
        self.events.flush();
        true
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.inner.borrow().state
    }

    /// Placement indicator as of the last processed frame
    pub fn indicator(&self) -> PlacementIndicator {
        self.inner.borrow().indicator
    }

    /// Objects placed during the current session, in placement order
    pub fn placed_objects(&self) -> Vec<PlacedObject> {
        self.inner.borrow().placed.clone()
    }

    /// Number of objects placed during the current session
    pub fn placed_count(&self) -> usize {
        self.inner.borrow().placed.len()
    }

    /// Configured placement policy
    pub fn placement_policy(&self) -> PlacementPolicy {
        self.inner.borrow().config.placement
    }

    /// The hit-test source, once granted
    pub fn hit_test_source(&self) -> Option<HitTestSource> {
        match self.inner.borrow().hit_test {
            HitTestSlot::Ready(source) => Some(source),
            HitTestSlot::Absent | HitTestSlot::Pending | HitTestSlot::Exhausted => None,
        }
    }

    /// Whether a hit-test source request is in flight
    pub fn hit_test_pending(&self) -> bool {
        self.inner.borrow().hit_test == HitTestSlot::Pending
    }

    /// Reference space that poses are reported in
    pub fn reference_space(&self) -> Option<ReferenceSpace> {
        self.inner.borrow().reference_space
    }

    /// The platform session while one is held
    pub fn session_handle(&self) -> Option<SessionHandle> {
        self.inner.borrow().session
    }

    /// Current epoch; bumped by every start and teardown
    pub fn generation(&self) -> Generation {
        self.inner.borrow().generation
    }

    /// Most recent error, fatal or not
    pub fn last_error(&self) -> Option<SessionError> {
        self.inner.borrow().last_error.clone()
    }

    /// Where the current template came from
    pub fn template_source(&self) -> TemplateSource {
        self.inner.borrow().template_source.clone()
    }

    /// Pose a placement would use right now
    pub fn placement_pose(&self) -> Option<Pose> {
        let inner = self.inner.borrow();
        inner
            .indicator
            .pose()
            .map(|pose| inner.config.orientation.apply(&pose))
    }

    /// Scene handle of the reticle
    pub fn reticle(&self) -> ObjectId {
        self.inner.borrow().reticle
    }

    /// The session config
    pub fn config(&self) -> Ref<'_, SessionConfig> {
        Ref::map(self.inner.borrow(), |inner| &inner.config)
    }

    /// Borrow the scene graph
    pub fn scene(&self) -> Ref<'_, S> {
        Ref::map(self.inner.borrow(), |inner| &inner.scene)
    }

    /// Mutably borrow the scene graph
    pub fn scene_mut(&self) -> RefMut<'_, S> {
        RefMut::map(self.inner.borrow_mut(), |inner| &mut inner.scene)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn is_current(&self, generation: Generation) -> bool {
        self.inner.borrow().generation == generation
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) -> bool {
        match self.spawner.spawn_local(task) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to spawn session task: {}", e);
                false
            }
        }
    }

    fn spawn_end(&self, handle: SessionHandle) {
        let end = self.xr.end_session(&handle);
        self.spawn(async move {
            if let Err(e) = end.await {
                tracing::warn!("platform failed to end session {}: {}", handle.id(), e);
            }
        });
    }
}

/// Rolls back a `start` whose future was dropped before it finished
///
/// Only acts while that attempt is still current and `Requesting`; every
/// completed path has already left that state or moved the generation on.
struct AbandonGuard<'a, S: SceneGraph + 'static> {
    session: &'a PlacementSession<S>,
    generation: Generation,
    previous: SessionState,
}

impl<S: SceneGraph + 'static> Drop for AbandonGuard<'_, S> {
    fn drop(&mut self) {
        let Ok(mut guard) = self.session.inner.try_borrow_mut() else {
            return;
        };
        let inner = &mut *guard;
        if inner.generation != self.generation || inner.state != SessionState::Requesting {
            return;
        }

        tracing::debug!("start abandoned, returning to {}", self.previous);
        inner.generation.bump();
        inner.state = self.previous;
        inner.reference_space = None;
        inner.viewer_space = None;
        let handle = inner.session.take();
        if handle.is_some() {
            if let Err(e) = inner.scene.bind_session(None) {
                tracing::warn!("failed to unbind renderer: {}", e);
            }
        }
        drop(guard);

        if let Some(handle) = handle {
            self.session.spawn_end(handle);
        }
    }
}
