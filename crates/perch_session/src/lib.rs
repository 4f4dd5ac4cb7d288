//! # Perch Session
//!
//! The AR placement session: acquires an immersive session from an
//! [`XrSystem`](perch_platform::XrSystem), hit-tests every frame, shows a
//! reticle where the device points, and places clones of a template object
//! into a [`SceneGraph`](perch_scene::SceneGraph) on a select gesture.
//!
//! ```text
//! Idle --start--> Requesting --granted--> Active { Tracking <-> PoseLost }
//!   |                 |                       |
//!   +--unsupported--> Ended <--end/platform/fatal--+
//! ```
//!
//! `Ended` is re-enterable: the next `start` runs a fresh session.
//!
//! ## Example
//!
//! ```rust
//! use futures::executor::LocalPool;
//! use perch_core::{Pose, Vec3};
//! use perch_platform::{ScriptedFrame, ScriptedXr};
//! use perch_scene::Scene;
//! use perch_session::{PlacementSession, SessionConfig};
//! use std::rc::Rc;
//!
//! let mut pool = LocalPool::new();
//! let session = PlacementSession::new(
//!     Rc::new(ScriptedXr::new()),
//!     Scene::new(),
//!     Rc::new(pool.spawner()),
//!     SessionConfig::default(),
//! );
//!
//! pool.run_until(session.start()).unwrap();
//!
//! // The first frame issues the hit-test source request
//! let floor = ScriptedFrame::new().with_hit(Pose::at(Vec3::new(0.0, -1.0, -1.0)));
//! session.update(0.0, &floor);
//! pool.run_until_stalled();
//!
//! session.update(16.0, &floor);
//! assert!(session.select().is_some());
//! ```

mod config;
mod error;
mod event;
mod placement;
mod session;
mod state;


pub use config::{
    ConfigError, HitTestSpace, Orientation, PlacementPolicy, SessionConfig, SurfaceFilter,
};
pub use error::{ErrorKind, SessionError, UNSUPPORTED_MESSAGE};
pub use event::{EndReason, EventEmitter, SessionEvent, SubscriptionId};
pub use placement::{PlacedObject, PlacementIndicator};
pub use session::{PlacementSession, TemplateSource};
pub use state::{Generation, SessionState, TrackingState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{PlacementPolicy, SessionConfig};
    pub use crate::error::SessionError;
    pub use crate::event::{EndReason, SessionEvent};
    pub use crate::placement::PlacedObject;
    pub use crate::session::PlacementSession;
    pub use crate::state::{SessionState, TrackingState};
}
