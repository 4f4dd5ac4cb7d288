//! Per-frame platform data

use crate::error::PlatformError;
use crate::types::{EntityType, HitTestSource, ReferenceSpace};
use perch_core::Pose;

/// A single hit-test intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitTestResult {
    /// Intersection pose; +Y is the surface normal
    pub pose: Pose,
    /// What was hit, when the platform reports it
    pub entity: Option<EntityType>,
}

impl HitTestResult {
    pub fn new(pose: Pose) -> Self {
        Self { pose, entity: None }
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entity = Some(entity);
        self
    }
}

/// Frame object supplied by the platform to the animation loop
pub trait XrFrame {
    /// Pose of the viewer in `space`, `None` while tracking is lost
    fn viewer_pose(&self, space: &ReferenceSpace) -> Option<Pose>;

    /// Hit-test results of `source` for this frame, with poses in `space`
    ///
    /// Ordered by the platform; the first entry is the nearest candidate.
    /// [`PlatformError::SessionEnded`] means the session is gone.
    fn hit_test_results(
        &self,
        source: &HitTestSource,
        space: &ReferenceSpace,
    ) -> Result<Vec<HitTestResult>, PlatformError>;
}
