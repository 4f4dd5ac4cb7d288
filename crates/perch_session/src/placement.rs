//! Placement indicator and placed objects

use perch_core::{Color, Pose};
use perch_scene::ObjectId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The reticle shown at the targeted surface point
///
/// Holds a pose only while visible; hiding it discards the pose.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlacementIndicator {
    pose: Option<Pose>,
}

impl PlacementIndicator {
    pub fn is_visible(&self) -> bool {
        self.pose.is_some()
    }

    /// Pose a placement gesture would use right now
    pub fn pose(&self) -> Option<Pose> {
        self.pose
    }

    pub(crate) fn show_at(&mut self, pose: Pose) {
        self.pose = Some(pose);
    }

    pub(crate) fn hide(&mut self) {
        self.pose = None;
    }
}

/// Record of an object placed by a session
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    /// Scene handle of the object
    pub id: ObjectId,
    /// Unique name, `model-<n>`
    pub name: String,
    /// World pose given at placement
    pub pose: Pose,
    /// Position in this session's placement order
    pub index: usize,
}

/// Issues `model-<n>` names, unique for the lifetime of the session object
#[derive(Debug, Default)]
pub(crate) struct ModelNamer {
    next: u64,
}

impl ModelNamer {
    pub(crate) fn next_name(&mut self) -> String {
        let name = format!("model-{}", self.next);
        self.next += 1;
        name
    }
}

/// Random hue per placed object
pub(crate) struct ColorVariation {
    rng: StdRng,
}

impl ColorVariation {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    pub(crate) fn next_color(&mut self) -> Color {
        let hue = self.rng.random_range(0.0..360.0);
        Color::from_hsl(hue, 0.7, 0.55)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::Vec3;

    #[test]
    fn test_indicator_forgets_pose_when_hidden() {
        let mut indicator = PlacementIndicator::default();
        assert!(!indicator.is_visible());

        indicator.show_at(Pose::at(Vec3::new(0.0, 0.0, -1.0)));
        assert!(indicator.is_visible());

        indicator.hide();
        assert!(indicator.pose().is_none());
    }

    #[test]
    fn test_model_names() {
        let mut namer = ModelNamer::default();
        assert_eq!(namer.next_name(), "model-0");
        assert_eq!(namer.next_name(), "model-1");
    }

    #[test]
    fn test_seeded_colors_repeat() {
        let mut a = ColorVariation::new(Some(7));
        let mut b = ColorVariation::new(Some(7));
        for _ in 0..4 {
            assert_eq!(a.next_color(), b.next_color());
        }
    }
}
