//! Session configuration
//!
//! A [`SessionConfig`] is usually read from a `perch.toml` file; every field
//! is optional and falls back to the behavior of the reference demo:
//!
//! ```toml
//! mode = "immersive-ar"
//! required_features = ["hit-test"]
//! optional_features = ["dom-overlay"]
//! overlay_root = "overlay"
//! reference_space = "local"
//! hit_test_space = "viewer"
//! placement = "repeated"
//! orientation = "surface"
//! template_url = "models/chair.glb"
//!
//! [surface_filter]
//! kind = "horizontal"
//! max_tilt_degrees = 20.0
//!
//! [entrance]
//! from = 0.01
//! to = 0.2
//! duration_ms = 300
//! easing = "ease-out-elastic"
//! ```

use perch_core::{Pose, Vec3};
use perch_platform::{EntityType, Feature, ReferenceSpaceKind, SessionInit, SessionMode};
use perch_scene::ScaleAnimation;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or validating a [`SessionConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Space the hit-test ray is cast from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HitTestSpace {
    /// A dedicated viewer space: the ray follows the device's forward axis
    #[default]
    Viewer,
    /// The session's primary reference space
    Reference,
}

/// How many objects a session may place
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    /// Every accepted gesture places a new object
    #[default]
    Repeated,
    /// One object per session; the indicator is retired after it
    SingleShot,
}

/// Orientation given to placed objects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Take the hit pose orientation; the object's +Y follows the surface normal
    #[default]
    Surface,
    /// Keep the identity rotation and use only the hit position
    Upright,
}

impl Orientation {
    /// Pose an object takes when placed at `hit`
    pub fn apply(&self, hit: &Pose) -> Pose {
        match self {
            Orientation::Surface => *hit,
            Orientation::Upright => Pose::at(hit.position),
        }
    }
}

/// Which hit-test results are acceptable
///
/// Results keep the platform's order; the first one passing the filter wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SurfaceFilter {
    /// First result, unfiltered
    #[default]
    Any,
    /// Floors and tables: surface normal within `max_tilt_degrees` of up
    Horizontal {
        #[serde(default = "default_max_tilt")]
        max_tilt_degrees: f32,
    },
    /// Walls: surface normal within `max_tilt_degrees` of the horizon
    Vertical {
        #[serde(default = "default_max_tilt")]
        max_tilt_degrees: f32,
    },
}

fn default_max_tilt() -> f32 {
    15.0
}

impl SurfaceFilter {
    /// Whether a hit with `pose` passes the filter
    pub fn accepts(&self, pose: &Pose) -> bool {
        let tilt = pose.up().normalize().dot(Vec3::UP).clamp(-1.0, 1.0).acos().to_degrees();
        match *self {
            SurfaceFilter::Any => true,
            SurfaceFilter::Horizontal { max_tilt_degrees } => tilt <= max_tilt_degrees,
            SurfaceFilter::Vertical { max_tilt_degrees } => (tilt - 90.0).abs() <= max_tilt_degrees,
        }
    }

    fn max_tilt(&self) -> Option<f32> {
        match *self {
            SurfaceFilter::Any => None,
            SurfaceFilter::Horizontal { max_tilt_degrees }
            | SurfaceFilter::Vertical { max_tilt_degrees } => Some(max_tilt_degrees),
        }
    }
}

/// Configuration of a placement session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub mode: SessionMode,

    /// Features the session cannot run without
    #[serde(default = "default_required_features")]
    pub required_features: Vec<Feature>,

    /// Features used when granted
    #[serde(default = "default_optional_features")]
    pub optional_features: Vec<Feature>,

    /// Root element of the DOM overlay
    #[serde(default)]
    pub overlay_root: Option<String>,

    /// Kind of the primary reference space
    #[serde(default)]
    pub reference_space: ReferenceSpaceKind,

    #[serde(default)]
    pub hit_test_space: HitTestSpace,

    /// Entity types the hit-test source reports
    #[serde(default = "default_entity_types")]
    pub entity_types: SmallVec<[EntityType; 2]>,

    #[serde(default)]
    pub placement: PlacementPolicy,

    #[serde(default)]
    pub surface_filter: SurfaceFilter,

    #[serde(default)]
    pub orientation: Orientation,

    /// Template asset; the placeholder cube is used when unset or unloadable
    #[serde(default)]
    pub template_url: Option<String>,

    /// Edge length of the placeholder cube, in model units
    #[serde(default = "default_placeholder_size")]
    pub placeholder_size: f32,

    /// Scale animation played on each placed object
    #[serde(default = "default_entrance")]
    pub entrance: Option<ScaleAnimation>,

    /// Give each placed object a random hue
    #[serde(default)]
    pub color_variation: bool,

    /// Seed for color variation, random when unset
    #[serde(default)]
    pub color_seed: Option<u64>,

    /// Placed objects accept drag repositioning
    #[serde(default)]
    pub movable: bool,

    /// Start as soon as the scene reports ready
    #[serde(default)]
    pub auto_start: bool,

    /// Give up requesting a hit-test source after this many failures
    #[serde(default)]
    pub max_hit_test_attempts: Option<u32>,
}

fn default_required_features() -> Vec<Feature> {
    vec![Feature::HitTest]
}

fn default_optional_features() -> Vec<Feature> {
    vec![Feature::DomOverlay]
}

fn default_entity_types() -> SmallVec<[EntityType; 2]> {
    smallvec![EntityType::Plane]
}

fn default_placeholder_size() -> f32 {
    1.0
}

fn default_entrance() -> Option<ScaleAnimation> {
    Some(ScaleAnimation::default())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::default(),
            required_features: default_required_features(),
            optional_features: default_optional_features(),
            overlay_root: None,
            reference_space: ReferenceSpaceKind::default(),
            hit_test_space: HitTestSpace::default(),
            entity_types: default_entity_types(),
            placement: PlacementPolicy::default(),
            surface_filter: SurfaceFilter::default(),
            orientation: Orientation::default(),
            template_url: None,
            placeholder_size: default_placeholder_size(),
            entrance: default_entrance(),
            color_variation: false,
            color_seed: None,
            movable: false,
            auto_start: false,
            max_hit_test_attempts: None,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize as pretty TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.placeholder_size.is_finite() && self.placeholder_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "placeholder_size must be positive, got {}",
                self.placeholder_size
            )));
        }
        if let Some(tilt) = self.surface_filter.max_tilt() {
            if !(0.0..=90.0).contains(&tilt) {
                return Err(ConfigError::Invalid(format!(
                    "max_tilt_degrees must be within 0..=90, got {}",
                    tilt
                )));
            }
        }
        if let Some(entrance) = &self.entrance {
            if entrance.duration_ms < 0.0 || entrance.from <= 0.0 || entrance.to <= 0.0 {
                return Err(ConfigError::Invalid(
                    "entrance needs positive scales and a non-negative duration".to_string(),
                ));
            }
        }
        if self.max_hit_test_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "max_hit_test_attempts must be at least 1".to_string(),
            ));
        }
        if self.entity_types.is_empty() {
            return Err(ConfigError::Invalid("entity_types must not be empty".to_string()));
        }
        if self.mode != SessionMode::ImmersiveAr {
            tracing::warn!("placement sessions expect immersive-ar, configured {}", self.mode);
        }
        Ok(())
    }

    /// Session request parameters derived from this config
    pub fn session_init(&self) -> SessionInit {
        let mut init = self
            .required_features
            .iter()
            .fold(SessionInit::new(), |init, f| init.require(*f));
        init = self
            .optional_features
            .iter()
            .fold(init, |init, f| init.optional(*f));
        if let Some(root) = &self.overlay_root {
            init = init.with_overlay_root(root.clone());
        }
        init
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::Quat;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.placement, PlacementPolicy::Repeated);
        assert_eq!(config.hit_test_space, HitTestSpace::Viewer);
        assert_eq!(config.required_features, vec![Feature::HitTest]);
        assert_eq!(config.entrance, Some(ScaleAnimation::default()));
    }

    #[test]
    fn test_parse_full_document() {
        let config = SessionConfig::from_toml_str(
            r#"
            reference_space = "local-floor"
            hit_test_space = "reference"
            placement = "single-shot"
            orientation = "upright"
            template_url = "models/chair.glb"
            overlay_root = "overlay"
            color_variation = true
            color_seed = 42
            max_hit_test_attempts = 3

            [surface_filter]
            kind = "horizontal"
            max_tilt_degrees = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.reference_space, ReferenceSpaceKind::LocalFloor);
        assert_eq!(config.hit_test_space, HitTestSpace::Reference);
        assert_eq!(config.placement, PlacementPolicy::SingleShot);
        assert_eq!(config.orientation, Orientation::Upright);
        assert_eq!(
            config.surface_filter,
            SurfaceFilter::Horizontal { max_tilt_degrees: 10.0 }
        );
        assert_eq!(config.color_seed, Some(42));
        assert_eq!(config.max_hit_test_attempts, Some(3));
    }

    #[test]
    fn test_validation() {
        let bad = SessionConfig {
            placeholder_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));

        let bad = SessionConfig {
            surface_filter: SurfaceFilter::Vertical { max_tilt_degrees: 120.0 },
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        assert!(matches!(
            SessionConfig::from_toml_str("placement = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = SessionConfig::default().to_toml_string().unwrap();
        assert_eq!(SessionConfig::from_toml_str(&text).unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionConfig::load(dir.path().join("perch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_session_init() {
        let config = SessionConfig {
            overlay_root: Some("overlay".into()),
            ..Default::default()
        };
        let init = config.session_init();
        assert_eq!(init.required_features, vec![Feature::HitTest]);
        assert_eq!(init.optional_features, vec![Feature::DomOverlay]);
        assert_eq!(init.overlay_root.as_deref(), Some("overlay"));
    }

    #[test]
    fn test_surface_filter() {
        let floor = Pose::at(Vec3::ZERO);
        let wall = Pose::new(Vec3::ZERO, Quat::from_axis_angle(Vec3::RIGHT, FRAC_PI_2));

        assert!(SurfaceFilter::Any.accepts(&wall));

        let horizontal = SurfaceFilter::Horizontal { max_tilt_degrees: 15.0 };
        assert!(horizontal.accepts(&floor));
        assert!(!horizontal.accepts(&wall));

        let vertical = SurfaceFilter::Vertical { max_tilt_degrees: 15.0 };
        assert!(vertical.accepts(&wall));
        assert!(!vertical.accepts(&floor));
    }

    #[test]
    fn test_orientation() {
        let hit = Pose::new(
            Vec3::new(1.0, 0.0, -1.0),
            Quat::from_axis_angle(Vec3::RIGHT, 0.3),
        );
        assert_eq!(Orientation::Surface.apply(&hit), hit);
        let upright = Orientation::Upright.apply(&hit);
        assert_eq!(upright.position, hit.position);
        assert_eq!(upright.orientation, Quat::IDENTITY);
    }
}
