//! Session descriptors and opaque platform handles

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Kind of immersive session to request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// Camera passthrough with world tracking
    #[default]
    ImmersiveAr,
    /// Fully virtual immersive session
    ImmersiveVr,
    /// Non-immersive, rendered into the page
    Inline,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::ImmersiveAr => "immersive-ar",
            SessionMode::ImmersiveVr => "immersive-vr",
            SessionMode::Inline => "inline",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional session capability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// World hit testing against detected surfaces
    HitTest,
    /// DOM overlay surface for 2D UI
    DomOverlay,
    /// `local` reference space
    Local,
    /// `local-floor` reference space
    LocalFloor,
    /// Persistent anchors
    Anchors,
    /// Plane detection
    PlaneDetection,
    /// Light estimation
    LightEstimation,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::HitTest => "hit-test",
            Feature::DomOverlay => "dom-overlay",
            Feature::Local => "local",
            Feature::LocalFloor => "local-floor",
            Feature::Anchors => "anchors",
            Feature::PlaneDetection => "plane-detection",
            Feature::LightEstimation => "light-estimation",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a session request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionInit {
    /// The request fails if any of these is unavailable
    pub required_features: Vec<Feature>,
    /// Granted when available, silently dropped otherwise
    pub optional_features: Vec<Feature>,
    /// Root element of the DOM overlay, when `DomOverlay` is requested
    pub overlay_root: Option<String>,
}

impl SessionInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, feature: Feature) -> Self {
        if !self.required_features.contains(&feature) {
            self.required_features.push(feature);
        }
        self
    }

    pub fn optional(mut self, feature: Feature) -> Self {
        if !self.optional_features.contains(&feature) {
            self.optional_features.push(feature);
        }
        self
    }

    pub fn with_overlay_root(mut self, root: impl Into<String>) -> Self {
        self.overlay_root = Some(root.into());
        self
    }

    /// Whether the feature was asked for, required or optional
    pub fn requests(&self, feature: Feature) -> bool {
        self.required_features.contains(&feature) || self.optional_features.contains(&feature)
    }
}

/// Tracking anchor of a reference space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceKind {
    /// Follows the device; its -Z axis is the forward-facing ray
    Viewer,
    /// World-fixed, origin near the device at session start
    #[default]
    Local,
    /// World-fixed, origin on the floor
    LocalFloor,
    /// World-fixed with known bounds
    BoundedFloor,
    /// World-fixed, unbounded
    Unbounded,
}

impl ReferenceSpaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceSpaceKind::Viewer => "viewer",
            ReferenceSpaceKind::Local => "local",
            ReferenceSpaceKind::LocalFloor => "local-floor",
            ReferenceSpaceKind::BoundedFloor => "bounded-floor",
            ReferenceSpaceKind::Unbounded => "unbounded",
        }
    }
}

impl fmt::Display for ReferenceSpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform session handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    id: u64,
}

impl SessionHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Reference space handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceSpace {
    id: u64,
    kind: ReferenceSpaceKind,
}

impl ReferenceSpace {
    pub fn new(id: u64, kind: ReferenceSpaceKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ReferenceSpaceKind {
        self.kind
    }
}

/// Hit-test source handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HitTestSource {
    id: u64,
    space: ReferenceSpaceKind,
}

impl HitTestSource {
    pub fn new(id: u64, space: ReferenceSpaceKind) -> Self {
        Self { id, space }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Kind of the space the ray originates from
    pub fn space_kind(&self) -> ReferenceSpaceKind {
        self.space
    }
}

/// Kind of real-world entity a hit-test ray may intersect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Plane,
    Point,
    Mesh,
}

/// Parameters of a hit-test source request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitTestOptions {
    /// Space whose origin and -Z axis define the ray
    pub space: ReferenceSpace,
    /// Entities the ray may hit
    pub entity_types: SmallVec<[EntityType; 2]>,
}

impl HitTestOptions {
    pub fn new(space: ReferenceSpace) -> Self {
        Self {
            space,
            entity_types: smallvec![EntityType::Plane],
        }
    }

    pub fn with_entity_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.entity_types = types.into_iter().collect();
        self
    }
}
