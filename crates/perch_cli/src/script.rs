//! Simulation script format
//!
//! A script describes how the scripted platform behaves and what happens on
//! each frame:
//!
//! ```toml
//! supported = true
//! hit_test_failures = 1
//!
//! [[frames]]
//! hits = [{ position = [0.0, 0.0, -1.0] }]
//!
//! [[frames]]
//! hits = [{ position = [0.2, 0.0, -1.2] }]
//! tap = true
//! ```

use anyhow::{Context, Result};
use perch_core::{Pose, Quat, Vec3};
use perch_platform::PlatformError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Frame interval used when a frame has no explicit `time`
pub const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Deserialize, Serialize)]
pub struct Script {
    /// Answer of the capability probe
    #[serde(default = "default_supported")]
    pub supported: bool,

    /// Reject the first session request with this message
    #[serde(default)]
    pub session_error: Option<String>,

    /// Reject the first reference space request with this message
    #[serde(default)]
    pub reference_space_error: Option<String>,

    /// Number of hit-test source requests to reject before granting one
    #[serde(default)]
    pub hit_test_failures: u32,

    /// Template asset, relative to the script; overrides `template_url`
    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub frames: Vec<Frame>,
}

fn default_supported() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Frame {
    /// Frame timestamp in milliseconds
    #[serde(default)]
    pub time: Option<f64>,

    /// Hit-test results, nearest first
    #[serde(default)]
    pub hits: Vec<Hit>,

    /// Whether the viewer pose is known this frame
    #[serde(default = "default_viewer")]
    pub viewer: bool,

    /// Placement gesture after the frame is processed
    #[serde(default)]
    pub tap: bool,

    #[serde(default)]
    pub drag: Option<Drag>,

    /// End the session after this frame
    #[serde(default)]
    pub end: bool,

    /// The platform ends the session after this frame
    #[serde(default)]
    pub platform_end: bool,

    /// Start a new session before this frame
    #[serde(default)]
    pub restart: bool,

    /// Hit testing fails this frame
    #[serde(default)]
    pub error: Option<FrameError>,
}

fn default_viewer() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Hit {
    pub position: [f32; 3],
    /// Quaternion as `[x, y, z, w]`
    #[serde(default = "identity")]
    pub orientation: [f32; 4],
}

fn identity() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl Hit {
    pub fn pose(&self) -> Pose {
        let [x, y, z, w] = self.orientation;
        Pose::new(Vec3::from(self.position), Quat::new(x, y, z, w).normalize())
    }
}

/// Move a placed object, by placement index within the current session
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Drag {
    pub object: usize,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameError {
    pub message: String,
    /// Report the session as lost instead of skipping the frame
    #[serde(default)]
    pub fatal: bool,
}

impl FrameError {
    pub fn to_platform_error(&self) -> PlatformError {
        if self.fatal {
            PlatformError::SessionEnded(self.message.clone())
        } else {
            PlatformError::InvalidState(self.message.clone())
        }
    }
}

impl Script {
    /// Load a script from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let script: Script = toml::from_str(content)?;
        Ok(script)
    }

    /// Timestamp of every frame, filling gaps at 60Hz
    pub fn timestamps(&self) -> Vec<f64> {
        let mut last: Option<f64> = None;
        self.frames
            .iter()
            .map(|frame| {
                let t = match (frame.time, last) {
                    (Some(t), _) => t,
                    (None, Some(prev)) => prev + FRAME_INTERVAL_MS,
                    (None, None) => 0.0,
                };
                last = Some(t);
                t
            })
            .collect()
    }
}
