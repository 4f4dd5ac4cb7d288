//! Rigid pose reported by the XR platform

use super::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position + orientation in some reference space
///
/// Poses are transient: a hit-test result yields a fresh one every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    #[serde(default)]
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` with no rotation
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Decompose a rigid 4x4 transform
    ///
    /// Any scale in the basis columns is divided out before the rotation is
    /// extracted.
    pub fn from_matrix(m: &Mat4) -> Self {
        let scale = m.column_scale();
        let mut rotation = *m;
        for (col, s) in rotation.cols.iter_mut().take(3).zip([scale.x, scale.y, scale.z]) {
            if s > 1e-6 {
                for v in col.iter_mut().take(3) {
                    *v /= s;
                }
            }
        }
        Self::new(m.translation(), Quat::from_mat4(&rotation))
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Local +Y in the parent space; for a surface hit this is the surface normal
    pub fn up(&self) -> Vec3 {
        self.orientation.rotate_vec3(Vec3::UP)
    }

    /// Local -Z in the parent space
    pub fn forward(&self) -> Vec3 {
        self.orientation.rotate_vec3(Vec3::FORWARD)
    }

    pub fn approx_eq(&self, other: &Pose, epsilon: f32) -> bool {
        self.position.approx_eq(other.position, epsilon)
            && self.orientation.approx_eq(&other.orientation, epsilon)
    }
}
