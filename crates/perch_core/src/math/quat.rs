//! Quaternion for 3D rotations

use super::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Unit quaternion orientation
///
/// Serialized as `[x, y, z, w]`, the order XR platforms report orientations in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from Euler angles (in radians)
    ///
    /// Order: XYZ (roll, pitch, yaw)
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        let (sx, cx) = (x * 0.5).sin_cos();
        let (sy, cy) = (y * 0.5).sin_cos();
        let (sz, cz) = (z * 0.5).sin_cos();

        Self {
            x: sx * cy * cz - cx * sy * sz,
            y: cx * sy * cz + sx * cy * sz,
            z: cx * cy * sz - sx * sy * cz,
            w: cx * cy * cz + sx * sy * sz,
        }
    }

    /// Create from axis-angle representation
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len = axis.length();
        if len < 1e-6 {
            return Self::IDENTITY;
        }

        let (s, c) = (angle * 0.5).sin_cos();
        let axis = axis * (1.0 / len);
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Shortest rotation taking direction `from` onto direction `to`
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from = from.normalize();
        let to = to.normalize();
        let d = from.dot(to);

        if d > 0.999_999 {
            return Self::IDENTITY;
        }
        if d < -0.999_999 {
            // Opposite directions: any perpendicular axis works
            let mut axis = Vec3::RIGHT.cross(from);
            if axis.length() < 1e-6 {
                axis = Vec3::UP.cross(from);
            }
            return Self::from_axis_angle(axis, std::f32::consts::PI);
        }

        let c = from.cross(to);
        Self::new(c.x, c.y, c.z, 1.0 + d).normalize()
    }

    /// Rotation whose local +Z points along `forward`
    pub fn look_at(forward: Vec3, up: Vec3) -> Self {
        let f = forward.normalize();
        let f = if f.length() < 1e-6 { Vec3::new(0.0, 0.0, 1.0) } else { f };
        let r = up.cross(f).normalize();
        let u = f.cross(r);

        let trace = r.x + u.y + f.z;

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self {
                w: 0.25 / s,
                x: (u.z - f.y) * s,
                y: (f.x - r.z) * s,
                z: (r.y - u.x) * s,
            }
        } else if r.x > u.y && r.x > f.z {
            let s = 2.0 * (1.0 + r.x - u.y - f.z).sqrt();
            Self {
                w: (u.z - f.y) / s,
                x: 0.25 * s,
                y: (u.x + r.y) / s,
                z: (f.x + r.z) / s,
            }
        } else if u.y > f.z {
            let s = 2.0 * (1.0 + u.y - r.x - f.z).sqrt();
            Self {
                w: (f.x - r.z) / s,
                x: (u.x + r.y) / s,
                y: 0.25 * s,
                z: (f.y + u.z) / s,
            }
        } else {
            let s = 2.0 * (1.0 + f.z - r.x - u.y).sqrt();
            Self {
                w: (r.y - u.x) / s,
                x: (f.x + r.z) / s,
                y: (f.y + u.z) / s,
                z: 0.25 * s,
            }
        }
    }

    /// Extract the rotation of a rigid transform
    ///
    /// The upper 3x3 block is expected to be orthonormal; callers strip scale
    /// first.
    pub fn from_mat4(m: &Mat4) -> Self {
        // m(row, col) = cols[col][row]
        let r00 = m.cols[0][0];
        let r10 = m.cols[0][1];
        let r20 = m.cols[0][2];
        let r01 = m.cols[1][0];
        let r11 = m.cols[1][1];
        let r21 = m.cols[1][2];
        let r02 = m.cols[2][0];
        let r12 = m.cols[2][1];
        let r22 = m.cols[2][2];

        let trace = r00 + r11 + r22;
        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new((r21 - r12) * s, (r02 - r20) * s, (r10 - r01) * s, 0.25 / s)
        } else if r00 > r11 && r00 > r22 {
            let s = 2.0 * (1.0 + r00 - r11 - r22).sqrt();
            Self::new(0.25 * s, (r01 + r10) / s, (r02 + r20) / s, (r21 - r12) / s)
        } else if r11 > r22 {
            let s = 2.0 * (1.0 + r11 - r00 - r22).sqrt();
            Self::new((r01 + r10) / s, 0.25 * s, (r12 + r21) / s, (r02 - r20) / s)
        } else {
            let s = 2.0 * (1.0 + r22 - r00 - r11).sqrt();
            Self::new((r02 + r20) / s, (r12 + r21) / s, 0.25 * s, (r10 - r01) / s)
        };
        q.normalize()
    }

    /// Normalize the quaternion
    pub fn normalize(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len < 1e-6 {
            return Self::IDENTITY;
        }
        let inv_len = 1.0 / len;
        Self::new(
            self.x * inv_len,
            self.y * inv_len,
            self.z * inv_len,
            self.w * inv_len,
        )
    }

    /// Get the conjugate (inverse for unit quaternions)
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Hamilton product
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let qv = Self::new(v.x, v.y, v.z, 0.0);
        let result = self.mul(&qv).mul(&self.conjugate());
        Vec3::new(result.x, result.y, result.z)
    }

    /// Spherical linear interpolation
    pub fn slerp(&self, other: Self, t: f32) -> Self {
        let mut cos_half_theta = self.dot(other);

        // Take the shorter path
        let mut b = other;
        if cos_half_theta < 0.0 {
            b = Self::new(-b.x, -b.y, -b.z, -b.w);
            cos_half_theta = -cos_half_theta;
        }

        if cos_half_theta > 0.9995 {
            return Self::new(
                self.x + t * (b.x - self.x),
                self.y + t * (b.y - self.y),
                self.z + t * (b.z - self.z),
                self.w + t * (b.w - self.w),
            )
            .normalize();
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;

        Self::new(
            self.x * ratio_a + b.x * ratio_b,
            self.y * ratio_a + b.y * ratio_b,
            self.z * ratio_a + b.z * ratio_b,
            self.w * ratio_a + b.w * ratio_b,
        )
    }

    /// Convert to a 4x4 rotation matrix
    pub fn to_mat4(&self) -> Mat4 {
        let x2 = self.x + self.x;
        let y2 = self.y + self.y;
        let z2 = self.z + self.z;

        let xx = self.x * x2;
        let xy = self.x * y2;
        let xz = self.x * z2;
        let yy = self.y * y2;
        let yz = self.y * z2;
        let zz = self.z * z2;
        let wx = self.w * x2;
        let wy = self.w * y2;
        let wz = self.w * z2;

        Mat4 {
            cols: [
                [1.0 - (yy + zz), xy + wz, xz - wy, 0.0],
                [xy - wz, 1.0 - (xx + zz), yz + wx, 0.0],
                [xz + wy, yz - wx, 1.0 - (xx + yy), 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Same rotation up to sign, within `epsilon`
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (1.0 - self.dot(*other).abs()) <= epsilon
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Quat::mul(&self, &rhs)
    }
}

impl From<[f32; 4]> for Quat {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Quat> for [f32; 4] {
    fn from(q: Quat) -> Self {
        [q.x, q.y, q.z, q.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_look_at_turns_z_onto_forward() {
        let q = Quat::look_at(Vec3::RIGHT, Vec3::UP);
        assert!(q.rotate_vec3(Vec3::new(0.0, 0.0, 1.0)).approx_eq(Vec3::RIGHT, 1e-5));
        assert!(q.rotate_vec3(Vec3::UP).approx_eq(Vec3::UP, 1e-5));

        let straight = Quat::look_at(Vec3::new(0.0, 0.0, 2.0), Vec3::UP);
        assert!(straight.approx_eq(&Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(Quat::IDENTITY.rotate_vec3(v).approx_eq(v, 1e-5));
    }

    #[test]
    fn test_from_axis_angle() {
        // 90 degrees around Y takes +X to -Z
        let q = Quat::from_axis_angle(Vec3::UP, PI / 2.0);
        let rotated = q.rotate_vec3(Vec3::RIGHT);
        assert!(rotated.approx_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_rotation_arc() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = Quat::from_rotation_arc(Vec3::UP, normal);
        assert!(q.rotate_vec3(Vec3::UP).approx_eq(normal, 1e-5));

        let flipped = Quat::from_rotation_arc(Vec3::UP, -Vec3::UP);
        assert!(flipped.rotate_vec3(Vec3::UP).approx_eq(-Vec3::UP, 1e-5));
    }

    #[test]
    fn test_matrix_roundtrip() {
        let q = Quat::from_euler(0.3, -1.2, 2.5);
        let back = Quat::from_mat4(&q.to_mat4());
        assert!(q.approx_eq(&back, 1e-5), "{q:?} vs {back:?}");

        // Large rotation exercises the non-positive trace branches
        let q = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), 3.0);
        assert!(q.approx_eq(&Quat::from_mat4(&q.to_mat4()), 1e-5));
    }

    #[test]
    fn test_slerp_halfway() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::UP, PI / 2.0);

        let rotated = a.slerp(b, 0.5).rotate_vec3(Vec3::RIGHT);
        let expected = (PI / 4.0).cos();
        assert!((rotated.x - expected).abs() < 1e-4);
        assert!((rotated.z + expected).abs() < 1e-4);
    }
}
