//! 4x4 transformation matrix

use super::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// 4x4 transformation matrix (column-major)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build from 16 floats in column order (the WebXR `matrix` layout)
    pub fn from_cols_array(m: &[f32; 16]) -> Self {
        Self {
            cols: [
                [m[0], m[1], m[2], m[3]],
                [m[4], m[5], m[6], m[7]],
                [m[8], m[9], m[10], m[11]],
                [m[12], m[13], m[14], m[15]],
            ],
        }
    }

    pub fn to_cols_array(&self) -> [f32; 16] {
        let c = &self.cols;
        [
            c[0][0], c[0][1], c[0][2], c[0][3],
            c[1][0], c[1][1], c[1][2], c[1][3],
            c[2][0], c[2][1], c[2][2], c[2][3],
            c[3][0], c[3][1], c[3][2], c[3][3],
        ]
    }

    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn from_scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][1] = s.y;
        m.cols[2][2] = s.z;
        m
    }

    /// Rigid transform: rotate, then translate
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        let mut m = rotation.to_mat4();
        m.cols[3] = [translation.x, translation.y, translation.z, 1.0];
        m
    }

    /// Multiply two matrices
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0f32; 4]; 4];
        for (i, col) in result.iter_mut().enumerate() {
            for (j, cell) in col.iter_mut().enumerate() {
                for k in 0..4 {
                    *cell += self.cols[k][j] * other.cols[i][k];
                }
            }
        }
        Mat4 { cols: result }
    }

    /// Transform a point (w = 1)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * p.x + c[1][0] * p.y + c[2][0] * p.z + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[2][1] * p.z + c[3][1],
            c[0][2] * p.x + c[1][2] * p.y + c[2][2] * p.z + c[3][2],
        )
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2])
    }

    /// Length of each basis column (the scale of an affine transform)
    pub fn column_scale(&self) -> Vec3 {
        let len = |c: &[f32; 4]| (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt();
        Vec3::new(len(&self.cols[0]), len(&self.cols[1]), len(&self.cols[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_then_point() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let p = m.transform_point(Vec3::ZERO);
        assert!(p.approx_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_mul_applies_right_first() {
        let t = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
        let s = Mat4::from_scale(Vec3::splat(2.0));
        let p = t.mul(&s).transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.approx_eq(Vec3::new(2.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn test_cols_array_roundtrip() {
        let m = Mat4::from_rotation_translation(
            Quat::from_euler(0.1, 0.2, 0.3),
            Vec3::new(4.0, 5.0, 6.0),
        );
        assert_eq!(Mat4::from_cols_array(&m.to_cols_array()), m);
    }
}
