//! Geometry primitive generators

use super::{Geometry, Vertex};
use std::f32::consts::TAU;

/// Axis-aligned box centred on the origin
///
/// Each face has its own four vertices so normals stay flat.
pub struct BoxGeometry;

/// Face normal, then the two in-plane axes with `u x v == normal`
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Geometry {
        let half = [width * 0.5, height * 0.5, depth * 0.5];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in BOX_FACES {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let mut position = [0.0f32; 3];
                for axis in 0..3 {
                    position[axis] = (normal[axis] + u[axis] * su + v[axis] * sv) * half[axis];
                }
                let uv = [(su + 1.0) * 0.5, (1.0 - sv) * 0.5];
                vertices.push(Vertex::new(position, normal, uv));
            }
            // Counter-clockwise seen from outside
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Geometry::from_data(vertices, indices)
    }

    pub fn cube(size: f32) -> Geometry {
        Self::new(size, size, size)
    }
}

/// Flat annulus lying on the XZ plane, facing +Y
///
/// The usual shape for a placement reticle.
pub struct RingGeometry;

impl RingGeometry {
    pub fn new(inner_radius: f32, outer_radius: f32, segments: u32) -> Geometry {
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(2 * (segments as usize + 1));
        let mut indices = Vec::with_capacity(6 * segments as usize);

        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let (sin, cos) = (t * TAU).sin_cos();
            for (radius, v) in [(inner_radius, 0.0), (outer_radius, 1.0)] {
                vertices.push(Vertex::new(
                    [cos * radius, 0.0, sin * radius],
                    [0.0, 1.0, 0.0],
                    [t, v],
                ));
            }
        }

        for i in 0..segments {
            let a = 2 * i;
            let b = a + 1;
            let c = a + 2;
            let d = a + 3;
            // Counter-clockwise seen from +Y
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }

        Geometry::from_data(vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::Vec3;

    #[test]
    fn test_cube_bounds() {
        let cube = BoxGeometry::cube(0.2);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.bounding_box.size().approx_eq(Vec3::splat(0.2), 1e-6));
        assert!(cube.bounding_box.center().approx_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_box_faces_wind_outward() {
        let b = BoxGeometry::new(1.0, 2.0, 3.0);
        assert!(b.bounding_box.size().approx_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));

        for tri in b.indices.chunks(3) {
            let v = |i: u32| b.vertices[i as usize];
            let p = |i: u32| Vec3::from(v(i).position);
            let n = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(n.dot(Vec3::from(v(tri[0]).normal)) > 0.0);
            // Outward: the face normal points away from the centre
            assert!(p(tri[0]).dot(Vec3::from(v(tri[0]).normal)) > 0.0);
        }
    }

    #[test]
    fn test_ring_is_flat_and_faces_up() {
        let ring = RingGeometry::new(0.15, 0.2, 32);
        assert_eq!(ring.vertex_count(), 66);
        assert_eq!(ring.triangle_count(), 64);

        for v in &ring.vertices {
            assert_eq!(v.position[1], 0.0);
            let r = (v.position[0].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((0.149..=0.201).contains(&r));
        }

        // Winding of the first triangle gives a +Y normal
        let p = |i: u32| Vec3::from(ring.vertices[i as usize].position);
        let (a, b, c) = (p(ring.indices[0]), p(ring.indices[1]), p(ring.indices[2]));
        let n = (b - a).cross(c - a);
        assert!(n.y > 0.0);
    }
}
