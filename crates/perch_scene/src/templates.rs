//! Built-in template objects

use crate::geometry::{BoxGeometry, RingGeometry};
use crate::object3d::{Material, Object3D};
use perch_core::Color;

/// Name of the placeholder template
pub const PLACEHOLDER_NAME: &str = "placeholder";

/// Name of the placement reticle
pub const RETICLE_NAME: &str = "reticle";

/// Grey cube with edge length `size`, used when the template asset fails to load
pub fn placeholder_template(size: f32) -> Object3D {
    Object3D::new(PLACEHOLDER_NAME)
        .with_mesh(BoxGeometry::cube(size))
        .with_color(Color::GRAY)
}

/// Flat ring marking the targeted surface point
///
/// Starts hidden; rendered after regular objects so it stays legible on top
/// of placed models.
pub fn reticle_template() -> Object3D {
    Object3D::new(RETICLE_NAME)
        .with_mesh(RingGeometry::new(0.15, 0.2, 32))
        .with_material(Material::new(Color::WHITE).with_double_sided(true))
        .with_visible(false)
        .with_render_order(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::Vec3;

    #[test]
    fn test_placeholder_has_fixed_size() {
        let cube = placeholder_template(0.2);
        assert_eq!(cube.name, PLACEHOLDER_NAME);
        assert!(cube.bounding_box().size().approx_eq(Vec3::splat(0.2), 1e-6));
        assert_eq!(cube.material.color, Color::GRAY);
        assert!(cube.visible);
    }

    #[test]
    fn test_reticle_starts_hidden() {
        let reticle = reticle_template();
        assert!(!reticle.visible);
        assert_eq!(reticle.meshes.len(), 1);
    }
}
