//! Scene objects

use crate::geometry::{BoundingBox, Geometry, Vertex};
use crate::loader::LoadedScene;
use perch_core::{Color, Mat4, Pose, Quat, Vec3};
use std::sync::Arc;

slotmap::new_key_type! {
    /// Handle to an object stored in a [`Scene`](crate::Scene)
    pub struct ObjectId;
}

/// Surface appearance of an object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Base color
    pub color: Color,
    /// Opacity (0.0 - 1.0)
    pub opacity: f32,
    /// Render both faces
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            double_sided: false,
        }
    }
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }
}

/// An object in the scene
///
/// Stores the transform (position, rotation, scale), visibility, appearance
/// and shared mesh data. Cloning an object shares its meshes.
#[derive(Clone, Debug)]
pub struct Object3D {
    /// Object name, unique among placed objects
    pub name: String,
    /// Position in world space
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
    /// Scale
    pub scale: Vec3,
    /// Visibility flag
    pub visible: bool,
    pub material: Material,
    /// Mesh data, shared between clones
    pub meshes: Vec<Arc<Geometry>>,
    /// Accepts drag repositioning
    pub movable: bool,
    /// Render order (higher = rendered later)
    pub render_order: i32,
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            visible: true,
            material: Material::default(),
            meshes: Vec::new(),
            movable: false,
            render_order: 0,
        }
    }
}

impl Object3D {
    /// Create an empty object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mesh(mut self, geometry: Geometry) -> Self {
        self.meshes.push(Arc::new(geometry));
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.material.color = color;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }

    /// Set position and rotation from a pose; scale is untouched
    pub fn set_pose(&mut self, pose: &Pose) {
        self.position = pose.position;
        self.rotation = pose.orientation;
    }

    /// Position and rotation as a pose
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    /// Get the local transformation matrix
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
            .mul(&Mat4::from_scale(self.scale))
    }

    /// Bounds of all meshes in object space
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for mesh in &self.meshes {
            if !mesh.bounding_box.is_empty() {
                bounds.expand(mesh.bounding_box.min);
                bounds.expand(mesh.bounding_box.max);
            }
        }
        bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertex_count()).sum()
    }

    /// Build an object from a loaded asset
    ///
    /// Node transforms are baked into the vertex data so the object's own
    /// transform starts at identity. The first material found becomes the
    /// object's material.
    pub fn from_loaded(scene: &LoadedScene) -> Self {
        let mut object = Object3D::new(scene.name.clone());

        for mesh in &scene.meshes {
            let vertices = mesh
                .vertices
                .iter()
                .map(|v| {
                    let position = mesh.transform.transform_point(v.position);
                    let normal = v
                        .normal
                        .map(|n| (mesh.transform.transform_point(n) - mesh.transform.translation()).normalize())
                        .unwrap_or(Vec3::UP);
                    Vertex::new(position.into(), normal.into(), v.uv.unwrap_or([0.0, 0.0]))
                })
                .collect();
            object
                .meshes
                .push(Arc::new(Geometry::from_data(vertices, mesh.indices.clone())));
        }

        if let Some(material) = scene
            .meshes
            .iter()
            .find_map(|m| m.material_index.and_then(|i| scene.materials.get(i)))
        {
            object.material = Material {
                color: material.base_color.with_alpha(1.0),
                opacity: material.base_color.a,
                double_sided: material.double_sided,
            };
        }

        object
    }
}
