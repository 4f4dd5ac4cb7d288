//! Loaded scene data structures
//!
//! Intermediate representation between a file decoder and an [`Object3D`](crate::Object3D).

use perch_core::{Color, Mat4, Vec3};
use std::path::PathBuf;

/// A decoded 3D asset
#[derive(Clone, Debug)]
pub struct LoadedScene {
    /// Scene name (usually from file name)
    pub name: String,
    /// Source file path
    pub source_path: PathBuf,
    /// All meshes, with node transforms resolved
    pub meshes: Vec<LoadedMesh>,
    /// All materials used
    pub materials: Vec<LoadedMaterial>,
}

impl LoadedScene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_path: PathBuf::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Get total vertex count across all meshes
    pub fn total_vertices(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Get total triangle count across all meshes
    pub fn total_triangles(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }
}

/// A loaded mesh with vertex data
#[derive(Clone, Debug)]
pub struct LoadedMesh {
    pub name: String,
    pub vertices: Vec<LoadedVertex>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Material index (into `LoadedScene::materials`)
    pub material_index: Option<usize>,
    /// World transform of the node holding this mesh
    pub transform: Mat4,
}

impl LoadedMesh {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            indices: Vec::new(),
            material_index: None,
            transform: Mat4::IDENTITY,
        }
    }

    /// Check if the mesh has normals
    pub fn has_normals(&self) -> bool {
        self.vertices.first().map(|v| v.normal.is_some()).unwrap_or(false)
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Compute normals if not present (flat shading)
    pub fn compute_flat_normals(&mut self) {
        if self.has_normals() {
            return;
        }

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if i0.max(i1).max(i2) >= self.vertices.len() {
                continue;
            }

            let p0 = self.vertices[i0].position;
            let p1 = self.vertices[i1].position;
            let p2 = self.vertices[i2].position;

            let normal = (p1 - p0).cross(p2 - p0);
            let normal = if normal.length() > 0.0 {
                normal.normalize()
            } else {
                Vec3::UP
            };

            for i in [i0, i1, i2] {
                self.vertices[i].normal = Some(normal);
            }
        }
    }
}

/// A vertex from a loaded mesh
#[derive(Clone, Copy, Debug)]
pub struct LoadedVertex {
    pub position: Vec3,
    pub normal: Option<Vec3>,
    pub uv: Option<[f32; 2]>,
}

impl LoadedVertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            normal: None,
            uv: None,
        }
    }

    pub fn with_normal(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal: Some(normal),
            uv: None,
        }
    }
}

/// Material properties from a loaded asset
#[derive(Clone, Debug)]
pub struct LoadedMaterial {
    pub name: String,
    /// Base color factor, alpha is opacity
    pub base_color: Color,
    pub double_sided: bool,
}

impl Default for LoadedMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: Color::WHITE,
            double_sided: false,
        }
    }
}
