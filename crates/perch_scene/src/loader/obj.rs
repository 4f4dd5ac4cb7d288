//! Wavefront OBJ mesh loader
//!
//! Loads OBJ files using the `tobj` crate.

use super::{LoadError, LoadedMaterial, LoadedMesh, LoadedScene, LoadedVertex, MeshLoader};
use perch_core::{Color, Vec3};
use std::path::Path;

/// Wavefront OBJ mesh loader
pub struct ObjLoader {
    /// Whether to load materials from MTL files
    pub load_materials: bool,
}

impl ObjLoader {
    pub fn new() -> Self {
        Self {
            load_materials: true,
        }
    }

    pub fn with_materials(mut self, load: bool) -> Self {
        self.load_materials = load;
        self
    }
}

impl Default for ObjLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshLoader for ObjLoader {
    fn load(&self, path: &Path) -> Result<LoadedScene, LoadError> {
        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };

        let (models, materials) =
            tobj::load_obj(path, &load_options).map_err(|e| LoadError::Parse(e.to_string()))?;

        let scene_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scene")
            .to_string();

        let mut scene = LoadedScene::new(scene_name);
        scene.source_path = path.to_path_buf();

        if self.load_materials {
            match materials {
                Ok(materials) => {
                    scene.materials = materials.iter().map(convert_material).collect();
                }
                Err(e) => tracing::debug!("no materials for {}: {}", path.display(), e),
            }
        }

        for model in &models {
            if let Some(mut mesh) = convert_model(model) {
                if !self.load_materials {
                    mesh.material_index = None;
                }
                scene.meshes.push(mesh);
            }
        }

        Ok(scene)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["obj"]
    }

    fn name(&self) -> &'static str {
        "Wavefront OBJ Loader"
    }
}

fn convert_model(model: &tobj::Model) -> Option<LoadedMesh> {
    let mesh = &model.mesh;

    if mesh.positions.is_empty() {
        return None;
    }

    let vertex_count = mesh.positions.len() / 3;
    let vertices = (0..vertex_count)
        .map(|i| LoadedVertex {
            position: Vec3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ),
            normal: mesh
                .normals
                .get(i * 3..i * 3 + 3)
                .map(|n| Vec3::new(n[0], n[1], n[2])),
            uv: mesh.texcoords.get(i * 2..i * 2 + 2).map(|t| [t[0], t[1]]),
        })
        .collect();

    let mut loaded = LoadedMesh::new(model.name.clone());
    loaded.vertices = vertices;
    loaded.indices = mesh.indices.clone();
    loaded.material_index = mesh.material_id;
    loaded.compute_flat_normals();
    Some(loaded)
}

fn convert_material(material: &tobj::Material) -> LoadedMaterial {
    let [r, g, b] = material.diffuse.unwrap_or([1.0, 1.0, 1.0]);
    let alpha = material.dissolve.unwrap_or(1.0);
    LoadedMaterial {
        name: material.name.clone(),
        base_color: Color::rgba(r, g, b, alpha),
        double_sided: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
f 1 4 3 2
";

    #[test]
    fn test_load_quad() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(&path, QUAD).unwrap();

        let scene = ObjLoader::new().load(&path).unwrap();
        assert_eq!(scene.name, "quad");
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.total_vertices(), 4);
        assert_eq!(scene.total_triangles(), 2);
        assert!(scene.meshes[0].has_normals());
    }
}
