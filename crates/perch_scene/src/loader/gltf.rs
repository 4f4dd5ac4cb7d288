//! glTF 2.0 mesh loader
//!
//! Loads `.gltf` and `.glb` files using the `gltf` crate. Only triangle
//! primitives are kept; node transforms are flattened into world transforms.

use super::{LoadError, LoadedMaterial, LoadedMesh, LoadedScene, LoadedVertex, MeshLoader};
use perch_core::{Color, Mat4, Vec3};
use std::path::Path;

/// glTF 2.0 mesh loader
pub struct GltfLoader {
    /// Whether to read material base colors
    pub load_materials: bool,
}

impl GltfLoader {
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

impl Default for GltfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<LoadedScene, LoadError> {
        let (document, buffers, _images) = gltf::import(path).map_err(|e| match e {
            gltf::Error::Io(io) => LoadError::from(io),
            other => LoadError::Parse(other.to_string()),
        })?;

        let scene_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scene")
            .to_string();

        let mut scene = LoadedScene::new(scene_name);
        scene.source_path = path.to_path_buf();

        if self.load_materials {
            scene.materials = document.materials().map(|m| load_material(&m)).collect();
        }

        let root = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| LoadError::InvalidData("no scene in document".to_string()))?;

        for node in root.nodes() {
            visit_node(&node, &Mat4::IDENTITY, &buffers, self.load_materials, &mut scene.meshes);
        }

        Ok(scene)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["gltf", "glb"]
    }

    fn name(&self) -> &'static str {
        "glTF 2.0 Loader"
    }
}

fn visit_node(
    node: &gltf::Node,
    parent: &Mat4,
    buffers: &[gltf::buffer::Data],
    with_materials: bool,
    out: &mut Vec<LoadedMesh>,
) {
    let world = parent.mul(&Mat4 {
        cols: node.transform().matrix(),
    });

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!("skipping non-triangle primitive in {:?}", mesh.name());
                continue;
            }
            if let Some(mut loaded) = load_primitive(&primitive, &mesh, buffers) {
                loaded.transform = world;
                if !with_materials {
                    loaded.material_index = None;
                }
                out.push(loaded);
            }
        }
    }

    for child in node.children() {
        visit_node(&child, &world, buffers, with_materials, out);
    }
}

fn load_primitive(
    primitive: &gltf::Primitive,
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
) -> Option<LoadedMesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from).collect();
    let normals: Option<Vec<Vec3>> = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from).collect());
    let uvs: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().collect());

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| LoadedVertex {
            position,
            normal: normals.as_ref().and_then(|n| n.get(i).copied()),
            uv: uvs.as_ref().and_then(|u| u.get(i).copied()),
        })
        .collect();

    let mut loaded = LoadedMesh::new(mesh.name().unwrap_or("mesh"));
    loaded.vertices = vertices;
    loaded.indices = indices;
    loaded.material_index = primitive.material().index();
    loaded.compute_flat_normals();
    Some(loaded)
}

fn load_material(material: &gltf::Material) -> LoadedMaterial {
    let [r, g, b, a] = material.pbr_metallic_roughness().base_color_factor();
    LoadedMaterial {
        name: material.name().unwrap_or_default().to_string(),
        base_color: Color::rgba(r, g, b, a),
        double_sided: material.double_sided(),
    }
}
