//! Mesh and asset loading
//!
//! Two layers:
//!
//! - [`MeshLoader`]: synchronous, path-based decoders producing a
//!   [`LoadedScene`]. glTF 2.0 (`.gltf`, `.glb`, feature `loader-gltf`) and
//!   Wavefront OBJ (`.obj`, feature `loader-obj`) are built in.
//! - [`AssetLoader`]: the asynchronous, URL-based interface a placement
//!   session uses to obtain its template object.
//!
//! # Example
//!
//! ```ignore
//! use perch_scene::loader::*;
//!
//! let mut registry = MeshLoaderRegistry::new();
//! let scene = registry.load("models/chair.glb")?;
//! let template = Object3D::from_loaded(&scene);
//! ```

mod asset;
mod cache;
mod scene;

#[cfg(feature = "loader-gltf")]
mod gltf;

#[cfg(feature = "loader-obj")]
mod obj;

pub use asset::{AssetLoader, FileAssetLoader};
pub use cache::{CacheStats, MeshCache};
pub use scene::{LoadedMaterial, LoadedMesh, LoadedScene, LoadedVertex};

#[cfg(feature = "loader-gltf")]
pub use self::gltf::GltfLoader;

#[cfg(feature = "loader-obj")]
pub use self::obj::ObjLoader;

use std::path::Path;
use thiserror::Error;

/// Error type for mesh and asset loading
#[derive(Debug, Error)]
pub enum LoadError {
    /// File not found
    #[error("file not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("io error: {0}")]
    Io(std::io::Error),
    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),
    /// Unsupported format or URL scheme
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Decoded but unusable
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(err.to_string())
        } else {
            LoadError::Io(err)
        }
    }
}

/// Trait for mesh loaders
pub trait MeshLoader {
    /// Load a scene from a file path
    fn load(&self, path: &Path) -> Result<LoadedScene, LoadError>;

    /// Get supported file extensions
    fn supported_extensions(&self) -> &[&str];

    /// Check if this loader can handle the given extension
    fn can_load(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Get the loader name for debugging
    fn name(&self) -> &'static str;
}

/// Registry of available mesh loaders
pub struct MeshLoaderRegistry {
    loaders: Vec<Box<dyn MeshLoader>>,
    cache: MeshCache,
}

impl MeshLoaderRegistry {
    /// Create a new loader registry with all available loaders
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut loaders: Vec<Box<dyn MeshLoader>> = Vec::new();

        #[cfg(feature = "loader-gltf")]
        loaders.push(Box::new(GltfLoader::new()));

        #[cfg(feature = "loader-obj")]
        loaders.push(Box::new(ObjLoader::new()));

        Self {
            loaders,
            cache: MeshCache::default(),
        }
    }

    /// Registry without any loaders
    pub fn empty() -> Self {
        Self {
            loaders: Vec::new(),
            cache: MeshCache::default(),
        }
    }

    /// Create with a specific cache size
    pub fn with_cache_size(mut self, max_entries: usize) -> Self {
        self.cache = MeshCache::new(max_entries);
        self
    }

    /// Register a custom loader; it takes precedence over earlier ones
    pub fn register(&mut self, loader: Box<dyn MeshLoader>) {
        self.loaders.insert(0, loader);
    }

    /// Load a mesh file, going through the cache
    ///
    /// A file modified since it was cached is decoded again.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadedScene, LoadError> {
        let path = path.as_ref();
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();

        if let Some(cached) = self.cache.get(path, modified) {
            return Ok(cached.clone());
        }

        let scene = self.load_uncached(path)?;
        self.cache.insert(path.to_path_buf(), modified, scene.clone());
        Ok(scene)
    }

    /// Load without caching
    pub fn load_uncached(&self, path: impl AsRef<Path>) -> Result<LoadedScene, LoadError> {
        let path = path.as_ref();

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let loader = self
            .loaders
            .iter()
            .find(|l| l.can_load(extension))
            .ok_or_else(|| LoadError::UnsupportedFormat(extension.to_string()))?;

        if !path.exists() {
            return Err(LoadError::NotFound(path.display().to_string()));
        }

        tracing::debug!("loading {} with {}", path.display(), loader.name());
        let scene = loader.load(path)?;
        if scene.meshes.is_empty() {
            return Err(LoadError::InvalidData(format!(
                "{} contains no meshes",
                path.display()
            )));
        }
        Ok(scene)
    }

    /// Clear the cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Check if a format is supported
    pub fn supports_format(&self, extension: &str) -> bool {
        self.loaders.iter().any(|l| l.can_load(extension))
    }

    /// Get all supported extensions
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.loaders
            .iter()
            .flat_map(|l| l.supported_extensions().iter().copied())
            .collect()
    }
}

impl Default for MeshLoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::Vec3;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingLoader {
        calls: Rc<Cell<usize>>,
        empty: bool,
    }

    impl MeshLoader for CountingLoader {
        fn load(&self, path: &Path) -> Result<LoadedScene, LoadError> {
            self.calls.set(self.calls.get() + 1);
            let mut scene = LoadedScene::new(path.display().to_string());
            if !self.empty {
                let mut mesh = LoadedMesh::new("m");
                mesh.vertices.push(LoadedVertex::new(Vec3::ZERO));
                scene.meshes.push(mesh);
            }
            Ok(scene)
        }

        fn supported_extensions(&self) -> &[&str] {
            &["test"]
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn registry(empty: bool) -> (MeshLoaderRegistry, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let mut registry = MeshLoaderRegistry::empty();
        registry.register(Box::new(CountingLoader {
            calls: calls.clone(),
            empty,
        }));
        (registry, calls)
    }

    #[test]
    fn test_unknown_extension() {
        let (mut registry, _) = registry(false);
        let err = registry.load("model.fbx").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "fbx"));
    }

    #[test]
    fn test_missing_file() {
        let (mut registry, calls) = registry(false);
        let err = registry.load("/definitely/not/here.test").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_cached_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.TEST");
        std::fs::write(&path, b"").unwrap();

        let (mut registry, calls) = registry(false);
        registry.load(&path).unwrap();
        registry.load(&path).unwrap();

        assert_eq!(calls.get(), 1);
        let stats = registry.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_edited_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.test");
        std::fs::write(&path, b"").unwrap();

        let (mut registry, calls) = registry(false);
        registry.load(&path).unwrap();

        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(std::time::SystemTime::UNIX_EPOCH).unwrap();
        drop(file);
        registry.load(&path).unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(registry.cache_stats().stale, 1);
    }

    #[test]
    fn test_formats_and_cache_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.test");
        std::fs::write(&path, b"").unwrap();

        let (mut registry, calls) = registry(false);
        assert!(registry.supports_format("TEST"));
        assert!(!registry.supports_format("fbx"));

        registry.load(&path).unwrap();
        registry.clear_cache();
        assert_eq!(registry.cache_stats().entries, 0);
        assert_eq!(registry.cache_stats().hits, 0);

        registry.load(&path).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_empty_scene_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.test");
        std::fs::write(&path, b"").unwrap();

        let (mut registry, _) = registry(true);
        assert!(matches!(registry.load(&path), Err(LoadError::InvalidData(_))));
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err: LoadError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
