//! Asynchronous asset loading by URL

use super::{LoadError, MeshLoaderRegistry};
use crate::object3d::Object3D;
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Loads a template object from a URL
///
/// The returned future is `'static` so a session can drive it without
/// borrowing the loader.
pub trait AssetLoader {
    fn load(&self, url: &str) -> LocalBoxFuture<'static, Result<Object3D, LoadError>>;
}

/// [`AssetLoader`] over the local filesystem
///
/// Accepts plain paths and `file://` URLs; relative paths resolve against
/// the base directory. Remote schemes are reported as unsupported.
#[derive(Clone)]
pub struct FileAssetLoader {
    base_dir: PathBuf,
    registry: Rc<RefCell<MeshLoaderRegistry>>,
}

impl FileAssetLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_registry(base_dir, MeshLoaderRegistry::new())
    }

    pub fn with_registry(base_dir: impl Into<PathBuf>, registry: MeshLoaderRegistry) -> Self {
        Self {
            base_dir: base_dir.into(),
            registry: Rc::new(RefCell::new(registry)),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Map a URL to a filesystem path
    pub fn resolve(&self, url: &str) -> Result<PathBuf, LoadError> {
        let path = match url.split_once("://") {
            Some(("file", rest)) => PathBuf::from(rest),
            Some((scheme, _)) => {
                return Err(LoadError::UnsupportedFormat(format!("{} url: {}", scheme, url)))
            }
            None => PathBuf::from(url),
        };

        Ok(if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        })
    }
}

impl Default for FileAssetLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, url: &str) -> LocalBoxFuture<'static, Result<Object3D, LoadError>> {
        let path = match self.resolve(url) {
            Ok(path) => path,
            Err(e) => return future::ready(Err(e)).boxed_local(),
        };
        let registry = self.registry.clone();

        async move {
            let scene = registry.borrow_mut().load(&path)?;
            tracing::info!(
                "loaded {} ({} meshes, {} vertices)",
                path.display(),
                scene.meshes.len(),
                scene.total_vertices()
            );
            Ok(Object3D::from_loaded(&scene))
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_resolve() {
        let loader = FileAssetLoader::new("/assets");
        assert_eq!(loader.resolve("chair.glb").unwrap(), PathBuf::from("/assets/chair.glb"));
        assert_eq!(
            loader.resolve("file:///models/chair.glb").unwrap(),
            PathBuf::from("/models/chair.glb")
        );
        assert!(matches!(
            loader.resolve("https://example.com/chair.glb"),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileAssetLoader::new(dir.path());
        let result = block_on(loader.load("missing.glb"));
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[cfg(feature = "loader-obj")]
    #[test]
    fn test_load_obj_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tri.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();

        let loader = FileAssetLoader::new(dir.path());
        let object = block_on(loader.load("tri.obj")).unwrap();
        assert_eq!(object.name, "tri");
        assert_eq!(object.vertex_count(), 3);
        assert!(object.visible);
    }
}
