//! Prelude module for common imports
//!
//! ```rust,ignore
//! use perch_scene::prelude::*;
//! ```

pub use crate::animation::{Easing, ScaleAnimation};
pub use crate::geometry::{BoxGeometry, Geometry, RingGeometry, Vertex};
pub use crate::graph::{Scene, SceneGraph};
pub use crate::loader::{AssetLoader, FileAssetLoader, LoadError, MeshLoaderRegistry};
pub use crate::object3d::{Material, Object3D, ObjectId};
pub use crate::templates::{placeholder_template, reticle_template};
