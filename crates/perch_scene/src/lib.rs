//! # Perch Scene
//!
//! The engine-facing half of Perch: a minimal scene graph that placement
//! sessions drive, plus everything needed to produce the template object that
//! gets cloned at each placement.
//!
//! This crate provides:
//! - **Scene graph**: the [`SceneGraph`] trait and a default [`Scene`]
//! - **Objects**: [`Object3D`] with shared mesh data and a [`Material`]
//! - **Geometry**: box and ring primitives for the placeholder and reticle
//! - **Animation**: eased scale animations for entrance effects
//! - **Loading**: glTF / OBJ loaders behind the [`AssetLoader`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use perch_scene::prelude::*;
//! use perch_core::{Pose, Vec3};
//!
//! let mut scene = Scene::new();
//! let template = placeholder_template(0.2);
//!
//! let model = scene.clone_template(&template, "model-0");
//! let id = scene.add_object(model);
//! scene.set_pose(id, &Pose::at(Vec3::new(0.0, 0.0, -1.0)));
//! assert_eq!(scene.len(), 1);
//! ```

// Scene graph
pub mod graph;

// Objects and materials
pub mod object3d;

// Geometry primitives
pub mod geometry;

// Eased property animation
pub mod animation;

// Asset loading
pub mod loader;

// Built-in template objects
pub mod templates;

// Prelude for common imports
pub mod prelude;

pub use animation::{Easing, ScaleAnimation};
pub use geometry::{BoundingBox, BoxGeometry, Geometry, RingGeometry, Vertex};
pub use graph::{Scene, SceneGraph};
pub use loader::{AssetLoader, FileAssetLoader, LoadError, MeshLoader, MeshLoaderRegistry};
pub use object3d::{Material, Object3D, ObjectId};
pub use templates::{placeholder_template, reticle_template, PLACEHOLDER_NAME, RETICLE_NAME};
