//! Geometry primitives

mod primitives;
mod vertex;

pub use primitives::{BoxGeometry, RingGeometry};
pub use vertex::{BoundingBox, Geometry, Vertex};
