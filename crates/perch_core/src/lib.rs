//! Perch Core
//!
//! Foundational value types shared by every Perch crate:
//!
//! - **Math**: [`Vec3`], [`Quat`], [`Mat4`] (column-major) and [`Pose`]
//! - **Color**: linear RGBA [`Color`]
//!
//! Poses reported by an XR platform arrive either as position + quaternion or
//! as a 4x4 rigid transform; [`Pose::from_matrix`] and [`Pose::to_matrix`]
//! convert between the two.
//!
//! # Example
//!
//! ```rust
//! use perch_core::{Pose, Quat, Vec3};
//!
//! let pose = Pose::new(Vec3::new(0.0, 0.0, -1.0), Quat::IDENTITY);
//! let roundtrip = Pose::from_matrix(&pose.to_matrix());
//! assert!(pose.approx_eq(&roundtrip, 1e-5));
//! ```

pub mod color;
pub mod math;

pub use color::Color;
pub use math::{Mat4, Pose, Quat, Vec3};
