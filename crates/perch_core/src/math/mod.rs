//! Math types for poses and transforms

mod mat4;
mod pose;
mod quat;
mod vec3;

pub use mat4::Mat4;
pub use pose::Pose;
pub use quat::Quat;
pub use vec3::Vec3;
