//! Eased property animation
//!
//! Only uniform scale is animated: placed objects pop in from a tiny scale to
//! their resting size.

mod easing;
mod scale;

pub use easing::Easing;
pub use scale::{ScaleAnimation, ScaleTween};
