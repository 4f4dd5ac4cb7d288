//! Uniform scale animation

use super::Easing;
use serde::{Deserialize, Serialize};

/// Uniform scale animation description
///
/// ```toml
/// [entrance]
/// from = 0.01
/// to = 0.2
/// duration_ms = 300
/// easing = "ease-out-elastic"
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleAnimation {
    /// Starting uniform scale
    pub from: f32,
    /// Resting uniform scale
    pub to: f32,
    /// Duration in milliseconds
    pub duration_ms: f32,
    pub easing: Easing,
}

impl Default for ScaleAnimation {
    fn default() -> Self {
        Self {
            from: 0.01,
            to: 0.2,
            duration_ms: 300.0,
            easing: Easing::EaseOutElastic,
        }
    }
}

impl ScaleAnimation {
    pub fn new(from: f32, to: f32, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            duration_ms,
            ..Default::default()
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Scale at `elapsed_ms` after the start
    pub fn sample(&self, elapsed_ms: f32) -> f32 {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let t = elapsed_ms / self.duration_ms;
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    pub fn is_finished(&self, elapsed_ms: f32) -> bool {
        elapsed_ms >= self.duration_ms
    }
}

/// A running [`ScaleAnimation`]
#[derive(Clone, Copy, Debug)]
pub struct ScaleTween {
    animation: ScaleAnimation,
    elapsed_ms: f32,
}

impl ScaleTween {
    pub fn new(animation: ScaleAnimation) -> Self {
        Self {
            animation,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `dt_ms` and return the new scale
    pub fn tick(&mut self, dt_ms: f32) -> f32 {
        self.elapsed_ms += dt_ms.max(0.0);
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.is_finished() {
            self.animation.to
        } else {
            self.animation.sample(self.elapsed_ms)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.animation.is_finished(self.elapsed_ms)
    }

    pub fn animation(&self) -> &ScaleAnimation {
        &self.animation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entrance() {
        let anim = ScaleAnimation::default();
        assert!((anim.sample(0.0) - 0.01).abs() < 1e-6);
        assert!((anim.sample(300.0) - 0.2).abs() < 1e-6);
        assert!(anim.is_finished(300.0));
        assert!(!anim.is_finished(299.0));
    }

    #[test]
    fn test_tween_settles_on_target() {
        let mut tween = ScaleTween::new(ScaleAnimation::new(0.0, 1.0, 100.0).with_easing(Easing::Linear));
        assert!((tween.tick(50.0) - 0.5).abs() < 1e-6);
        assert_eq!(tween.tick(80.0), 1.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_zero_duration_jumps_to_target() {
        let anim = ScaleAnimation::new(0.01, 0.5, 0.0);
        assert_eq!(anim.sample(0.0), 0.5);
    }

    #[test]
    fn test_from_toml() {
        let anim: ScaleAnimation = toml::from_str(
            r#"
            to = 0.5
            easing = "ease-out-back"
            "#,
        )
        .unwrap();
        assert_eq!(anim.from, 0.01);
        assert_eq!(anim.to, 0.5);
        assert_eq!(anim.duration_ms, 300.0);
        assert_eq!(anim.easing, Easing::EaseOutBack);
    }
}
