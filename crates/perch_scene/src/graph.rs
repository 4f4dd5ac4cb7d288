//! Scene graph
//!
//! [`SceneGraph`] is the surface a placement session drives: it adds cloned
//! template objects, moves and shows/hides them, starts entrance animations
//! and binds the renderer to the current platform session. [`Scene`] is the
//! default in-memory implementation.

use crate::animation::{ScaleAnimation, ScaleTween};
use crate::object3d::{Object3D, ObjectId};
use perch_core::{Pose, Vec3};
use perch_platform::{PlatformError, SessionHandle};
use slotmap::SlotMap;

/// Scene graph operations used by a placement session
pub trait SceneGraph {
    /// Add an object, returning its handle
    fn add_object(&mut self, object: Object3D) -> ObjectId;

    fn object(&self, id: ObjectId) -> Option<&Object3D>;

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D>;

    /// Produce a new object from `template`
    ///
    /// The clone shares mesh data with the template, takes `name` and is
    /// visible regardless of the template's visibility.
    fn clone_template(&self, template: &Object3D, name: &str) -> Object3D {
        let mut object = template.clone();
        object.name = name.to_string();
        object.visible = true;
        object
    }

    /// Set position and orientation; returns `false` for unknown ids
    fn set_pose(&mut self, id: ObjectId, pose: &Pose) -> bool {
        self.object_mut(id).map(|o| o.set_pose(pose)).is_some()
    }

    fn set_position(&mut self, id: ObjectId, position: Vec3) -> bool {
        self.object_mut(id).map(|o| o.position = position).is_some()
    }

    fn set_scale(&mut self, id: ObjectId, scale: Vec3) -> bool {
        self.object_mut(id).map(|o| o.scale = scale).is_some()
    }

    fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        self.object_mut(id).map(|o| o.visible = visible).is_some()
    }

    /// Start a uniform scale animation on `id`, replacing any running one
    fn animate_scale(&mut self, id: ObjectId, animation: ScaleAnimation);

    /// Advance running animations by `dt_ms`
    fn advance(&mut self, dt_ms: f32);

    /// Jump every running animation to its end value
    fn settle_animations(&mut self);

    /// Bind the renderer to `session`, or unbind with `None`
    fn bind_session(&mut self, session: Option<&SessionHandle>) -> Result<(), PlatformError>;
}

/// Default in-memory scene graph
#[derive(Default)]
pub struct Scene {
    objects: SlotMap<ObjectId, Object3D>,
    order: Vec<ObjectId>,
    tweens: Vec<(ObjectId, ScaleTween)>,
    session: Option<SessionHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object3D)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.objects.get(id).map(|o| (id, o)))
    }

    /// First object with `name`
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.iter().find(|(_, o)| o.name == name).map(|(id, _)| id)
    }

    /// Session the renderer is currently bound to
    pub fn bound_session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    /// Number of running animations
    pub fn animating(&self) -> usize {
        self.tweens.len()
    }
}

impl SceneGraph for Scene {
    fn add_object(&mut self, object: Object3D) -> ObjectId {
        let id = self.objects.insert(object);
        self.order.push(id);
        id
    }

    fn object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    fn animate_scale(&mut self, id: ObjectId, animation: ScaleAnimation) {
        let Some(object) = self.objects.get_mut(id) else {
            return;
        };
        object.scale = Vec3::splat(animation.from);
        self.tweens.retain(|(other, _)| *other != id);
        self.tweens.push((id, ScaleTween::new(animation)));
    }

    fn advance(&mut self, dt_ms: f32) {
        let objects = &mut self.objects;
        self.tweens.retain_mut(|(id, tween)| {
            let Some(object) = objects.get_mut(*id) else {
                return false;
            };
            object.scale = Vec3::splat(tween.tick(dt_ms));
            !tween.is_finished()
        });
    }

    fn settle_animations(&mut self) {
        for (id, tween) in self.tweens.drain(..) {
            if let Some(object) = self.objects.get_mut(id) {
                object.scale = Vec3::splat(tween.animation().to);
            }
        }
    }

    fn bind_session(&mut self, session: Option<&SessionHandle>) -> Result<(), PlatformError> {
        match session {
            Some(handle) => tracing::debug!("renderer bound to session {}", handle.id()),
            None => tracing::debug!("renderer unbound"),
        }
        self.session = session.copied();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Easing;
    use crate::templates::placeholder_template;

    #[test]
    fn test_clone_template_is_visible_and_renamed() {
        let scene = Scene::new();
        let template = placeholder_template(0.2).with_visible(false);
        let clone = scene.clone_template(&template, "model-3");
        assert_eq!(clone.name, "model-3");
        assert!(clone.visible);
        assert!(!template.visible);
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut scene = Scene::new();
        for name in ["a", "b", "c"] {
            scene.add_object(Object3D::new(name));
        }
        let names: Vec<_> = scene.iter().map(|(_, o)| o.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(scene.find_by_name("b").is_some());
    }

    #[test]
    fn test_setters() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::new("a"));
        let pose = Pose::at(Vec3::new(1.0, 2.0, 3.0));

        assert!(scene.set_pose(id, &pose));
        assert!(scene.set_visible(id, false));
        let obj = scene.object(id).unwrap();
        assert_eq!(obj.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(!obj.visible);
    }

    #[test]
    fn test_scale_animation_runs_to_completion() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::new("a"));
        let anim = ScaleAnimation::new(0.0, 1.0, 100.0).with_easing(Easing::Linear);

        scene.animate_scale(id, anim);
        assert_eq!(scene.object(id).unwrap().scale, Vec3::ZERO);

        scene.advance(50.0);
        assert!((scene.object(id).unwrap().scale.x - 0.5).abs() < 1e-6);
        assert_eq!(scene.animating(), 1);

        scene.advance(60.0);
        assert_eq!(scene.object(id).unwrap().scale, Vec3::ONE);
        assert_eq!(scene.animating(), 0);
    }

    #[test]
    fn test_settle_finishes_running_animations() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::new("model-0"));
        scene.animate_scale(id, ScaleAnimation::default());
        scene.advance(50.0);
        assert_eq!(scene.animating(), 1);

        scene.settle_animations();

        assert_eq!(scene.animating(), 0);
        assert_eq!(scene.object(id).unwrap().scale, Vec3::splat(0.2));
    }

    #[test]
    fn test_bind_session() {
        let mut scene = Scene::new();
        let handle = SessionHandle::new(7);
        scene.bind_session(Some(&handle)).unwrap();
        assert_eq!(scene.bound_session(), Some(&handle));
        scene.bind_session(None).unwrap();
        assert!(scene.bound_session().is_none());
    }
}
