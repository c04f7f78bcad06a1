//! Drop animation for newly placed objects.
//!
//! Each animation is a small kinematic integrator advanced from the render
//! loop with the frame's elapsed time. One fixed step runs for every
//! [`STEP`] of accumulated time. Animations refer to objects by name, so an
//! object removed mid-fall simply ends its animation.

use std::time::Duration;

use shared::ObjectName;

use crate::error::ViewportError;
use crate::state::{ObjectRegistry, SceneObject};

/// Gravity in scene units/s²
pub const GRAVITY: f32 = 490.0;
/// Initial fall speed
pub const INITIAL_SPEED: f32 = 20.0;
/// Integration step
pub const STEP: Duration = Duration::from_millis(50);
/// Height below the platform where the fall turns into the rebound
pub const FLOOR_Z: f32 = -1.0;
/// Steps run per frame at most; time beyond that is dropped
pub const MAX_STEPS_PER_FRAME: u32 = 40;

const SQUASH_RATE: f32 = 3.0;
const STRETCH_RATE: f32 = 5.0;
const REBOUND_DAMPING: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Falling,
    Rebounding,
}

/// One object's fall-squash-rebound
#[derive(Debug, Clone)]
pub struct DropAnimation {
    name: ObjectName,
    base_z: f32,
    /// Resting Z scale; squash and stretch are relative to it
    base_scale_z: f32,
    velocity: f32,
    phase: Phase,
}

impl DropAnimation {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One fixed step. Returns true once the object is back at rest.
    fn step(&mut self, object: &mut SceneObject, dt: f32) -> bool {
        if self.phase == Phase::Falling {
            if object.position.z > FLOOR_Z {
                object.position.z -= self.velocity * dt;
                self.velocity += GRAVITY * dt;
                if object.position.z < 0.0 {
                    object.scale.z *= 1.0 - SQUASH_RATE * dt;
                }
                return false;
            }
            self.velocity /= REBOUND_DAMPING;
            self.phase = Phase::Rebounding;
        }

        if self.velocity > 0.0 && object.position.z < self.base_z {
            object.position.z += self.velocity * dt;
            self.velocity -= GRAVITY * dt;
            object.scale.z = (object.scale.z * (1.0 + STRETCH_RATE * dt)).min(self.base_scale_z);
        }
        if self.velocity <= 0.0 || object.position.z >= self.base_z {
            self.settle(object);
            return true;
        }
        false
    }

    fn settle(&self, object: &mut SceneObject) {
        object.position.z = self.base_z;
        object.scale.z = self.base_scale_z;
    }
}

/// All running drop animations
#[derive(Debug, Default)]
pub struct DropAnimator {
    animations: Vec<DropAnimation>,
    accumulated: Duration,
}

impl DropAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift `name` by its drop offset and let it fall back to its current height
    pub fn start(&mut self, name: &str, objects: &mut dyn ObjectRegistry) -> Result<(), ViewportError> {
        let object = objects
            .get_mut(name)
            .ok_or_else(|| ViewportError::UnknownObject(name.to_string()))?;

        // Restarting: put the object back at rest first
        if let Some(index) = self.animations.iter().position(|a| a.name == name) {
            self.animations.remove(index).settle(object);
        }
        if object.drop_offset <= 0.0 {
            return Ok(());
        }

        let base_z = object.position.z;
        object.position.z = base_z + object.drop_offset;
        self.animations.push(DropAnimation {
            name: name.to_string(),
            base_z,
            base_scale_z: object.scale.z,
            velocity: INITIAL_SPEED,
            phase: Phase::Falling,
        });
        tracing::debug!("Drop animation started for {name} from z={}", object.position.z);
        Ok(())
    }

    /// Feed the frame's elapsed time. Returns true if any object moved.
    pub fn advance(&mut self, elapsed: Duration, objects: &mut dyn ObjectRegistry) -> bool {
        if self.animations.is_empty() {
            self.accumulated = Duration::ZERO;
            return false;
        }
        self.accumulated += elapsed;
        let dt = STEP.as_secs_f32();
        let mut changed = false;
        let mut steps = 0;

        while self.accumulated >= STEP && !self.animations.is_empty() {
            self.accumulated -= STEP;
            steps += 1;
            self.animations.retain_mut(|animation| match objects.get_mut(&animation.name) {
                Some(object) => {
                    changed = true;
                    !animation.step(object, dt)
                }
                None => {
                    tracing::debug!("Object {} removed mid-drop", animation.name);
                    false
                }
            });
            if steps >= MAX_STEPS_PER_FRAME {
                self.accumulated = Duration::ZERO;
                break;
            }
        }
        changed
    }

    /// Stop everything, leaving each object at rest
    pub fn cancel_all(&mut self, objects: &mut dyn ObjectRegistry) {
        for animation in self.animations.drain(..) {
            if let Some(object) = objects.get_mut(&animation.name) {
                animation.settle(object);
            }
        }
        self.accumulated = Duration::ZERO;
    }

    /// Forget the animation for `name` without touching the object
    pub fn forget(&mut self, name: &str) {
        self.animations.retain(|a| a.name != name);
    }

    pub fn is_active(&self) -> bool {
        !self.animations.is_empty()
    }

    pub fn is_animating(&self, name: &str) -> bool {
        self.animations.iter().any(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::state::SceneObjects;
    use crate::viewport::mesh::MeshData;

    fn scene(z: f32, offset: f32) -> SceneObjects {
        let mut object = SceneObject::new("part", Arc::new(MeshData { vertices: vec![], indices: vec![] }))
            .with_position(Vec3::new(3.0, 4.0, z));
        object.drop_offset = offset;
        let mut objects = SceneObjects::new();
        objects.insert(object).unwrap();
        objects
    }

    fn run_to_rest(animator: &mut DropAnimator, objects: &mut SceneObjects) -> usize {
        let mut frames = 0;
        while animator.is_active() {
            animator.advance(STEP, objects);
            frames += 1;
            assert!(frames < 10_000, "drop animation did not terminate");
            let scale_z = objects.get("part").unwrap().scale.z;
            assert!(scale_z > 0.0 && scale_z <= 1.0);
        }
        frames
    }

    #[test]
    fn test_start_lifts_object() {
        let mut objects = scene(0.0, 300.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        assert_eq!(objects.get("part").unwrap().position.z, 300.0);
        assert!(animator.is_animating("part"));
    }

    #[test]
    fn test_terminates_at_rest_for_any_offset() {
        for base in [0.0, 5.0, 40.0] {
            for offset in [0.5, 1.0, 10.0, 300.0, 2_000.0] {
                let mut objects = scene(base, offset);
                let mut animator = DropAnimator::new();
                animator.start("part", &mut objects).unwrap();
                run_to_rest(&mut animator, &mut objects);

                let part = objects.get("part").unwrap();
                assert_eq!(part.position.z, base, "offset {offset} base {base}");
                assert_eq!(part.scale.z, 1.0);
                assert_eq!(part.position.x, 3.0);
            }
        }
    }

    #[test]
    fn test_squashes_below_platform() {
        let mut objects = scene(0.0, 300.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        let mut min_scale: f32 = 1.0;
        while animator.is_active() {
            animator.advance(STEP, &mut objects);
            min_scale = min_scale.min(objects.get("part").unwrap().scale.z);
        }
        assert!(min_scale < 1.0);
    }

    #[test]
    fn test_keeps_configured_z_scale() {
        let mut objects = scene(0.0, 300.0);
        objects.get_mut("part").unwrap().scale = Vec3::new(1.0, 1.0, 3.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        let mut min_scale: f32 = 3.0;
        while animator.is_active() {
            animator.advance(STEP, &mut objects);
            let scale_z = objects.get("part").unwrap().scale.z;
            assert!(scale_z > 0.0 && scale_z <= 3.0);
            min_scale = min_scale.min(scale_z);
        }
        assert!(min_scale < 3.0);
        assert_eq!(objects.get("part").unwrap().scale.z, 3.0);

        // Cancelling and restarting settle back to the same scale
        animator.start("part", &mut objects).unwrap();
        animator.advance(STEP * 20, &mut objects);
        animator.start("part", &mut objects).unwrap();
        animator.cancel_all(&mut objects);
        assert_eq!(objects.get("part").unwrap().scale.z, 3.0);
    }

    #[test]
    fn test_partial_step_waits() {
        let mut objects = scene(0.0, 300.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        assert!(!animator.advance(Duration::from_millis(20), &mut objects));
        assert_eq!(objects.get("part").unwrap().position.z, 300.0);
        assert!(animator.advance(Duration::from_millis(30), &mut objects));
        assert_eq!(objects.get("part").unwrap().position.z, 299.0);
    }

    #[test]
    fn test_removed_object_ends_animation() {
        let mut objects = scene(0.0, 300.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        objects.remove("part");
        assert!(!animator.advance(STEP, &mut objects));
        assert!(!animator.is_active());
    }

    #[test]
    fn test_cancel_all_settles() {
        let mut objects = scene(2.0, 300.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        animator.advance(STEP * 5, &mut objects);
        animator.cancel_all(&mut objects);
        assert!(!animator.is_active());
        assert_eq!(objects.get("part").unwrap().position.z, 2.0);
        assert_eq!(objects.get("part").unwrap().scale.z, 1.0);
    }

    #[test]
    fn test_restart_uses_rest_height() {
        let mut objects = scene(0.0, 100.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        animator.advance(STEP * 3, &mut objects);
        animator.start("part", &mut objects).unwrap();
        assert_eq!(animator.len(), 1);
        assert_eq!(objects.get("part").unwrap().position.z, 100.0);
    }

    #[test]
    fn test_zero_offset_and_unknown_object() {
        let mut objects = scene(0.0, 0.0);
        let mut animator = DropAnimator::new();
        animator.start("part", &mut objects).unwrap();
        assert!(!animator.is_active());
        assert_eq!(
            animator.start("ghost", &mut objects),
            Err(ViewportError::UnknownObject("ghost".into()))
        );
    }
}
