use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::api::types::{ControllerId, Handedness};
use crate::components::pose::Pose;

#[derive(Debug, Clone, Copy, Default)]
struct TrackedController {
    handedness: Handedness,
    pose: Option<Pose>,
    previous_position: Option<Vec3>,
    velocity: Vec3,
}

/// Per-controller pose history. Velocity is a finite difference over the
/// rendered frame, taken once per frame by [`ControllerTracker::update`].
#[derive(Debug, Default)]
pub struct ControllerTracker {
    controllers: HashMap<ControllerId, TrackedController>,
}

impl ControllerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, id: ControllerId, handedness: Handedness) {
        let entry = self.controllers.entry(id).or_default();
        entry.handedness = handedness;
        log::debug!("controller {:?} connected ({:?})", id, handedness);
    }

    pub fn disconnect(&mut self, id: ControllerId) -> bool {
        self.controllers.remove(&id).is_some()
    }

    /// Record the latest grip pose. Unknown controllers are registered with
    /// `Handedness::Unknown`.
    pub fn set_pose(&mut self, id: ControllerId, position: Vec3, rotation: Quat) {
        let entry = self.controllers.entry(id).or_default();
        entry.pose = Some(Pose::new(position, rotation));
    }

    /// Recompute velocities from the movement since the previous update.
    /// The first sample of a controller has zero velocity.
    pub fn update(&mut self, frame_dt: f32) {
        for c in self.controllers.values_mut() {
            let Some(pose) = c.pose else { continue };
            c.velocity = match c.previous_position {
                Some(prev) if frame_dt > 0.0 => (pose.position - prev) / frame_dt,
                _ => Vec3::ZERO,
            };
            c.previous_position = Some(pose.position);
        }
    }

    pub fn contains(&self, id: ControllerId) -> bool {
        self.controllers.contains_key(&id)
    }

    pub fn handedness(&self, id: ControllerId) -> Handedness {
        self.controllers
            .get(&id)
            .map(|c| c.handedness)
            .unwrap_or_default()
    }

    pub fn pose(&self, id: ControllerId) -> Option<Pose> {
        self.controllers.get(&id).and_then(|c| c.pose)
    }

    pub fn velocity(&self, id: ControllerId) -> Vec3 {
        self.controllers
            .get(&id)
            .map(|c| c.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn clear(&mut self) {
        self.controllers.clear();
    }
}
