use glam::{Quat, Vec3};

use crate::api::types::ControllerId;
use crate::components::pose::Pose;
use crate::core::physics::PhysicsBody;

/// Who has the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Possession {
    #[default]
    Free,
    Held(ControllerId),
}

impl Possession {
    pub fn holder(self) -> Option<ControllerId> {
        match self {
            Possession::Free => None,
            Possession::Held(id) => Some(id),
        }
    }
}

/// The single ball. While held it has no physics body and its pose follows
/// the holding controller; while free the pose mirrors the body.
#[derive(Debug, Clone)]
pub struct BallState {
    pub body: Option<PhysicsBody>,
    pub possession: Possession,
    pub radius: f32,
    pub pose: Pose,
    /// False once the ball has been removed (game over or teardown).
    pub present: bool,
}

impl BallState {
    pub fn new(radius: f32) -> Self {
        Self {
            body: None,
            possession: Possession::Free,
            radius,
            pose: Pose::IDENTITY,
            present: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn rotation(&self) -> Quat {
        self.pose.rotation
    }

    pub fn is_held(&self) -> bool {
        matches!(self.possession, Possession::Held(_))
    }
}
