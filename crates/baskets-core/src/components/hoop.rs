use glam::{Quat, Vec3};

use crate::components::pose::Pose;
use crate::core::physics::PhysicsBody;

/// Which axes the hoop oscillates along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl MotionAxes {
    pub const NONE: MotionAxes = MotionAxes {
        x: false,
        y: false,
        z: false,
    };

    pub fn any(self) -> bool {
        self.x || self.y || self.z
    }
}

/// Oscillation parameters, captured each time the hoop is repositioned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoopMotion {
    /// Room range per axis.
    pub amplitude: Vec3,
    /// Normalised offset of `base` from `center`, used as the sine phase.
    pub phase: Vec3,
    pub center: Vec3,
    /// Resting position the oscillation is added to.
    pub base: Vec3,
    pub movement_amplitude: f32,
    pub movement_frequency: f32,
    pub axes: MotionAxes,
}

impl HoopMotion {
    pub fn new(movement_amplitude: f32, movement_frequency: f32) -> Self {
        Self {
            amplitude: Vec3::ZERO,
            phase: Vec3::ZERO,
            center: Vec3::ZERO,
            base: Vec3::ZERO,
            movement_amplitude,
            movement_frequency,
            axes: MotionAxes::NONE,
        }
    }
}

/// Kinematic bodies that make up the hoop in the physics world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoopBodies {
    /// Rim ring plus backboard.
    pub rim: PhysicsBody,
    /// Thin trigger cylinder just under the rim.
    pub sensor: PhysicsBody,
}

#[derive(Debug, Clone)]
pub struct HoopState {
    pub pose: Pose,
    pub radius: f32,
    /// Rim height above the floor.
    pub height: f32,
    /// Set between a reposition request and the move actually happening.
    pub is_moving: bool,
    pub motion: HoopMotion,
    pub previous_region: Option<usize>,
    pub body: Option<HoopBodies>,
}

impl HoopState {
    pub fn new(radius: f32, height: f32, motion: HoopMotion) -> Self {
        Self {
            pose: Pose::IDENTITY,
            radius,
            height,
            is_moving: false,
            motion,
            previous_region: None,
            body: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn orientation(&self) -> Quat {
        self.pose.rotation
    }

    pub fn is_placed(&self) -> bool {
        self.body.is_some()
    }
}
