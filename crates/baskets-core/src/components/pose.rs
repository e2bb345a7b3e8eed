use glam::{Quat, Vec3};

/// World-space position and orientation of a tracked or simulated object.
/// Uses the WebXR convention: Y-up, the viewer looks down local -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Map a point from this pose's local space into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Point `distance` units straight ahead (along local -Z).
    pub fn ahead(&self, distance: f32) -> Vec3 {
        self.transform_point(Vec3::new(0.0, 0.0, -distance))
    }
}

/// Yaw-only rotation that turns local +Z at `from` toward `target`.
/// Pitch and roll stay zero so a hoop opening remains level.
/// Returns identity when the two points share the same XZ position.
pub fn yaw_facing(from: Vec3, target: Vec3) -> Quat {
    let dx = target.x - from.x;
    let dz = target.z - from.z;
    if dx * dx + dz * dz < 1e-10 {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y(dx.atan2(dz))
}
