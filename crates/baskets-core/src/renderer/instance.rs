use bytemuck::{Pod, Zeroable};

use crate::api::types::EntityKind;
use crate::assets::registry::VisualSource;
use crate::components::pose::Pose;

/// Per-entity render data read by the front end straight out of WASM memory.
/// Must match the TypeScript protocol: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PoseInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation quaternion.
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
    /// `EntityKind` code in the integer part; +0.5 when the entity should be
    /// drawn with its primitive placeholder.
    pub visual: f32,
}

impl PoseInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(kind: EntityKind, pose: &Pose, visual: &VisualSource) -> Self {
        let q = pose.rotation;
        let placeholder = if matches!(visual, VisualSource::Model(_)) { 0.0 } else { 0.5 };
        Self {
            x: pose.position.x,
            y: pose.position.y,
            z: pose.position.z,
            qx: q.x,
            qy: q.y,
            qz: q.z,
            qw: q.w,
            visual: kind as u32 as f32 + placeholder,
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_code(self.visual as u32)
    }

    pub fn is_placeholder(&self) -> bool {
        self.visual.fract() > 0.25
    }
}

/// The visible entities for one frame.
pub struct PoseBuffer {
    pub instances: Vec<PoseInstance>,
}

impl PoseBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(4),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: PoseInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for PoseBuffer {
    fn default() -> Self {
        Self::new()
    }
}
