use glam::{Quat, Vec3};

use crate::api::types::{ControllerId, EntityKind, Handedness, PowerUpKind};

/// Input events the simulation understands.
/// The front end translates XR frames, scene-understanding callbacks and UI
/// buttons into these; the session drains them once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A detected real-world surface with its semantic label and world AABB.
    SurfaceAdded { label: String, min: Vec3, max: Vec3 },
    /// Viewer pose for this frame.
    CameraPose { position: Vec3, rotation: Quat },
    ControllerConnected { id: ControllerId, handedness: Handedness },
    ControllerDisconnected { id: ControllerId },
    /// Grip pose for this frame.
    ControllerPose { id: ControllerId, position: Vec3, rotation: Quat },
    /// Squeeze began.
    GrabStart { id: ControllerId },
    /// Squeeze ended.
    GrabEnd { id: ControllerId },
    /// A visual asset finished loading (`ok = false` means it failed).
    AssetLoaded { asset: EntityKind, ok: bool },
    StartGame,
    /// Only honoured while the game is over.
    ResetGame,
    PowerUp { kind: PowerUpKind },
    EndSession,
}

/// A queue of input events.
/// JS writes events into the queue; Rust reads and drains them each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
