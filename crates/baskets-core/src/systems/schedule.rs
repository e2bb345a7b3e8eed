use glam::Vec3;

use crate::api::types::PowerUpKind;

/// Deferred gameplay actions, run from the session's timer queue.
/// Every handler re-checks `game_over` before acting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scheduled {
    MoveHoop { position: Vec3 },
    PowerUpExpired { kind: PowerUpKind },
}
