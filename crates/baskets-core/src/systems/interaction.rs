use glam::Vec3;

use crate::api::error::SimError;
use crate::api::types::{ControllerId, Handedness};
use crate::components::ball::Possession;

/// Ball offset in the holding controller's local frame.
pub fn hold_offset(handedness: Handedness) -> Vec3 {
    match handedness {
        Handedness::Left => Vec3::new(0.1, 0.0, -0.08),
        _ => Vec3::new(-0.1, 0.0, -0.08),
    }
}

/// A release counts as a shot when the throw is faster than `threshold`.
pub fn is_shot(velocity: Vec3, threshold: f32) -> bool {
    velocity.length() > threshold
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabOutcome {
    /// The ball was free and is now held.
    Taken,
    /// Another controller was holding it.
    Stolen { from: ControllerId },
    /// The same controller already holds it.
    AlreadyHeld,
}

/// `Free | Held(other)` → `Held(controller)`.
pub fn grab(
    possession: &mut Possession,
    controller: ControllerId,
    ball_present: bool,
) -> Result<GrabOutcome, SimError> {
    if !ball_present {
        return Err(SimError::NoBall);
    }
    let outcome = match *possession {
        Possession::Free => GrabOutcome::Taken,
        Possession::Held(current) if current == controller => GrabOutcome::AlreadyHeld,
        Possession::Held(other) => GrabOutcome::Stolen { from: other },
    };
    *possession = Possession::Held(controller);
    Ok(outcome)
}

/// `Held(controller)` → `Free`. Anything else is rejected.
pub fn release(possession: &mut Possession, controller: ControllerId) -> Result<(), SimError> {
    match *possession {
        Possession::Held(current) if current == controller => {
            *possession = Possession::Free;
            Ok(())
        }
        _ => Err(SimError::NotHolding(controller)),
    }
}
