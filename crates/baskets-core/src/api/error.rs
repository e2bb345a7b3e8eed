use std::fmt;

use crate::api::types::ControllerId;

/// Non-fatal simulation errors. Callers log these and keep running.
#[derive(Debug)]
pub enum SimError {
    /// Grab or release requested while no ball exists.
    NoBall,
    /// Release requested by a controller that is not holding the ball.
    NotHolding(ControllerId),
    /// Placement requested before the room boundary is known.
    RoomNotReady,
    /// Placement requested before the first camera pose arrived.
    NoCamera,
    /// Input referenced a controller that never connected.
    UnknownController(ControllerId),
    /// Configuration JSON could not be parsed.
    Config(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NoBall => write!(f, "no ball available"),
            SimError::NotHolding(id) => write!(f, "controller {} is not holding the ball", id.0),
            SimError::RoomNotReady => write!(f, "room boundary not configured yet"),
            SimError::NoCamera => write!(f, "camera pose not received yet"),
            SimError::UnknownController(id) => write!(f, "unknown controller {}", id.0),
            SimError::Config(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Config(e)
    }
}
