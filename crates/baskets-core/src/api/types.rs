use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifies a tracked controller (hand). Matches the XR input-source index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerId(pub u32);

/// Which hand a controller is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Parse the WebXR `handedness` string. Anything unexpected maps to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "left" => Handedness::Left,
            "right" => Handedness::Right,
            _ => Handedness::Unknown,
        }
    }
}

/// Identity marker stored in every collider's `user_data`.
/// Lets collision handlers recognise colliders without holding references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderTag {
    Ball,
    Ground,
    Wall,
    Rim,
    Backboard,
    Sensor,
    Untagged,
}

impl ColliderTag {
    pub(crate) fn to_bits(self) -> u128 {
        match self {
            ColliderTag::Untagged => 0,
            ColliderTag::Ball => 1,
            ColliderTag::Ground => 2,
            ColliderTag::Wall => 3,
            ColliderTag::Rim => 4,
            ColliderTag::Backboard => 5,
            ColliderTag::Sensor => 6,
        }
    }

    pub(crate) fn from_bits(bits: u128) -> Self {
        match bits {
            1 => ColliderTag::Ball,
            2 => ColliderTag::Ground,
            3 => ColliderTag::Wall,
            4 => ColliderTag::Rim,
            5 => ColliderTag::Backboard,
            6 => ColliderTag::Sensor,
            _ => ColliderTag::Untagged,
        }
    }
}

/// Gameplay entities that carry a visual asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Ball,
    Hoop,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Ball => "ball",
            EntityKind::Hoop => "hoop",
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(EntityKind::Ball),
            1 => Some(EntityKind::Hoop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Extra point now, double points for a while.
    Fire,
    /// Freezes the shot clock for a while.
    Ice,
}

impl PowerUpKind {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PowerUpKind::Fire),
            1 => Some(PowerUpKind::Ice),
            _ => None,
        }
    }

    fn code(self) -> f32 {
        match self {
            PowerUpKind::Fire => 0.0,
            PowerUpKind::Ice => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Misses,
    ShotClock,
}

/// Named gameplay events. Audio, particles and UI subscribe to these;
/// the core never calls into those collaborators directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    RoomBoundaryReady,
    RoomSetupComplete,
    BallSpawned { position: Vec3 },
    HoopSpawned { position: Vec3 },
    BallGrabbed { controller: ControllerId },
    BallReleased { controller: ControllerId, velocity: Vec3, shot: bool },
    BasketScored { score: u32 },
    MissedShot { missed: u32 },
    NewLevel { level: u32 },
    HoopMoved { position: Vec3 },
    ShotClockTick { remaining: u32 },
    PowerUpStarted { kind: PowerUpKind },
    PowerUpEnded { kind: PowerUpKind },
    GameStarted,
    GameOver { reason: GameOverReason },
    GameReset,
}

/// Event kind codes on the wire. Must stay in sync with the front end.
pub mod event_kind {
    pub const ROOM_BOUNDARY_READY: f32 = 1.0;
    pub const ROOM_SETUP_COMPLETE: f32 = 2.0;
    pub const BALL_SPAWNED: f32 = 3.0;
    pub const HOOP_SPAWNED: f32 = 4.0;
    pub const BALL_GRABBED: f32 = 5.0;
    pub const BALL_RELEASED: f32 = 6.0;
    pub const BASKET_SCORED: f32 = 7.0;
    pub const MISSED_SHOT: f32 = 8.0;
    pub const NEW_LEVEL: f32 = 9.0;
    pub const HOOP_MOVED: f32 = 10.0;
    pub const SHOT_CLOCK_TICK: f32 = 11.0;
    pub const POWER_UP_STARTED: f32 = 12.0;
    pub const POWER_UP_ENDED: f32 = 13.0;
    pub const GAME_STARTED: f32 = 14.0;
    pub const GAME_OVER: f32 = 15.0;
    pub const GAME_RESET: f32 = 16.0;
}

impl GameEvent {
    /// Flatten into the fixed 4-float wire record.
    pub fn to_wire(&self) -> WireEvent {
        use event_kind::*;
        match *self {
            GameEvent::RoomBoundaryReady => WireEvent::new(ROOM_BOUNDARY_READY, 0.0, 0.0, 0.0),
            GameEvent::RoomSetupComplete => WireEvent::new(ROOM_SETUP_COMPLETE, 0.0, 0.0, 0.0),
            GameEvent::BallSpawned { position } => {
                WireEvent::new(BALL_SPAWNED, position.x, position.y, position.z)
            }
            GameEvent::HoopSpawned { position } => {
                WireEvent::new(HOOP_SPAWNED, position.x, position.y, position.z)
            }
            GameEvent::BallGrabbed { controller } => {
                WireEvent::new(BALL_GRABBED, controller.0 as f32, 0.0, 0.0)
            }
            // Speed instead of the full vector: the front end only needs magnitude.
            GameEvent::BallReleased { controller, velocity, shot } => WireEvent::new(
                BALL_RELEASED,
                controller.0 as f32,
                velocity.length(),
                if shot { 1.0 } else { 0.0 },
            ),
            GameEvent::BasketScored { score } => WireEvent::new(BASKET_SCORED, score as f32, 0.0, 0.0),
            GameEvent::MissedShot { missed } => WireEvent::new(MISSED_SHOT, missed as f32, 0.0, 0.0),
            GameEvent::NewLevel { level } => WireEvent::new(NEW_LEVEL, level as f32, 0.0, 0.0),
            GameEvent::HoopMoved { position } => {
                WireEvent::new(HOOP_MOVED, position.x, position.y, position.z)
            }
            GameEvent::ShotClockTick { remaining } => {
                WireEvent::new(SHOT_CLOCK_TICK, remaining as f32, 0.0, 0.0)
            }
            GameEvent::PowerUpStarted { kind } => WireEvent::new(POWER_UP_STARTED, kind.code(), 0.0, 0.0),
            GameEvent::PowerUpEnded { kind } => WireEvent::new(POWER_UP_ENDED, kind.code(), 0.0, 0.0),
            GameEvent::GameStarted => WireEvent::new(GAME_STARTED, 0.0, 0.0, 0.0),
            GameEvent::GameOver { reason } => WireEvent::new(
                GAME_OVER,
                match reason {
                    GameOverReason::Misses => 0.0,
                    GameOverReason::ShotClock => 1.0,
                },
                0.0,
                0.0,
            ),
            GameEvent::GameReset => WireEvent::new(GAME_RESET, 0.0, 0.0, 0.0),
        }
    }
}

/// A game event as written to the shared buffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct WireEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl WireEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}
