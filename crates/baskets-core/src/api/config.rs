use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::api::error::SimError;

/// Tuning for the simulation. Every field has a default, so the front end
/// only sends what it wants to override:
///
/// ```json
/// { "shot_clock_initial": 30, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum physics steps per rendered frame before time is dropped.
    pub max_steps_per_frame: u32,
    /// World gravity, Y-up.
    pub gravity: Vec3,

    pub ball_radius: f32,
    pub ball_restitution: f32,
    pub ball_friction: f32,
    /// Distance in front of the camera where the ball spawns.
    pub ball_spawn_distance: f32,

    pub hoop_radius: f32,
    /// Rim height above the floor.
    pub hoop_height: f32,
    /// Distance in front of the camera for the first hoop.
    pub hoop_spawn_distance: f32,
    /// Keep-out distance around the player for hoop respawns.
    pub safe_radius: f32,
    /// Minimum planar distance between consecutive hoop positions.
    pub min_hoop_spacing: f32,
    /// Regions per axis of the placement grid.
    pub grid_regions: u32,
    /// Also exclude the neighbours of the previous region.
    pub strict_regions: bool,
    /// Seconds between a made basket and the hoop visibly moving.
    pub reposition_delay: f32,
    /// Base oscillation amplitude as a fraction of the room range.
    pub movement_amplitude: f32,
    /// Base oscillation frequency in Hz.
    pub movement_frequency: f32,
    /// Cap on the per-level amplitude/frequency multipliers.
    pub max_level_factor: f32,

    /// Seconds during which the sensor ignores further baskets.
    pub sensor_cooldown: f32,
    /// Release speed above which a throw counts as a shot.
    pub throw_threshold: f32,
    pub max_missed_shots: u32,
    pub shot_clock_initial: u32,
    pub shot_clock_floor: u32,

    pub fire_duration: f32,
    pub ice_duration: f32,

    /// Seed for hoop placement randomness.
    pub seed: u64,
    /// Game events the bridge can hand to the front end per frame.
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 10,
            gravity: Vec3::new(0.0, -9.8, 0.0),
            ball_radius: 0.12,
            ball_restitution: 0.7,
            ball_friction: 0.7,
            ball_spawn_distance: 1.0,
            hoop_radius: 0.28,
            hoop_height: 1.75,
            hoop_spawn_distance: 2.5,
            safe_radius: 3.0,
            min_hoop_spacing: 2.0,
            grid_regions: 3,
            strict_regions: false,
            reposition_delay: 0.2,
            movement_amplitude: 0.2,
            movement_frequency: 0.5,
            max_level_factor: 2.0,
            sensor_cooldown: 0.5,
            throw_threshold: 0.5,
            max_missed_shots: 3,
            shot_clock_initial: 24,
            shot_clock_floor: 3,
            fire_duration: 10.0,
            ice_duration: 5.0,
            seed: 42,
            max_events: 32,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) config from JSON.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }
}
