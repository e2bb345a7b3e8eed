/// Shared frame buffer layout.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Scoreboard pose: 8 floats]
/// [Instances: max_instances × 8 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written into the header on every frame.
/// TypeScript reads them from the header to compute offsets dynamically.

use crate::api::config::GameConfig;
use crate::api::session::FrameSnapshot;
use crate::api::types::{EntityKind, GameEvent, WireEvent};
use crate::components::pose::Pose;
use crate::renderer::instance::{PoseBuffer, PoseInstance};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PROTOCOL_VERSION: usize = 2;
pub const HEADER_MAX_INSTANCES: usize = 3;
pub const HEADER_INSTANCE_COUNT: usize = 4;
pub const HEADER_MAX_EVENTS: usize = 5;
pub const HEADER_EVENT_COUNT: usize = 6;
pub const HEADER_SCORE: usize = 7;
pub const HEADER_LEVEL: usize = 8;
pub const HEADER_SHOT_CLOCK: usize = 9;
pub const HEADER_GAME_CLOCK: usize = 10;
pub const HEADER_MISSED_SHOTS: usize = 11;
pub const HEADER_FLAGS: usize = 12;
pub const HEADER_SCOREBOARD_VALID: usize = 13;

/// Bits of `HEADER_FLAGS`.
pub const FLAG_GAME_STARTED: u32 = 1;
pub const FLAG_GAME_OVER: u32 = 1 << 1;
pub const FLAG_BALL_HELD: u32 = 1 << 2;
/// The hoop sits closer to its previous spot than the configured spacing.
pub const FLAG_HOOP_SPACING_RELAXED: u32 = 1 << 3;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Ball and hoop.
pub const MAX_INSTANCES: usize = 2;

/// Floats per pose (wire format, never changes).
pub const POSE_FLOATS: usize = PoseInstance::FLOATS;

/// Floats per game event: kind, a, b, c (wire format, never changes).
pub const EVENT_FLOATS: usize = WireEvent::FLOATS;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_instances: usize,
    /// Maximum game events per frame.
    pub max_events: usize,

    pub scoreboard_offset: usize,
    pub instance_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_events: usize) -> Self {
        let scoreboard_offset = HEADER_FLOATS;
        let instance_data_offset = scoreboard_offset + POSE_FLOATS;
        let event_data_offset = instance_data_offset + MAX_INSTANCES * POSE_FLOATS;
        let buffer_total_floats = event_data_offset + max_events * EVENT_FLOATS;

        Self {
            max_instances: MAX_INSTANCES,
            max_events,
            scoreboard_offset,
            instance_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_events)
    }
}

/// The flat buffer the front end reads each frame.
pub struct FrameBuffer {
    layout: ProtocolLayout,
    data: Vec<f32>,
    poses: PoseBuffer,
    frame: u32,
}

impl FrameBuffer {
    pub fn new(layout: ProtocolLayout) -> Self {
        let data = vec![0.0; layout.buffer_total_floats];
        Self {
            layout,
            data,
            poses: PoseBuffer::new(),
            frame: 0,
        }
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    /// Serialize one frame. Events past `max_events` are dropped with a warning.
    pub fn write(&mut self, snapshot: &FrameSnapshot, events: &[GameEvent]) {
        let layout = &self.layout;
        self.frame = self.frame.wrapping_add(1);

        self.poses.clear();
        if let Some(ball) = &snapshot.ball {
            self.poses.push(PoseInstance::new(EntityKind::Ball, ball, &snapshot.ball_visual));
        }
        if let Some(hoop) = &snapshot.hoop {
            self.poses.push(PoseInstance::new(EntityKind::Hoop, hoop, &snapshot.hoop_visual));
        }

        let event_count = events.len().min(layout.max_events);
        if event_count < events.len() {
            log::warn!(
                "Dropping {} game events (capacity {})",
                events.len() - event_count,
                layout.max_events
            );
        }

        let hud = &snapshot.hud;
        let mut flags = 0;
        if hud.game_started {
            flags |= FLAG_GAME_STARTED;
        }
        if hud.game_over {
            flags |= FLAG_GAME_OVER;
        }
        if snapshot.ball_held {
            flags |= FLAG_BALL_HELD;
        }
        if hud.hoop_spacing_relaxed {
            flags |= FLAG_HOOP_SPACING_RELAXED;
        }

        let header = &mut self.data[..HEADER_FLOATS];
        header.fill(0.0);
        header[HEADER_FRAME_COUNTER] = self.frame as f32;
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_MAX_INSTANCES] = layout.max_instances as f32;
        header[HEADER_INSTANCE_COUNT] = self.poses.instance_count() as f32;
        header[HEADER_MAX_EVENTS] = layout.max_events as f32;
        header[HEADER_EVENT_COUNT] = event_count as f32;
        header[HEADER_SCORE] = hud.score as f32;
        header[HEADER_LEVEL] = hud.level as f32;
        header[HEADER_SHOT_CLOCK] = hud.shot_clock as f32;
        header[HEADER_GAME_CLOCK] = hud.game_clock as f32;
        header[HEADER_MISSED_SHOTS] = hud.missed_shots as f32;
        header[HEADER_FLAGS] = flags as f32;
        header[HEADER_SCOREBOARD_VALID] = if snapshot.scoreboard.is_some() { 1.0 } else { 0.0 };

        let board = snapshot.scoreboard.unwrap_or(Pose::IDENTITY);
        let q = board.rotation;
        let p = board.position;
        self.data[layout.scoreboard_offset..layout.instance_data_offset]
            .copy_from_slice(&[p.x, p.y, p.z, q.x, q.y, q.z, q.w, 0.0]);

        let poses = self.poses.as_floats();
        let start = layout.instance_data_offset;
        self.data[start..start + poses.len()].copy_from_slice(poses);

        let mut offset = layout.event_data_offset;
        for event in &events[..event_count] {
            let wire = event.to_wire();
            self.data[offset..offset + EVENT_FLOATS].copy_from_slice(bytemuck::cast_slice(&[wire]));
            offset += EVENT_FLOATS;
        }
    }
}
