use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::api::config::GameConfig;
use crate::api::types::ColliderTag;
use crate::components::hoop::{HoopBodies, HoopMotion, HoopState};
use crate::components::pose::{yaw_facing, Pose};
use crate::components::room::RoomBoundary;
use crate::core::physics::{
    BodyDesc, ColliderAttachment, ColliderDesc, ColliderMaterial, PhysicsWorld,
};
use crate::core::timers::{TimerId, TimerQueue};
use crate::systems::schedule::Scheduled;

/// Number of small spheres approximating the rim torus.
const RIM_SEGMENTS: usize = 12;
const RIM_TUBE_RADIUS: f32 = 0.02;
const BACKBOARD_HALF_EXTENTS: Vec3 = Vec3::new(0.3, 0.2, 0.01);
/// Trigger volume sits this far below the rim centre.
pub const SENSOR_DROP: f32 = 0.05;
const SENSOR_HALF_HEIGHT: f32 = 0.05;
/// Vertical oscillation is damped relative to the horizontal axes.
const Y_MOTION_SCALE: f32 = 0.1;

/// Multiplier applied to oscillation amplitude and frequency from level 3 on.
pub fn level_factor(level: u32, cap: f32) -> f32 {
    (1.0 + 0.1 * (level as f32 - 3.0)).clamp(1.0, cap.max(1.0))
}

/// Where the first hoop goes: 2.5 m in front of the viewer at rim height,
/// kept inside the room.
pub fn initial_position(
    camera: &Pose,
    room: Option<&RoomBoundary>,
    floor_offset: f32,
    config: &GameConfig,
) -> Vec3 {
    let mut pos = camera.ahead(config.hoop_spawn_distance);
    pos.y = config.hoop_height + floor_offset;
    match room {
        Some(room) => room.clamp_xz(pos, config.hoop_radius),
        None => pos,
    }
}

/// Create the hoop facing the viewer and return its position.
pub fn place_initial_hoop(
    world: &mut PhysicsWorld,
    hoop: &mut HoopState,
    camera: &Pose,
    room: Option<&RoomBoundary>,
    floor_offset: f32,
    config: &GameConfig,
) -> Vec3 {
    let position = initial_position(camera, room, floor_offset, config);
    spawn(world, hoop, position, camera.position, config);
    position
}

/// Create rim and sensor bodies at `position`, replacing any existing ones.
pub fn spawn(
    world: &mut PhysicsWorld,
    hoop: &mut HoopState,
    position: Vec3,
    camera: Vec3,
    config: &GameConfig,
) {
    remove(world, hoop);
    hoop.radius = config.hoop_radius;
    hoop.height = config.hoop_height;
    hoop.is_moving = false;
    hoop.pose = Pose::new(position, yaw_facing(position, camera));
    hoop.motion.base = position;
    hoop.body = Some(create_bodies(world, &hoop.pose, hoop.radius));
    log::info!("Hoop spawned at {:?}", position);
}

pub fn remove(world: &mut PhysicsWorld, hoop: &mut HoopState) {
    if let Some(bodies) = hoop.body.take() {
        world.remove_body(&bodies.rim);
        world.remove_body(&bodies.sensor);
    }
    hoop.is_moving = false;
}

fn create_bodies(world: &mut PhysicsWorld, pose: &Pose, radius: f32) -> HoopBodies {
    let rim_material = ColliderMaterial {
        restitution: 0.5,
        friction: 0.5,
        density: 1.0,
    };
    let segment = ColliderDesc::Ball {
        radius: RIM_TUBE_RADIUS,
    };
    let segment_offset =
        |i: usize| Quat::from_rotation_y(TAU * i as f32 / RIM_SEGMENTS as f32) * Vec3::new(radius, 0.0, 0.0);

    let rim = world.create_body(
        &BodyDesc::kinematic(segment)
            .with_position(pose.position)
            .with_rotation(pose.rotation)
            .with_collider_offset(segment_offset(0))
            .with_tag(ColliderTag::Rim),
        rim_material,
    );
    for i in 1..RIM_SEGMENTS {
        world.attach_collider(
            &rim,
            &ColliderAttachment::new(segment, ColliderTag::Rim)
                .at(segment_offset(i))
                .with_material(rim_material),
        );
    }
    // Backboard behind the rim, on the side away from the viewer
    world.attach_collider(
        &rim,
        &ColliderAttachment::new(
            ColliderDesc::Cuboid {
                half_extents: BACKBOARD_HALF_EXTENTS,
            },
            ColliderTag::Backboard,
        )
        .at(Vec3::new(0.0, 0.15, -(radius + 0.03)))
        .with_material(rim_material),
    );

    let sensor = world.create_body(
        &BodyDesc::kinematic(ColliderDesc::Cylinder {
            half_height: SENSOR_HALF_HEIGHT,
            radius: radius * 0.8,
        })
        .with_position(sensor_position(pose.position))
        .with_rotation(pose.rotation)
        .with_tag(ColliderTag::Sensor)
        .as_sensor(),
        ColliderMaterial::default(),
    );

    HoopBodies { rim, sensor }
}

fn sensor_position(hoop_position: Vec3) -> Vec3 {
    hoop_position - Vec3::Y * SENSOR_DROP
}

/// Record oscillation parameters around `new_position` from the room.
pub fn capture_motion(
    motion: &mut HoopMotion,
    new_position: Vec3,
    room: &RoomBoundary,
    floor_offset: f32,
    radius: f32,
    height: f32,
) {
    let inner = room.shrink(radius);
    let min = Vec3::new(inner.min.x, floor_offset + radius, inner.min.z);
    let max = Vec3::new(inner.max.x, floor_offset + height - radius, inner.max.z);
    motion.amplitude = (max - min).max(Vec3::ZERO);
    motion.center = (min + max) * 0.5;
    let offset = new_position - motion.center;
    motion.phase = Vec3::new(
        safe_div(offset.x, motion.amplitude.x),
        safe_div(offset.y, motion.amplitude.y),
        safe_div(offset.z, motion.amplitude.z),
    );
    motion.base = new_position;
}

fn safe_div(num: f32, den: f32) -> f32 {
    if den.abs() > f32::EPSILON {
        num / den
    } else {
        0.0
    }
}

/// Start moving the hoop: capture motion around the target, freeze
/// oscillation and schedule the actual move after `delay` seconds.
pub fn reposition_after_delay(
    hoop: &mut HoopState,
    timers: &mut TimerQueue<Scheduled>,
    new_position: Vec3,
    room: Option<&RoomBoundary>,
    floor_offset: f32,
    delay: f32,
) -> TimerId {
    hoop.is_moving = true;
    match room {
        Some(room) => capture_motion(
            &mut hoop.motion,
            new_position,
            room,
            floor_offset,
            hoop.radius,
            hoop.height,
        ),
        None => hoop.motion.base = new_position,
    }
    timers.cancel_where(|a| matches!(a, Scheduled::MoveHoop { .. }));
    timers.schedule(
        delay,
        Scheduled::MoveHoop {
            position: new_position,
        },
    )
}

/// Move rim, sensor and visual to `new_position` in one go, turning the
/// hoop toward the viewer. Clears `is_moving`.
pub fn apply_move(world: &mut PhysicsWorld, hoop: &mut HoopState, new_position: Vec3, camera: Vec3) {
    let rotation = yaw_facing(new_position, camera);
    hoop.pose = Pose::new(new_position, rotation);
    hoop.motion.base = new_position;
    hoop.is_moving = false;
    if let Some(bodies) = hoop.body {
        world.teleport(&bodies.rim, new_position, rotation);
        world.teleport(&bodies.sensor, sensor_position(new_position), rotation);
    }
    log::info!("Hoop moved to {:?}", new_position);
}

/// Per-frame sinusoidal drift along the enabled axes.
pub fn update_oscillation(
    world: &mut PhysicsWorld,
    hoop: &mut HoopState,
    level: u32,
    elapsed: f32,
    room: Option<&RoomBoundary>,
    floor_offset: f32,
    config: &GameConfig,
) {
    if hoop.is_moving || !hoop.motion.axes.any() {
        return;
    }
    let target = oscillated_position(hoop, level, elapsed, room, floor_offset, config);
    hoop.pose.position = target;
    if let Some(bodies) = hoop.body {
        world.set_kinematic_pose(&bodies.rim, target, hoop.pose.rotation);
        world.set_kinematic_pose(&bodies.sensor, sensor_position(target), hoop.pose.rotation);
    }
}

/// Position the oscillation puts the hoop at for `elapsed` seconds.
pub fn oscillated_position(
    hoop: &HoopState,
    level: u32,
    elapsed: f32,
    room: Option<&RoomBoundary>,
    floor_offset: f32,
    config: &GameConfig,
) -> Vec3 {
    let m = &hoop.motion;
    let factor = level_factor(level, config.max_level_factor);
    let omega = TAU * m.movement_frequency * factor;
    let swing = m.movement_amplitude * factor;
    let wave = |amplitude: f32, phase: f32| amplitude * swing * (omega * elapsed + phase).sin();

    let mut offset = Vec3::ZERO;
    if m.axes.x {
        offset.x = wave(m.amplitude.x, m.phase.x);
    }
    if m.axes.y {
        offset.y = wave(m.amplitude.y, m.phase.y) * Y_MOTION_SCALE;
    }
    if m.axes.z {
        offset.z = wave(m.amplitude.z, m.phase.z);
    }

    let mut target = m.base + offset;
    if let Some(room) = room {
        target = room.clamp_xz(target, hoop.radius);
    }
    let y_min = floor_offset + hoop.radius;
    let y_max = floor_offset + hoop.height + 1.0;
    target.y = target.y.clamp(y_min, y_max.max(y_min));
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::hoop::MotionAxes;

    fn setup() -> (GameConfig, PhysicsWorld, HoopState, RoomBoundary) {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        world.set_dt(config.fixed_dt);
        let hoop = HoopState::new(
            config.hoop_radius,
            config.hoop_height,
            HoopMotion::new(config.movement_amplitude, config.movement_frequency),
        );
        let room = RoomBoundary::new(Vec3::new(-3.0, 0.0, -4.0), Vec3::new(3.0, 2.5, 4.0));
        (config, world, hoop, room)
    }

    #[test]
    fn level_factor_ramps_and_caps() {
        assert_eq!(level_factor(1, 2.0), 1.0);
        assert_eq!(level_factor(3, 2.0), 1.0);
        assert!((level_factor(5, 2.0) - 1.2).abs() < 1e-6);
        assert_eq!(level_factor(40, 2.0), 2.0);
    }

    #[test]
    fn initial_hoop_faces_camera_inside_room() {
        let (config, mut world, mut hoop, room) = setup();
        let camera = Pose::from_position(Vec3::new(0.0, 1.6, -2.0));
        let pos = place_initial_hoop(&mut world, &mut hoop, &camera, Some(&room), 0.0, &config);

        // 2.5 m ahead would be z = -4.5; clamped to the wall minus radius
        assert!((pos.z - (-4.0 + 0.28)).abs() < 1e-5, "pos={:?}", pos);
        assert!((pos.y - 1.75).abs() < 1e-6);
        let facing = hoop.orientation() * Vec3::Z;
        let to_camera = (camera.position - pos) * Vec3::new(1.0, 0.0, 1.0);
        assert!(facing.dot(to_camera.normalize()) > 0.999);

        // Rim ring + backboard on one body, sensor on another
        assert_eq!(world.body_count(), 2);
        assert_eq!(world.collider_count(), RIM_SEGMENTS + 2);
        let bodies = hoop.body.unwrap();
        assert!(world.is_sensor(bodies.sensor.collider_handle));
        assert_eq!(world.collider_tag(bodies.rim.collider_handle), Some(ColliderTag::Rim));
    }

    #[test]
    fn apply_move_moves_rim_sensor_and_visual_together() {
        let (config, mut world, mut hoop, _) = setup();
        spawn(&mut world, &mut hoop, Vec3::new(0.0, 1.75, -2.0), Vec3::ZERO, &config);

        let target = Vec3::new(1.5, 1.75, 2.0);
        apply_move(&mut world, &mut hoop, target, Vec3::ZERO);

        let bodies = hoop.body.unwrap();
        assert_eq!(hoop.position(), target);
        assert!((world.body_pose(&bodies.rim).0 - target).length() < 1e-5);
        assert!((world.body_pose(&bodies.sensor).0 - (target - Vec3::Y * SENSOR_DROP)).length() < 1e-5);
        assert!(!hoop.is_moving);
    }

    #[test]
    fn reposition_schedules_a_single_pending_move() {
        let (config, mut world, mut hoop, room) = setup();
        spawn(&mut world, &mut hoop, Vec3::new(0.0, 1.75, -2.0), Vec3::ZERO, &config);
        let mut timers = TimerQueue::new();

        reposition_after_delay(&mut hoop, &mut timers, Vec3::new(1.0, 1.75, 1.0), Some(&room), 0.0, 0.2);
        let id = reposition_after_delay(&mut hoop, &mut timers, Vec3::new(2.0, 1.75, 3.0), Some(&room), 0.0, 0.2);
        assert!(hoop.is_moving);
        assert_eq!(timers.len(), 1);
        assert!(timers.is_pending(id));

        assert!(timers.advance(0.1).is_empty());
        let fired = timers.advance(0.15);
        assert_eq!(fired, vec![Scheduled::MoveHoop { position: Vec3::new(2.0, 1.75, 3.0) }]);
    }

    #[test]
    fn captured_motion_centres_on_room() {
        let (config, _, mut hoop, room) = setup();
        capture_motion(&mut hoop.motion, Vec3::new(1.36, 1.75, 0.0), &room, 0.0, config.hoop_radius, config.hoop_height);
        let m = hoop.motion;
        assert!((m.amplitude.x - 5.44).abs() < 1e-4);
        assert!((m.amplitude.z - 7.44).abs() < 1e-4);
        assert!(m.center.x.abs() < 1e-6);
        assert!((m.phase.x - 0.25).abs() < 1e-4);
        assert_eq!(m.base, Vec3::new(1.36, 1.75, 0.0));
    }

    #[test]
    fn oscillation_stays_in_room_and_pauses_while_moving() {
        let (config, mut world, mut hoop, room) = setup();
        let start = Vec3::new(2.0, 1.75, 0.0);
        spawn(&mut world, &mut hoop, start, Vec3::ZERO, &config);
        capture_motion(&mut hoop.motion, start, &room, 0.0, hoop.radius, hoop.height);
        hoop.motion.axes = MotionAxes { x: true, y: true, z: true };

        for i in 0..240 {
            let t = i as f32 / 60.0;
            let p = oscillated_position(&hoop, 12, t, Some(&room), 0.0, &config);
            assert!(room.contains_xz(p, hoop.radius), "t={} p={:?}", t, p);
            assert!(p.y >= hoop.radius && p.y <= hoop.height + 1.0);
        }

        hoop.is_moving = true;
        update_oscillation(&mut world, &mut hoop, 12, 0.7, Some(&room), 0.0, &config);
        assert_eq!(hoop.position(), start);
    }

    #[test]
    fn no_axes_means_no_drift() {
        let (config, mut world, mut hoop, room) = setup();
        let start = Vec3::new(0.0, 1.75, 1.0);
        spawn(&mut world, &mut hoop, start, Vec3::ZERO, &config);
        capture_motion(&mut hoop.motion, start, &room, 0.0, hoop.radius, hoop.height);
        update_oscillation(&mut world, &mut hoop, 4, 1.3, Some(&room), 0.0, &config);
        assert_eq!(hoop.position(), start);
    }

    #[test]
    fn lateral_oscillation_follows_sine() {
        let (config, mut world, mut hoop, room) = setup();
        let start = Vec3::new(0.0, 1.75, 0.0);
        spawn(&mut world, &mut hoop, start, Vec3::ZERO, &config);
        capture_motion(&mut hoop.motion, start, &room, 0.0, hoop.radius, hoop.height);
        hoop.motion.axes = MotionAxes { x: true, y: false, z: false };

        // Quarter period at level 3: sin = 1
        let t = 0.25 / config.movement_frequency;
        update_oscillation(&mut world, &mut hoop, 3, t, Some(&room), 0.0, &config);
        let expected = 5.44 * config.movement_amplitude;
        assert!((hoop.position().x - expected).abs() < 1e-3, "x={}", hoop.position().x);
        assert_eq!(hoop.position().z, 0.0);
    }
}
