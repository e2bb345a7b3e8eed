use glam::{Quat, Vec3};

use crate::api::config::GameConfig;
use crate::api::error::SimError;
use crate::api::types::{ColliderTag, ControllerId, Handedness};
use crate::components::ball::{BallState, Possession};
use crate::components::pose::Pose;
use crate::components::room::RoomBoundary;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsWorld};
use crate::systems::interaction::{self, GrabOutcome};

/// Result of a successful release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Fast enough to count as a shot attempt.
    pub shot: bool,
}

/// Where a fresh ball goes: 1 m in front of the viewer, resting on the floor,
/// kept inside the room.
pub fn spawn_position(
    camera: &Pose,
    room: Option<&RoomBoundary>,
    floor_offset: f32,
    config: &GameConfig,
) -> Vec3 {
    let mut pos = camera.ahead(config.ball_spawn_distance);
    pos.y = config.ball_radius + floor_offset;
    match room {
        Some(room) => room.clamp_xz(pos, config.ball_radius),
        None => pos,
    }
}

/// Create the ball as a free dynamic body at `position`.
pub fn spawn(world: &mut PhysicsWorld, ball: &mut BallState, position: Vec3, config: &GameConfig) {
    remove(world, ball);
    ball.radius = config.ball_radius;
    ball.pose = Pose::from_position(position);
    ball.possession = Possession::Free;
    create_body(world, ball, position, Vec3::ZERO, config);
    ball.present = true;
    log::info!("Ball spawned at {:?}", position);
}

/// Drop the ball from the world entirely.
pub fn remove(world: &mut PhysicsWorld, ball: &mut BallState) {
    if let Some(body) = ball.body.take() {
        world.remove_body(&body);
    }
    ball.possession = Possession::Free;
    ball.present = false;
}

fn create_body(
    world: &mut PhysicsWorld,
    ball: &mut BallState,
    position: Vec3,
    velocity: Vec3,
    config: &GameConfig,
) {
    let desc = BodyDesc::dynamic(ColliderDesc::Ball {
        radius: config.ball_radius,
    })
    .with_position(position)
    .with_rotation(ball.pose.rotation)
    .with_velocity(velocity)
    .with_ccd(true)
    .with_tag(ColliderTag::Ball);
    let material = ColliderMaterial {
        restitution: config.ball_restitution,
        friction: config.ball_friction,
        density: 1.0,
    };
    ball.body = Some(world.create_body(&desc, material));
}

/// Attach the ball to `controller`. Taking the ball from the world destroys
/// its body; it follows the controller until released.
pub fn grab(
    world: &mut PhysicsWorld,
    ball: &mut BallState,
    controller: ControllerId,
    controller_pose: Option<Pose>,
    handedness: Handedness,
) -> Result<GrabOutcome, SimError> {
    let outcome = interaction::grab(&mut ball.possession, controller, ball.present)?;
    if let Some(body) = ball.body.take() {
        world.remove_body(&body);
    }
    if let Some(pose) = controller_pose {
        follow_controller(ball, &pose, handedness);
    }
    Ok(outcome)
}

/// Keep a held ball at the hand offset in the controller's frame.
pub fn follow_controller(ball: &mut BallState, controller_pose: &Pose, handedness: Handedness) {
    if !ball.is_held() {
        return;
    }
    ball.pose = Pose::new(
        controller_pose.transform_point(interaction::hold_offset(handedness)),
        controller_pose.rotation,
    );
}

/// Hand the ball back to physics at its current (held) position with the
/// controller's tracked velocity.
pub fn release(
    world: &mut PhysicsWorld,
    ball: &mut BallState,
    controller: ControllerId,
    velocity: Vec3,
    config: &GameConfig,
) -> Result<Release, SimError> {
    if !ball.present {
        return Err(SimError::NoBall);
    }
    interaction::release(&mut ball.possession, controller)?;
    let position = ball.pose.position;
    create_body(world, ball, position, velocity, config);
    Ok(Release {
        position,
        velocity,
        shot: interaction::is_shot(velocity, config.throw_threshold),
    })
}

/// Mirror the free ball's body onto its visual pose and keep it inside the
/// room. A clamped ball loses its velocity.
pub fn update_physics_visual_sync(
    world: &mut PhysicsWorld,
    ball: &mut BallState,
    room: Option<&RoomBoundary>,
) {
    if ball.is_held() {
        return;
    }
    let Some(body) = ball.body else { return };
    let (pos, rot) = world.body_pose(&body);
    let clamped = match room {
        Some(room) => room.clamp_xz(pos, ball.radius),
        None => pos,
    };
    if clamped != pos {
        world.set_translation(&body, clamped);
        world.set_velocity(&body, Vec3::ZERO);
    }
    ball.pose = Pose::new(clamped, normalize(rot));
}

fn normalize(q: Quat) -> Quat {
    if q.is_finite() && q.length_squared() > 0.0 {
        q.normalize()
    } else {
        Quat::IDENTITY
    }
}
