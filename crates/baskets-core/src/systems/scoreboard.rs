use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use crate::components::pose::Pose;
use crate::components::room::RoomBoundary;

/// Distance the board sits outside the wall plane.
const WALL_GAP: f32 = 0.1;
/// Height of the board above the viewer's head position.
const ABOVE_VIEWER: f32 = 1.5;

/// Pose for the scoreboard on the wall closest to the viewer, at the
/// viewer's lateral position, facing into the room.
pub fn place_scoreboard(room: &RoomBoundary, camera: Vec3) -> Pose {
    let y = camera.y + ABOVE_VIEWER;
    let walls = [
        (
            (camera.x - room.min.x).abs(),
            Vec3::new(room.min.x - WALL_GAP, y, camera.z),
            FRAC_PI_2,
        ),
        (
            (camera.x - room.max.x).abs(),
            Vec3::new(room.max.x + WALL_GAP, y, camera.z),
            -FRAC_PI_2,
        ),
        (
            (camera.z - room.min.z).abs(),
            Vec3::new(camera.x, y, room.min.z - WALL_GAP),
            0.0,
        ),
        (
            (camera.z - room.max.z).abs(),
            Vec3::new(camera.x, y, room.max.z + WALL_GAP),
            PI,
        ),
    ];

    // First wall wins ties
    let mut best = walls[0];
    for wall in &walls[1..] {
        if wall.0 < best.0 {
            best = *wall;
        }
    }
    Pose::new(best.1, Quat::from_rotation_y(best.2))
}
