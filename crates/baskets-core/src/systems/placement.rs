use glam::{Vec2, Vec3};
use rand::Rng;

use crate::api::config::GameConfig;
use crate::components::pose::Pose;
use crate::components::room::RoomBoundary;

/// Tolerance for spacing comparisons after clamping.
const SPACING_EPS: f32 = 1e-4;

/// Constants that drive hoop placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
    pub hoop_radius: f32,
    /// Keep-out distance from the viewer, per axis.
    pub safe_radius: f32,
    /// Minimum planar distance from the previous hoop position.
    pub min_spacing: f32,
    /// Regions per axis.
    pub grid_regions: u32,
    /// Also exclude the regions adjacent to the previous one.
    pub strict: bool,
    /// Used when no room is known.
    pub fallback_distance: f32,
}

impl PlacementRules {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            hoop_radius: config.hoop_radius,
            safe_radius: config.safe_radius,
            min_spacing: config.min_hoop_spacing,
            grid_regions: config.grid_regions.max(1),
            strict: config.strict_regions,
            fallback_distance: config.hoop_spawn_distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Grid region the point was drawn from (`None` without a room).
    pub region: Option<usize>,
    /// False when the room cannot fit the minimum spacing from the previous spot.
    pub spacing_satisfied: bool,
}

/// The part of the room (shrunk by the hoop radius) that is at least
/// `safe_radius` from the viewer on each horizontal axis, taken on the side
/// with more space. Collapses onto the wall when the room is too small.
pub fn spawn_zone(room: &RoomBoundary, camera: Vec3, rules: &PlacementRules) -> RoomBoundary {
    let inner = room.shrink(rules.hoop_radius);
    let (min_x, max_x) = zone_axis(camera.x, inner.min.x, inner.max.x, rules.safe_radius);
    let (min_z, max_z) = zone_axis(camera.z, inner.min.z, inner.max.z, rules.safe_radius);
    RoomBoundary {
        min: Vec3::new(min_x, inner.min.y, min_z),
        max: Vec3::new(max_x, inner.max.y, max_z),
    }
}

fn zone_axis(camera: f32, lo: f32, hi: f32, safe: f32) -> (f32, f32) {
    let (mut a, mut b) = if camera - lo > hi - camera {
        (lo, camera - safe)
    } else {
        (camera + safe, hi)
    };
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }
    (a.clamp(lo, hi), b.clamp(lo, hi))
}

/// Regions still eligible after excluding `previous` (and, in strict mode,
/// its grid neighbours).
pub fn candidate_regions(previous: Option<usize>, grid: u32, strict: bool) -> Vec<usize> {
    let n = grid.max(1) as usize;
    let Some(prev) = previous else {
        return (0..n * n).collect();
    };
    let (px, pz) = ((prev % n) as isize, (prev / n) as isize);
    (0..n * n)
        .filter(|&i| {
            if i == prev {
                return false;
            }
            if !strict {
                return true;
            }
            let (x, z) = ((i % n) as isize, (i / n) as isize);
            (x - px).abs() > 1 || (z - pz).abs() > 1
        })
        .collect()
}

fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        lo + (hi - lo) * rng.random::<f32>()
    }
}

fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Choose the next hoop position.
///
/// Picks a random grid region of the spawn zone other than the previous one,
/// a random point inside it, then pushes the point away from the previous
/// hoop if it landed too close. `y` is the hoop height in world space.
pub fn find_next_position(
    room: Option<&RoomBoundary>,
    camera: &Pose,
    previous_position: Option<Vec3>,
    previous_region: Option<usize>,
    y: f32,
    rules: &PlacementRules,
    rng: &mut impl Rng,
) -> Placement {
    let Some(room) = room else {
        let mut position = camera.ahead(rules.fallback_distance);
        position.y = y;
        return Placement {
            position,
            region: None,
            spacing_satisfied: true,
        };
    };

    let zone = spawn_zone(room, camera.position, rules);
    let n = rules.grid_regions.max(1) as usize;

    let candidates = candidate_regions(previous_region, rules.grid_regions, rules.strict);
    let region = if candidates.is_empty() {
        previous_region.unwrap_or(0).min(n * n - 1)
    } else {
        candidates[rng.random_range(0..candidates.len())]
    };

    let cell = (zone.max - zone.min) / n as f32;
    let (rx, rz) = ((region % n) as f32, (region / n) as f32);
    let cell_min_x = zone.min.x + rx * cell.x;
    let cell_min_z = zone.min.z + rz * cell.z;
    let x = uniform(rng, cell_min_x, cell_min_x + cell.x);
    let z = uniform(rng, cell_min_z, cell_min_z + cell.z);
    let mut position = zone.clamp_xz(Vec3::new(x, y, z), 0.0);

    let mut spacing_satisfied = true;
    if let Some(prev) = previous_position {
        let prev = Vec3::new(prev.x, y, prev.z);
        if planar(position - prev).length() < rules.min_spacing {
            let (pushed, ok) = push_away(position, prev, &zone, rules.min_spacing);
            log::debug!("Hoop pushed from {:?} to {:?}", position, pushed);
            position = pushed;
            spacing_satisfied = ok;
            if !ok {
                log::warn!(
                    "Room too small to keep {} m between hoop positions (got {:.2} m)",
                    rules.min_spacing,
                    planar(position - prev).length()
                );
            }
        }
    }

    log::debug!("Next hoop position {:?} in region {}", position, region);
    Placement {
        position,
        region: Some(region),
        spacing_satisfied,
    }
}

/// Move `point` to `spacing` from `prev` along their connecting line, then
/// re-clamp into `zone`. If clamping eats the distance, try the opposite
/// direction and finally the zone corner farthest from `prev`.
fn push_away(point: Vec3, prev: Vec3, zone: &RoomBoundary, spacing: f32) -> (Vec3, bool) {
    let dir = planar(point - prev).try_normalize().unwrap_or(Vec2::X);
    let along = |d: Vec2| zone.clamp_xz(prev + Vec3::new(d.x, 0.0, d.y) * spacing, 0.0);

    let corners = [
        Vec3::new(zone.min.x, prev.y, zone.min.z),
        Vec3::new(zone.max.x, prev.y, zone.min.z),
        Vec3::new(zone.min.x, prev.y, zone.max.z),
        Vec3::new(zone.max.x, prev.y, zone.max.z),
    ];
    let farthest = corners
        .into_iter()
        .max_by(|a, b| {
            planar(*a - prev)
                .length()
                .total_cmp(&planar(*b - prev).length())
        })
        .unwrap_or(point);

    let mut best = point;
    let mut best_dist = planar(point - prev).length();
    for candidate in [along(dir), along(-dir), farthest] {
        let d = planar(candidate - prev).length();
        if d >= spacing - SPACING_EPS {
            return (candidate, true);
        }
        if d > best_dist {
            best = candidate;
            best_dist = d;
        }
    }
    (best, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rules() -> PlacementRules {
        PlacementRules::from_config(&GameConfig::default())
    }

    fn big_room() -> RoomBoundary {
        RoomBoundary::new(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 3.0, 10.0))
    }

    #[test]
    fn zone_stays_clear_of_viewer_on_roomier_side() {
        let zone = spawn_zone(&big_room(), Vec3::new(-8.0, 1.6, 2.0), &rules());
        assert!((zone.min.x - (-5.0)).abs() < 1e-5);
        assert!((zone.max.x - 9.72).abs() < 1e-5);
        // More room toward -Z
        assert!((zone.min.z - (-9.72)).abs() < 1e-5);
        assert!((zone.max.z - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn zone_collapses_onto_wall_in_small_room() {
        let room = RoomBoundary::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 3.0, 2.0));
        let zone = spawn_zone(&room, Vec3::ZERO, &rules());
        assert_eq!(zone.min.x, zone.max.x);
        assert!((zone.max.x - 1.72).abs() < 1e-5);
    }

    #[test]
    fn regions_exclude_previous_and_neighbours() {
        assert_eq!(candidate_regions(None, 3, false).len(), 9);
        let loose = candidate_regions(Some(4), 3, false);
        assert_eq!(loose.len(), 8);
        assert!(!loose.contains(&4));
        // Centre cell touches every other cell
        assert!(candidate_regions(Some(4), 3, true).is_empty());
        assert_eq!(candidate_regions(Some(0), 3, true), vec![2, 5, 6, 7, 8]);
        assert!(candidate_regions(Some(0), 1, false).is_empty());
    }

    #[test]
    fn never_reuses_previous_region() {
        let mut rng = Pcg32::seed_from_u64(7);
        let camera = Pose::from_position(Vec3::new(-8.0, 1.6, -8.0));
        let mut region = None;
        for _ in 0..200 {
            let p = find_next_position(Some(&big_room()), &camera, None, region, 1.75, &rules(), &mut rng);
            assert_ne!(p.region, region);
            region = p.region;
        }
    }

    #[test]
    fn positions_stay_inside_room_minus_radius() {
        let rooms = [
            big_room(),
            RoomBoundary::new(Vec3::new(-2.0, 0.0, -3.0), Vec3::new(2.5, 3.0, 1.0)),
            RoomBoundary::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.7, 3.0, 0.7)),
        ];
        let cameras = [Vec3::ZERO, Vec3::new(1.0, 1.6, -1.0), Vec3::new(30.0, 1.6, -30.0)];
        let mut rng = Pcg32::seed_from_u64(42);
        let r = rules();

        for room in &rooms {
            for cam in cameras {
                let camera = Pose::from_position(cam);
                let mut prev = None;
                let mut region = None;
                for _ in 0..100 {
                    let p = find_next_position(Some(room), &camera, prev, region, 1.75, &r, &mut rng);
                    assert!(
                        room.contains_xz(p.position, r.hoop_radius),
                        "{:?} escaped {:?}",
                        p.position,
                        room
                    );
                    assert_eq!(p.position.y, 1.75);
                    prev = Some(p.position);
                    region = p.region;
                }
            }
        }
    }

    #[test]
    fn consecutive_positions_keep_min_spacing_unless_flagged() {
        let mut rng = Pcg32::seed_from_u64(3);
        let r = rules();
        let room = RoomBoundary::new(Vec3::new(-4.0, 0.0, -5.0), Vec3::new(4.0, 3.0, 5.0));
        let cameras = [Vec3::ZERO, Vec3::new(-3.0, 1.6, 4.0), Vec3::new(2.0, 1.6, -1.0)];

        let mut prev = Vec3::new(0.0, 1.75, -2.5);
        let mut region = None;
        for i in 0..300 {
            let camera = Pose::from_position(cameras[i % cameras.len()]);
            let p = find_next_position(Some(&room), &camera, Some(prev), region, 1.75, &r, &mut rng);
            let d = planar(p.position - prev).length();
            if p.spacing_satisfied {
                assert!(d >= r.min_spacing - 1e-3, "iteration {}: spacing {}", i, d);
            }
            prev = p.position;
            region = p.region;
        }
    }

    #[test]
    fn spacing_always_met_when_zone_is_large() {
        let mut rng = Pcg32::seed_from_u64(11);
        let r = rules();
        let camera = Pose::from_position(Vec3::new(-8.0, 1.6, -8.0));
        let mut prev = Vec3::new(0.0, 1.75, 0.0);
        let mut region = None;
        for _ in 0..200 {
            let p = find_next_position(Some(&big_room()), &camera, Some(prev), region, 1.75, &r, &mut rng);
            assert!(p.spacing_satisfied);
            assert!(planar(p.position - prev).length() >= r.min_spacing - 1e-3);
            prev = p.position;
            region = p.region;
        }
    }

    #[test]
    fn tiny_room_flags_impossible_spacing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let room = RoomBoundary::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 3.0, 1.0));
        let camera = Pose::from_position(Vec3::new(0.5, 1.6, 0.5));
        let prev = Vec3::new(0.5, 1.75, 0.5);
        let p = find_next_position(Some(&room), &camera, Some(prev), Some(0), 1.75, &rules(), &mut rng);
        assert!(!p.spacing_satisfied);
        assert!(room.contains_xz(p.position, rules().hoop_radius));
    }

    #[test]
    fn no_room_falls_back_to_front_of_camera() {
        let mut rng = Pcg32::seed_from_u64(0);
        let camera = Pose::from_position(Vec3::new(1.0, 1.6, 1.0));
        let p = find_next_position(None, &camera, None, None, 1.8, &rules(), &mut rng);
        assert!((p.position - Vec3::new(1.0, 1.8, -1.5)).length() < 1e-5);
        assert!(p.region.is_none());
        assert!(p.spacing_satisfied);
    }
}
