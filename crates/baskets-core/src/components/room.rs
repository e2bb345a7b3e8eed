use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::api::types::ColliderTag;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial};

/// Half-thickness of the invisible ground slab and room walls.
const SLAB_HALF: f32 = 0.1;
/// Half-height of the invisible room walls.
const WALL_HALF_HEIGHT: f32 = 1.5;

/// Axis-aligned box describing the playable volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBoundary {
    pub min: Vec3,
    pub max: Vec3,
}

impl RoomBoundary {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Grow to also cover `other`.
    pub fn union(&self, other: &RoomBoundary) -> RoomBoundary {
        RoomBoundary {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True once the box has a real floor area (two non-parallel walls seen).
    pub fn has_floor_area(&self) -> bool {
        self.min.x < self.max.x && self.min.z < self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Shrink horizontally by `margin` on every side. An axis too small to
    /// shrink collapses to its midpoint instead of inverting.
    pub fn shrink(&self, margin: f32) -> RoomBoundary {
        let (min_x, max_x) = inset_axis(self.min.x, self.max.x, margin);
        let (min_z, max_z) = inset_axis(self.min.z, self.max.z, margin);
        RoomBoundary {
            min: Vec3::new(min_x, self.min.y, min_z),
            max: Vec3::new(max_x, self.max.y, max_z),
        }
    }

    /// Clamp X/Z into the room shrunk by `margin`; Y passes through.
    pub fn clamp_xz(&self, point: Vec3, margin: f32) -> Vec3 {
        let inner = self.shrink(margin);
        Vec3::new(
            point.x.clamp(inner.min.x, inner.max.x),
            point.y,
            point.z.clamp(inner.min.z, inner.max.z),
        )
    }

    /// Whether X/Z lie inside the room shrunk by `margin` (with float slack).
    pub fn contains_xz(&self, point: Vec3, margin: f32) -> bool {
        const EPS: f32 = 1e-4;
        let inner = self.shrink(margin);
        point.x >= inner.min.x - EPS
            && point.x <= inner.max.x + EPS
            && point.z >= inner.min.z - EPS
            && point.z <= inner.max.z + EPS
    }

    /// Fixed bodies for the floor slab and the four walls around the room.
    /// The slab's top face sits exactly at `floor_offset`.
    pub fn static_bodies(&self, floor_offset: f32) -> Vec<(BodyDesc, ColliderMaterial)> {
        let material = ColliderMaterial {
            restitution: 0.7,
            friction: 0.8,
            density: 1.0,
        };
        let center = self.center();
        let size = self.size();
        let wall_y = floor_offset + WALL_HALF_HEIGHT;

        let ground = BodyDesc::fixed(ColliderDesc::Cuboid {
            half_extents: Vec3::new(size.x * 0.5 + 1.0, SLAB_HALF, size.z * 0.5 + 1.0),
        })
        .with_position(Vec3::new(center.x, floor_offset - SLAB_HALF, center.z))
        .with_tag(ColliderTag::Ground);

        let x_wall = ColliderDesc::Cuboid {
            half_extents: Vec3::new(SLAB_HALF, WALL_HALF_HEIGHT, size.z * 0.5 + SLAB_HALF * 2.0),
        };
        let z_wall = ColliderDesc::Cuboid {
            half_extents: Vec3::new(size.x * 0.5 + SLAB_HALF * 2.0, WALL_HALF_HEIGHT, SLAB_HALF),
        };
        let walls = [
            (x_wall, Vec3::new(self.min.x - SLAB_HALF, wall_y, center.z)),
            (x_wall, Vec3::new(self.max.x + SLAB_HALF, wall_y, center.z)),
            (z_wall, Vec3::new(center.x, wall_y, self.min.z - SLAB_HALF)),
            (z_wall, Vec3::new(center.x, wall_y, self.max.z + SLAB_HALF)),
        ];

        let mut bodies = vec![(ground, material)];
        bodies.extend(walls.into_iter().map(|(shape, pos)| {
            (
                BodyDesc::fixed(shape).with_position(pos).with_tag(ColliderTag::Wall),
                material,
            )
        }));
        bodies
    }
}

fn inset_axis(min: f32, max: f32, margin: f32) -> (f32, f32) {
    let (lo, hi) = (min + margin, max - margin);
    if lo <= hi {
        (lo, hi)
    } else {
        let mid = (min + max) * 0.5;
        (mid, mid)
    }
}

/// What a surface report changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoomSignal {
    FloorConfigured { floor_offset: f32 },
    BoundaryUpdated,
    /// The boundary gained floor area for the first time.
    BoundaryReady,
    /// Floor and walls are both known; the boundary is now frozen.
    SetupComplete,
}

/// Accumulates detected floor/wall surfaces into a room boundary.
#[derive(Debug, Clone, Default)]
pub struct RoomSetup {
    floor_offset: f32,
    floor_configured: bool,
    boundary: Option<RoomBoundary>,
    boundary_ready: bool,
    complete: bool,
}

impl RoomSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one detected surface (its semantic label and world AABB).
    /// Unknown labels are ignored. Once setup is complete the room is frozen.
    pub fn handle_surface(&mut self, label: &str, min: Vec3, max: Vec3) -> Vec<RoomSignal> {
        let mut signals = Vec::new();
        if self.complete {
            log::debug!("room frozen, ignoring surface '{}'", label);
            return signals;
        }

        match label.to_ascii_lowercase().as_str() {
            "floor" if !self.floor_configured => {
                self.floor_offset = min.y.min(max.y);
                self.floor_configured = true;
                log::info!("Floor configured at: {}", self.floor_offset);
                signals.push(RoomSignal::FloorConfigured {
                    floor_offset: self.floor_offset,
                });
            }
            "wall" => {
                let wall = RoomBoundary::new(min, max);
                let merged = match self.boundary {
                    Some(existing) => existing.union(&wall),
                    None => wall,
                };
                self.boundary = Some(merged);
                log::debug!("Updated room boundary: {:?}", merged);
                signals.push(RoomSignal::BoundaryUpdated);
                if !self.boundary_ready && merged.has_floor_area() {
                    self.boundary_ready = true;
                    signals.push(RoomSignal::BoundaryReady);
                }
            }
            _ => {}
        }

        if self.floor_configured && self.boundary_ready {
            self.complete = true;
            log::info!("Room setup complete: {:?}", self.boundary);
            signals.push(RoomSignal::SetupComplete);
        }
        signals
    }

    pub fn floor_offset(&self) -> f32 {
        self.floor_offset
    }

    pub fn is_floor_configured(&self) -> bool {
        self.floor_configured
    }

    /// The boundary, once it has floor area.
    pub fn boundary(&self) -> Option<RoomBoundary> {
        self.boundary.filter(|_| self.boundary_ready)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomBoundary {
        RoomBoundary::new(Vec3::new(-3.0, 0.0, -4.0), Vec3::new(3.0, 2.5, 4.0))
    }

    #[test]
    fn clamp_respects_margin() {
        let r = room();
        let p = r.clamp_xz(Vec3::new(10.0, 1.0, -10.0), 0.28);
        assert!((p.x - 2.72).abs() < 1e-5);
        assert!((p.z + 3.72).abs() < 1e-5);
        assert_eq!(p.y, 1.0);
        assert!(r.contains_xz(p, 0.28));
        assert!(!r.contains_xz(Vec3::new(2.9, 0.0, 0.0), 0.28));
    }

    #[test]
    fn inset_collapses_instead_of_inverting() {
        let narrow = RoomBoundary::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.4, 2.0, 5.0));
        let inner = narrow.shrink(0.3);
        assert_eq!(inner.min.x, inner.max.x);
        assert!((inner.min.x - 0.2).abs() < 1e-6);
        assert!(inner.min.z < inner.max.z);
    }

    #[test]
    fn union_grows_box() {
        let a = RoomBoundary::new(Vec3::new(-3.0, 0.0, -4.0), Vec3::new(-3.0, 2.5, 4.0));
        let b = RoomBoundary::new(Vec3::new(-3.0, 0.0, 4.0), Vec3::new(3.0, 2.5, 4.0));
        assert!(!a.has_floor_area());
        let u = a.union(&b);
        assert!(u.has_floor_area());
        assert_eq!(u.min, Vec3::new(-3.0, 0.0, -4.0));
        assert_eq!(u.max, Vec3::new(3.0, 2.5, 4.0));
    }

    #[test]
    fn static_bodies_are_ground_plus_four_walls() {
        let bodies = room().static_bodies(0.05);
        assert_eq!(bodies.len(), 5);
        assert_eq!(bodies[0].0.tag, ColliderTag::Ground);
        assert!((bodies[0].0.position.y - (0.05 - SLAB_HALF)).abs() < 1e-6);
        assert!(bodies[1..].iter().all(|(d, _)| d.tag == ColliderTag::Wall));
    }

    #[test]
    fn setup_completes_after_floor_and_two_walls() {
        let mut setup = RoomSetup::new();

        let s = setup.handle_surface("Floor", Vec3::new(-3.0, 0.02, -4.0), Vec3::new(3.0, 0.02, 4.0));
        assert_eq!(s, vec![RoomSignal::FloorConfigured { floor_offset: 0.02 }]);

        // One wall is a plane: no floor area yet
        let s = setup.handle_surface("wall", Vec3::new(-3.0, 0.0, -4.0), Vec3::new(-3.0, 2.5, 4.0));
        assert_eq!(s, vec![RoomSignal::BoundaryUpdated]);
        assert!(setup.boundary().is_none());

        let s = setup.handle_surface("WALL", Vec3::new(-3.0, 0.0, 4.0), Vec3::new(3.0, 2.5, 4.0));
        assert_eq!(
            s,
            vec![
                RoomSignal::BoundaryUpdated,
                RoomSignal::BoundaryReady,
                RoomSignal::SetupComplete
            ]
        );
        assert!(setup.is_complete());

        // Frozen afterwards
        let before = setup.boundary();
        let s = setup.handle_surface("wall", Vec3::new(10.0, 0.0, 10.0), Vec3::new(12.0, 2.5, 12.0));
        assert!(s.is_empty());
        assert_eq!(setup.boundary(), before);
    }

    #[test]
    fn unknown_labels_and_second_floor_ignored() {
        let mut setup = RoomSetup::new();
        assert!(setup.handle_surface("table", Vec3::ZERO, Vec3::ONE).is_empty());
        setup.handle_surface("floor", Vec3::new(0.0, -0.1, 0.0), Vec3::new(1.0, -0.1, 1.0));
        assert!(setup.handle_surface("floor", Vec3::new(0.0, 0.5, 0.0), Vec3::ONE).is_empty());
        assert!((setup.floor_offset() + 0.1).abs() < 1e-6);
    }
}
