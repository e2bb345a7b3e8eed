use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use std::sync::Mutex;

use crate::api::types::ColliderTag;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam ↔ nalgebra
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn na_to_vec3(v: &nalgebra::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn quat_to_na(q: Quat) -> nalgebra::UnitQuaternion<f32> {
    nalgebra::UnitQuaternion::new_normalize(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z))
}

fn na_to_quat(q: &nalgebra::UnitQuaternion<f32>) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

fn pose_to_iso(pos: Vec3, rot: Quat) -> nalgebra::Isometry3<f32> {
    nalgebra::Isometry3::from_parts(
        nalgebra::Translation3::new(pos.x, pos.y, pos.z),
        quat_to_na(rot),
    )
}

fn iso_to_pose(iso: &nalgebra::Isometry3<f32>) -> (Vec3, Quat) {
    let pos = na_to_vec3(&iso.translation.vector);
    (pos, na_to_quat(&iso.rotation))
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
    KinematicPositionBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Y-axis cylinder.
    Cylinder { half_height: f32, radius: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderDesc::Cylinder { half_height, radius } => {
                ColliderBuilder::cylinder(half_height, radius)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body and its primary collider before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub gravity_scale: f32,
    pub ccd: bool,
    pub collider: ColliderDesc,
    /// Primary collider position in the body's local frame.
    pub collider_offset: Vec3,
    pub tag: ColliderTag,
    /// Primary collider is a trigger volume (reports overlaps, no contact response).
    pub sensor: bool,
}

impl BodyDesc {
    fn base(body_type: BodyType, collider: ColliderDesc, gravity_scale: f32) -> Self {
        Self {
            body_type,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            gravity_scale,
            ccd: false,
            collider,
            collider_offset: Vec3::ZERO,
            tag: ColliderTag::Untagged,
            sensor: false,
        }
    }

    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::base(BodyType::Dynamic, collider, 1.0)
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self::base(BodyType::Fixed, collider, 0.0)
    }

    /// Create a position-driven kinematic body. Moved only through
    /// [`PhysicsWorld::set_kinematic_pose`]; pushes dynamic bodies but is never pushed.
    pub fn kinematic(collider: ColliderDesc) -> Self {
        Self::base(BodyType::KinematicPositionBased, collider, 0.0)
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    pub fn with_tag(mut self, tag: ColliderTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_collider_offset(mut self, offset: Vec3) -> Self {
        self.collider_offset = offset;
        self
    }

    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }
}

/// An extra collider attached to an existing body at a local offset.
#[derive(Debug, Clone, Copy)]
pub struct ColliderAttachment {
    pub shape: ColliderDesc,
    pub offset: Vec3,
    pub material: ColliderMaterial,
    pub tag: ColliderTag,
    pub sensor: bool,
}

impl ColliderAttachment {
    pub fn new(shape: ColliderDesc, tag: ColliderTag) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            material: ColliderMaterial::default(),
            tag,
            sensor: false,
        }
    }

    pub fn at(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_material(mut self, material: ColliderMaterial) -> Self {
        self.material = material;
        self
    }
}

/// Handle pair referencing Rapier internals: the body and its primary collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// A collision-state change between two colliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
    pub tag_a: ColliderTag,
    pub tag_b: ColliderTag,
    /// `true` when the overlap just started, `false` when it ended.
    pub started: bool,
}

impl CollisionPair {
    /// Whether this pair is between the two tags, in either order.
    pub fn is_between(&self, a: ColliderTag, b: ColliderTag) -> bool {
        (self.tag_a == a && self.tag_b == b) || (self.tag_a == b && self.tag_b == a)
    }
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut guard = self.collisions.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are unused but the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier3D boilerplate into a single struct.
///
/// The world is stepped with a fixed `dt` only; it never reads a clock, so two
/// worlds fed the same bodies and the same number of steps end up in the same state.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector3<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    /// Resolved events waiting for `drain_collision_events`.
    pending: Vec<CollisionPair>,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector (Y-up).
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: vec3_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            pending: Vec::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body + primary collider and return handles.
    /// The collider's tag is stored in its `user_data` for collision lookups.
    pub fn create_body(&mut self, desc: &BodyDesc, material: ColliderMaterial) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .position(pose_to_iso(desc.position, desc.rotation))
            .linvel(vec3_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .ccd_enabled(desc.ccd)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .position(pose_to_iso(desc.collider_offset, Quat::IDENTITY))
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(desc.sensor)
            .user_data(desc.tag.to_bits())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Attach another collider to an existing body. Returns `None` if the body is gone.
    pub fn attach_collider(
        &mut self,
        body: &PhysicsBody,
        attachment: &ColliderAttachment,
    ) -> Option<ColliderHandle> {
        if !self.bodies.contains(body.body_handle) {
            return None;
        }
        let collider = attachment
            .shape
            .build_collider()
            .position(pose_to_iso(attachment.offset, Quat::IDENTITY))
            .restitution(attachment.material.restitution)
            .friction(attachment.material.friction)
            .density(attachment.material.density)
            .sensor(attachment.sensor)
            .user_data(attachment.tag.to_bits())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        Some(
            self.colliders
                .insert_with_parent(collider, body.body_handle, &mut self.bodies),
        )
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Remove every body and collider. Used on session teardown.
    pub fn clear(&mut self) {
        let handles: Vec<RigidBodyHandle> = self.bodies.iter().map(|(h, _)| h).collect();
        for handle in handles {
            self.bodies.remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        self.pending.clear();
        self.event_collector.drain_collisions();
    }

    /// Advance the simulation by exactly one fixed timestep.
    /// Collision changes are buffered until the next `drain_collision_events`.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Resolve collider handles → tags while the colliders still exist
        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            if let (Some(tag_a), Some(tag_b)) = (self.collider_tag(h1), self.collider_tag(h2)) {
                self.pending.push(CollisionPair {
                    collider_a: h1,
                    collider_b: h2,
                    tag_a,
                    tag_b,
                    started,
                });
            }
        }
    }

    /// Deliver every collision-state change since the last drain, oldest first.
    pub fn drain_collision_events(&mut self, mut handler: impl FnMut(CollisionPair)) {
        for pair in std::mem::take(&mut self.pending) {
            handler(pair);
        }
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec3_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.linvel()))
            .unwrap_or(Vec3::ZERO)
    }

    /// Teleport a body to a new translation, keeping its rotation.
    pub fn set_translation(&mut self, body: &PhysicsBody, pos: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec3_to_na(pos), true);
        }
    }

    /// Set the pose a kinematic body will reach at the end of the next step.
    pub fn set_kinematic_pose(&mut self, body: &PhysicsBody, pos: Vec3, rotation: Quat) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_next_kinematic_position(pose_to_iso(pos, rotation));
        }
    }

    /// Move a body to a pose immediately, without sweeping through the
    /// space in between.
    pub fn teleport(&mut self, body: &PhysicsBody, pos: Vec3, rotation: Quat) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_position(pose_to_iso(pos, rotation), true);
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_pose(&self, body: &PhysicsBody) -> (Vec3, Quat) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| iso_to_pose(rb.position()))
            .unwrap_or((Vec3::ZERO, Quat::IDENTITY))
    }

    /// Whether the body still exists in the simulation.
    pub fn contains(&self, body: &PhysicsBody) -> bool {
        self.bodies.contains(body.body_handle)
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of colliders in the simulation.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Tag of a collider, or `None` if it no longer exists.
    pub fn collider_tag(&self, handle: ColliderHandle) -> Option<ColliderTag> {
        self.colliders
            .get(handle)
            .map(|c| ColliderTag::from_bits(c.user_data))
    }

    /// Whether a collider is a trigger volume.
    pub fn is_sensor(&self, handle: ColliderHandle) -> bool {
        self.colliders.get(handle).is_some_and(|c| c.is_sensor())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
