use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::api::config::GameConfig;
use crate::api::error::SimError;
use crate::api::types::{
    ColliderTag, ControllerId, EntityKind, GameEvent, GameOverReason, PowerUpKind,
};
use crate::assets::manifest::ModelManifest;
use crate::assets::registry::{VisualRegistry, VisualSource};
use crate::components::ball::BallState;
use crate::components::hoop::{HoopMotion, HoopState};
use crate::components::pose::Pose;
use crate::components::room::{RoomBoundary, RoomSetup, RoomSignal};
use crate::core::events::{EventBus, Subscriber, SubscriberId};
use crate::core::physics::{CollisionPair, PhysicsBody, PhysicsWorld};
use crate::core::time::FixedTimestep;
use crate::core::timers::TimerQueue;
use crate::input::controller::ControllerTracker;
use crate::input::queue::{InputEvent, InputQueue};
use crate::systems::ball;
use crate::systems::clock::{GameClock, ShotClock};
use crate::systems::hoop;
use crate::systems::interaction::GrabOutcome;
use crate::systems::level::GameState;
use crate::systems::placement::{self, PlacementRules};
use crate::systems::powerup::PowerUps;
use crate::systems::schedule::Scheduled;
use crate::systems::scoreboard::place_scoreboard;
use crate::systems::sensor::{BasketSensor, SensorVerdict};

/// Numbers the scoreboard and HUD display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub level: u32,
    pub shot_clock: u32,
    pub game_clock: u32,
    pub missed_shots: u32,
    pub game_started: bool,
    pub game_over: bool,
    /// The last hoop move could not keep the minimum spacing from the
    /// previous position.
    pub hoop_spacing_relaxed: bool,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub ball: Option<Pose>,
    pub ball_held: bool,
    pub ball_visual: VisualSource,
    pub hoop: Option<Pose>,
    pub hoop_visual: VisualSource,
    pub scoreboard: Option<Pose>,
    pub hud: Hud,
}

/// One AR play session: owns the physics world and all gameplay state and
/// runs the per-frame pipeline.
///
/// Per `tick`:
/// 1. apply poses, surfaces and asset loads from the input queue
/// 2. update controller velocities, then grab/release and other actions
/// 3. place ball and hoop once room, camera and visuals are ready
/// 4. fixed physics steps, each followed by a collision drain
/// 5. timers and clocks
/// 6. dispatch the frame's events to subscribers
/// 7. hoop oscillation, ball sync and scoreboard placement
pub struct Session {
    config: GameConfig,
    world: PhysicsWorld,
    timestep: FixedTimestep,
    input: InputQueue,
    bus: EventBus,
    timers: TimerQueue<Scheduled>,
    controllers: ControllerTracker,
    camera: Option<Pose>,
    room: RoomSetup,
    /// Ground slab and walls.
    arena: Vec<PhysicsBody>,
    visuals: VisualRegistry,
    ball: BallState,
    hoop: HoopState,
    sensor: BasketSensor,
    state: GameState,
    shot_clock: ShotClock,
    game_clock: GameClock,
    power_ups: PowerUps,
    scoreboard: Option<Pose>,
    rng: Pcg32,
    /// Seconds of simulated physics time.
    sim_time: f64,
    ball_pending: bool,
    hoop_pending: bool,
    hoop_spacing_relaxed: bool,
    clocks_started: bool,
    collisions: Vec<CollisionPair>,
    ended: bool,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self::with_manifest(config, &ModelManifest::default())
    }

    /// Entities with a model in `manifest` are only placed once their
    /// `AssetLoaded` input arrives.
    pub fn with_manifest(config: GameConfig, manifest: &ModelManifest) -> Self {
        let mut world = PhysicsWorld::new(config.gravity);
        world.set_dt(config.fixed_dt);
        let timestep =
            FixedTimestep::new(config.fixed_dt).with_max_steps(config.max_steps_per_frame);
        let motion = HoopMotion::new(config.movement_amplitude, config.movement_frequency);

        log::info!("Session created (seed {})", config.seed);
        Self {
            world,
            timestep,
            input: InputQueue::new(),
            bus: EventBus::new(),
            timers: TimerQueue::new(),
            controllers: ControllerTracker::new(),
            camera: None,
            room: RoomSetup::new(),
            arena: Vec::new(),
            visuals: VisualRegistry::from_manifest(manifest),
            ball: BallState::new(config.ball_radius),
            hoop: HoopState::new(config.hoop_radius, config.hoop_height, motion),
            sensor: BasketSensor::new(config.sensor_cooldown),
            state: GameState::new(&config),
            shot_clock: ShotClock::new(config.shot_clock_initial),
            game_clock: GameClock::new(),
            power_ups: PowerUps::new(),
            scoreboard: None,
            rng: Pcg32::seed_from_u64(config.seed),
            sim_time: 0.0,
            ball_pending: false,
            hoop_pending: false,
            hoop_spacing_relaxed: false,
            clocks_started: false,
            collisions: Vec::with_capacity(16),
            ended: false,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn room(&self) -> Option<RoomBoundary> {
        self.room.boundary()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn push_input(&mut self, event: InputEvent) {
        if self.ended {
            return;
        }
        self.input.push(event);
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) -> SubscriberId {
        self.bus.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Events dispatched during the last `tick`.
    pub fn frame_events(&self) -> &[GameEvent] {
        self.bus.frame_events()
    }

    /// Advance the session by one rendered frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.ended {
            return;
        }
        let dt = dt.max(0.0);
        self.bus.begin_frame();

        let mut actions = Vec::new();
        for event in self.input.drain() {
            match event {
                InputEvent::CameraPose { position, rotation } => {
                    self.camera = Some(Pose::new(position, rotation));
                }
                InputEvent::ControllerConnected { id, handedness } => {
                    self.controllers.connect(id, handedness);
                }
                InputEvent::ControllerPose {
                    id,
                    position,
                    rotation,
                } => self.controllers.set_pose(id, position, rotation),
                InputEvent::SurfaceAdded { label, min, max } => self.on_surface(&label, min, max),
                InputEvent::AssetLoaded { asset, ok } => {
                    if self.visuals.resolve(asset, ok) {
                        log::debug!("{} visual resolved (ok = {})", asset.name(), ok);
                    }
                }
                other => actions.push(other),
            }
        }

        self.controllers.update(dt);
        if let Some(holder) = self.ball.possession.holder() {
            if let Some(pose) = self.controllers.pose(holder) {
                ball::follow_controller(&mut self.ball, &pose, self.controllers.handedness(holder));
            }
        }

        for action in actions {
            self.handle_action(action);
            if self.ended {
                return;
            }
        }

        self.try_spawn();

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.world.step();
            self.sim_time += self.timestep.dt() as f64;

            let collisions = &mut self.collisions;
            collisions.clear();
            self.world.drain_collision_events(|pair| collisions.push(pair));
            let pairs = std::mem::take(&mut self.collisions);
            for pair in &pairs {
                self.on_collision(pair);
            }
            self.collisions = pairs;
        }

        let mut hoop_landed = false;
        for action in self.timers.advance(dt) {
            hoop_landed |= matches!(action, Scheduled::MoveHoop { .. });
            self.run_scheduled(action);
        }
        self.advance_clocks(dt);

        self.bus.dispatch();

        let room = self.room.boundary();
        let floor = self.room.floor_offset();
        // The hoop rests where HoopMoved reported it for the frame it lands.
        if !hoop_landed {
            hoop::update_oscillation(
                &mut self.world,
                &mut self.hoop,
                self.state.level,
                self.sim_time as f32,
                room.as_ref(),
                floor,
                &self.config,
            );
        }
        ball::update_physics_visual_sync(&mut self.world, &mut self.ball, room.as_ref());
        self.scoreboard = match (room, self.camera) {
            (Some(room), Some(camera)) => Some(place_scoreboard(&room, camera.position)),
            _ => None,
        };
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            ball: self.ball.present.then_some(self.ball.pose),
            ball_held: self.ball.is_held(),
            ball_visual: self.visuals.get(EntityKind::Ball).clone(),
            hoop: self.hoop.is_placed().then_some(self.hoop.pose),
            hoop_visual: self.visuals.get(EntityKind::Hoop).clone(),
            scoreboard: self.scoreboard,
            hud: Hud {
                score: self.state.score,
                level: self.state.level,
                shot_clock: self.shot_clock.remaining(),
                game_clock: self.game_clock.elapsed(),
                missed_shots: self.state.missed_shots,
                game_started: self.state.game_started,
                game_over: self.state.game_over,
                hoop_spacing_relaxed: self.hoop_spacing_relaxed,
            },
        }
    }

    /// Tear everything down: bodies, timers and listeners. Further ticks
    /// and inputs are ignored.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.world.clear();
        self.arena.clear();
        self.ball.body = None;
        self.ball.present = false;
        self.hoop.body = None;
        self.timers.clear();
        self.timestep.reset();
        self.shot_clock.stop();
        self.game_clock.stop();
        self.bus.discard_pending();
        self.bus.unsubscribe_all();
        self.input.clear();
        self.controllers.clear();
        self.ended = true;
        log::info!("Session ended");
    }

    // -- input ------------------------------------------------------------

    fn on_surface(&mut self, label: &str, min: Vec3, max: Vec3) {
        for signal in self.room.handle_surface(label, min, max) {
            match signal {
                RoomSignal::BoundaryReady => self.bus.publish(GameEvent::RoomBoundaryReady),
                RoomSignal::SetupComplete => {
                    self.build_arena();
                    self.bus.publish(GameEvent::RoomSetupComplete);
                }
                RoomSignal::FloorConfigured { .. } | RoomSignal::BoundaryUpdated => {}
            }
        }
    }

    fn build_arena(&mut self) {
        let Some(room) = self.room.boundary() else {
            return;
        };
        for (desc, material) in room.static_bodies(self.room.floor_offset()) {
            self.arena.push(self.world.create_body(&desc, material));
        }
        log::debug!("Created {} static room bodies", self.arena.len());
    }

    fn handle_action(&mut self, action: InputEvent) {
        match action {
            InputEvent::GrabStart { id } => self.on_grab(id),
            InputEvent::GrabEnd { id } => self.on_release(id),
            InputEvent::ControllerDisconnected { id } => {
                if self.ball.possession.holder() == Some(id) {
                    self.on_release(id);
                }
                self.controllers.disconnect(id);
            }
            InputEvent::StartGame => self.start_game(),
            InputEvent::ResetGame => self.reset_game(),
            InputEvent::PowerUp { kind } => self.activate_power_up(kind),
            InputEvent::EndSession => self.end(),
            InputEvent::CameraPose { .. }
            | InputEvent::ControllerConnected { .. }
            | InputEvent::ControllerPose { .. }
            | InputEvent::SurfaceAdded { .. }
            | InputEvent::AssetLoaded { .. } => {}
        }
    }

    fn on_grab(&mut self, id: ControllerId) {
        if !self.controllers.contains(id) {
            log::warn!("Ignoring grab: {}", SimError::UnknownController(id));
            return;
        }
        let pose = self.controllers.pose(id);
        let handedness = self.controllers.handedness(id);
        match ball::grab(&mut self.world, &mut self.ball, id, pose, handedness) {
            Ok(GrabOutcome::AlreadyHeld) => {}
            Ok(_) => self.bus.publish(GameEvent::BallGrabbed { controller: id }),
            Err(e) => log::warn!("Ignoring grab: {}", e),
        }
    }

    fn on_release(&mut self, id: ControllerId) {
        let velocity = self.controllers.velocity(id);
        match ball::release(&mut self.world, &mut self.ball, id, velocity, &self.config) {
            Ok(release) => {
                if !self.state.game_over {
                    self.state.shot_attempted = release.shot;
                }
                self.bus.publish(GameEvent::BallReleased {
                    controller: id,
                    velocity: release.velocity,
                    shot: release.shot,
                });
            }
            Err(e) => log::warn!("Ignoring release: {}", e),
        }
    }

    fn start_game(&mut self) {
        if self.state.game_over {
            log::warn!("Game is over; reset before starting again");
            return;
        }
        if self.state.game_started {
            return;
        }
        self.state.game_started = true;
        self.ball_pending = true;
        self.hoop_pending = true;
        if !self.room.is_complete() {
            log::info!("Game started, placement deferred: {}", SimError::RoomNotReady);
        }
        self.bus.publish(GameEvent::GameStarted);
    }

    fn reset_game(&mut self) {
        if !self.state.game_over {
            log::warn!("Reset ignored: game is not over");
            return;
        }
        self.power_ups.clear(&mut self.state, &mut self.timers);
        self.timers.clear();
        self.state.reset(&mut self.hoop.motion, &self.config);
        self.sensor.reset();
        self.shot_clock.stop();
        self.game_clock.reset();
        self.clocks_started = false;
        self.timestep.reset();
        ball::remove(&mut self.world, &mut self.ball);
        hoop::remove(&mut self.world, &mut self.hoop);
        self.hoop.previous_region = None;
        self.hoop_spacing_relaxed = false;
        log::info!("Game reset");
        self.bus.publish(GameEvent::GameReset);
        self.start_game();
    }

    fn activate_power_up(&mut self, kind: PowerUpKind) {
        if !self.state.game_started {
            log::debug!("Ignoring {:?} power-up before the game starts", kind);
            return;
        }
        let events = self.power_ups.activate(
            kind,
            &mut self.state,
            &mut self.shot_clock,
            &mut self.timers,
            &self.config,
        );
        for event in events {
            self.bus.publish(event);
        }
    }

    /// Place whatever is still waiting once the room, camera and visuals allow it.
    fn try_spawn(&mut self) {
        if !self.state.game_started || self.state.game_over {
            return;
        }
        if !(self.ball_pending || self.hoop_pending) || !self.room.is_complete() {
            return;
        }
        let Some(camera) = self.camera else {
            log::debug!("Placement deferred: {}", SimError::NoCamera);
            return;
        };
        let room = self.room.boundary();
        let floor = self.room.floor_offset();

        if self.hoop_pending && self.visuals.is_ready(EntityKind::Hoop) {
            let position = hoop::place_initial_hoop(
                &mut self.world,
                &mut self.hoop,
                &camera,
                room.as_ref(),
                floor,
                &self.config,
            );
            self.hoop_pending = false;
            self.bus.publish(GameEvent::HoopSpawned { position });
        }
        if self.ball_pending && self.visuals.is_ready(EntityKind::Ball) {
            let position = ball::spawn_position(&camera, room.as_ref(), floor, &self.config);
            ball::spawn(&mut self.world, &mut self.ball, position, &self.config);
            self.ball_pending = false;
            self.bus.publish(GameEvent::BallSpawned { position });
        }

        if !self.ball_pending && !self.hoop_pending && !self.clocks_started {
            self.shot_clock.start(self.state.shot_clock_initial);
            self.game_clock.start();
            self.clocks_started = true;
        }
    }

    // -- physics reactions --------------------------------------------------

    fn on_collision(&mut self, pair: &CollisionPair) {
        if !pair.started || self.state.game_over {
            return;
        }
        if pair.is_between(ColliderTag::Sensor, ColliderTag::Ball) {
            let vy = self
                .ball
                .body
                .map(|body| self.world.velocity(&body).y)
                .unwrap_or(0.0);
            match self.sensor.on_ball_entered(self.sim_time, vy) {
                SensorVerdict::Scored => self.on_basket(),
                verdict => log::debug!("Sensor ignored ball: {:?}", verdict),
            }
        } else if pair.is_between(ColliderTag::Ground, ColliderTag::Ball) {
            self.on_ground_touch();
        }
    }

    fn on_basket(&mut self) {
        let outcome = self
            .state
            .on_basket(&mut self.hoop.motion, &self.config, &mut self.rng);
        log::info!("Basket! score {} (+{})", outcome.score, outcome.points);
        self.bus.publish(GameEvent::BasketScored {
            score: outcome.score,
        });
        if let Some(level) = outcome.new_level {
            self.bus.publish(GameEvent::NewLevel { level });
        }
        self.shot_clock.reset_to(self.state.shot_clock_initial);
        self.reposition_hoop();
    }

    fn on_ground_touch(&mut self) {
        let Some(miss) = self.state.on_ground_touch(self.config.max_missed_shots) else {
            return;
        };
        log::info!("Missed shot {}/{}", miss.missed, self.config.max_missed_shots);
        self.bus.publish(GameEvent::MissedShot {
            missed: miss.missed,
        });
        if miss.game_over {
            self.game_over(GameOverReason::Misses);
        }
    }

    fn reposition_hoop(&mut self) {
        if !self.hoop.is_placed() {
            return;
        }
        let Some(camera) = self.camera else {
            log::warn!("Hoop not moved: {}", SimError::NoCamera);
            return;
        };
        let room = self.room.boundary();
        let floor = self.room.floor_offset();
        let placement = placement::find_next_position(
            room.as_ref(),
            &camera,
            Some(self.hoop.motion.base),
            self.hoop.previous_region,
            self.config.hoop_height + floor,
            &PlacementRules::from_config(&self.config),
            &mut self.rng,
        );
        self.hoop.previous_region = placement.region;
        self.hoop_spacing_relaxed = !placement.spacing_satisfied;
        hoop::reposition_after_delay(
            &mut self.hoop,
            &mut self.timers,
            placement.position,
            room.as_ref(),
            floor,
            self.config.reposition_delay,
        );
    }

    fn game_over(&mut self, reason: GameOverReason) {
        self.state.game_over = true;
        self.shot_clock.stop();
        self.game_clock.stop();
        self.power_ups.clear(&mut self.state, &mut self.timers);
        self.timers.clear();
        ball::remove(&mut self.world, &mut self.ball);
        hoop::remove(&mut self.world, &mut self.hoop);
        self.ball_pending = false;
        self.hoop_pending = false;
        log::info!("Game over ({:?}), final score {}", reason, self.state.score);
        self.bus.publish(GameEvent::GameOver { reason });
    }

    // -- time ---------------------------------------------------------------

    fn run_scheduled(&mut self, action: Scheduled) {
        if self.state.game_over {
            return;
        }
        match action {
            Scheduled::MoveHoop { position } => {
                let camera = self.camera.map_or(position, |c| c.position);
                hoop::apply_move(&mut self.world, &mut self.hoop, position, camera);
                self.bus.publish(GameEvent::HoopMoved { position });
            }
            Scheduled::PowerUpExpired { kind } => {
                for event in self
                    .power_ups
                    .expire(kind, &mut self.state, &mut self.shot_clock)
                {
                    self.bus.publish(event);
                }
            }
        }
    }

    fn advance_clocks(&mut self, dt: f32) {
        let update = self.shot_clock.advance(dt);
        for remaining in update.ticks {
            self.bus.publish(GameEvent::ShotClockTick { remaining });
        }
        if update.expired && !self.state.game_over {
            self.game_over(GameOverReason::ShotClock);
        }
        self.game_clock.advance(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Handedness;
    use crate::components::hoop::MotionAxes;
    use crate::systems::interaction;
    use glam::Quat;
    use std::cell::RefCell;
    use std::f32::consts::PI;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;
    const HAND: ControllerId = ControllerId(0);

    fn record(session: &mut Session) -> Rc<RefCell<Vec<GameEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        session.subscribe(Box::new(move |e: &GameEvent| sink.borrow_mut().push(*e)));
        log
    }

    fn count(log: &Rc<RefCell<Vec<GameEvent>>>, pred: impl Fn(&GameEvent) -> bool) -> usize {
        log.borrow().iter().filter(|&e| pred(e)).count()
    }

    /// Room 6 x 8 m, viewer at the origin looking down +Z.
    fn push_room_and_viewer(s: &mut Session) {
        s.push_input(InputEvent::SurfaceAdded {
            label: "floor".into(),
            min: Vec3::new(-3.0, 0.0, -4.0),
            max: Vec3::new(3.0, 0.0, 4.0),
        });
        s.push_input(InputEvent::SurfaceAdded {
            label: "wall".into(),
            min: Vec3::new(-3.0, 0.0, -4.0),
            max: Vec3::new(-3.0, 2.5, 4.0),
        });
        s.push_input(InputEvent::SurfaceAdded {
            label: "wall".into(),
            min: Vec3::new(-3.0, 0.0, 4.0),
            max: Vec3::new(3.0, 2.5, 4.0),
        });
        s.push_input(InputEvent::CameraPose {
            position: Vec3::new(0.0, 1.6, 0.0),
            rotation: Quat::from_rotation_y(PI),
        });
        s.push_input(InputEvent::ControllerConnected {
            id: HAND,
            handedness: Handedness::Right,
        });
        s.push_input(InputEvent::ControllerPose {
            id: HAND,
            position: Vec3::new(0.2, 1.2, 0.3),
            rotation: Quat::IDENTITY,
        });
    }

    fn started(config: GameConfig) -> (Session, Rc<RefCell<Vec<GameEvent>>>) {
        let mut s = Session::new(config);
        let log = record(&mut s);
        push_room_and_viewer(&mut s);
        s.push_input(InputEvent::StartGame);
        s.tick(DT);
        (s, log)
    }

    #[test]
    fn start_places_ball_and_hoop_in_front_of_viewer() {
        let (s, log) = started(GameConfig::default());
        let events = log.borrow().clone();
        assert_eq!(events[0], GameEvent::RoomBoundaryReady);
        assert_eq!(events[1], GameEvent::RoomSetupComplete);
        assert_eq!(events[2], GameEvent::GameStarted);
        assert!(matches!(events[3], GameEvent::HoopSpawned { .. }));
        assert!(matches!(events[4], GameEvent::BallSpawned { .. }));

        let snap = s.snapshot();
        let hoop = snap.hoop.expect("hoop placed");
        assert!((hoop.position - Vec3::new(0.0, 1.75, 2.5)).length() < 1e-4, "{:?}", hoop.position);
        let ball = snap.ball.expect("ball placed");
        assert!((ball.position.z - 1.0).abs() < 0.05);
        assert!(snap.scoreboard.is_some());
        assert!(snap.hud.game_started);
        assert_eq!(snap.hud.shot_clock, 24);
        // Ground + 4 walls + ball + rim + sensor
        assert_eq!(s.world.body_count(), 8);
    }

    #[test]
    fn nothing_spawns_until_room_is_ready() {
        let mut s = Session::new(GameConfig::default());
        s.push_input(InputEvent::StartGame);
        s.push_input(InputEvent::CameraPose {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        });
        s.tick(DT);
        assert!(s.snapshot().ball.is_none());
        assert!(s.snapshot().hoop.is_none());

        push_room_and_viewer(&mut s);
        s.tick(DT);
        assert!(s.snapshot().ball.is_some());
        assert!(s.snapshot().hoop.is_some());
    }

    #[test]
    fn ball_waits_for_its_model_and_falls_back_on_failure() {
        let manifest = ModelManifest {
            ball: Some("ball.glb".into()),
            ..Default::default()
        };
        let mut s = Session::with_manifest(GameConfig::default(), &manifest);
        push_room_and_viewer(&mut s);
        s.push_input(InputEvent::StartGame);
        s.tick(DT);
        assert!(s.snapshot().hoop.is_some());
        assert!(s.snapshot().ball.is_none());
        assert_eq!(s.snapshot().hud.shot_clock, 24, "clocks wait for both entities");

        s.push_input(InputEvent::AssetLoaded {
            asset: EntityKind::Ball,
            ok: false,
        });
        s.tick(DT);
        let snap = s.snapshot();
        assert!(snap.ball.is_some());
        assert_eq!(snap.ball_visual, VisualSource::Placeholder);
    }

    #[test]
    fn thrown_ball_hitting_ground_is_one_miss() {
        let (mut s, log) = started(GameConfig::default());

        s.push_input(InputEvent::GrabStart { id: HAND });
        s.tick(DT);
        assert!(s.snapshot().ball_held);

        // Move the hand at (0, 3, -5) m/s for one frame, then let go
        let start = Vec3::new(0.2, 1.2, 0.3);
        s.push_input(InputEvent::ControllerPose {
            id: HAND,
            position: start + Vec3::new(0.0, 3.0, -5.0) * DT,
            rotation: Quat::IDENTITY,
        });
        s.push_input(InputEvent::GrabEnd { id: HAND });
        s.tick(DT);
        assert!(s.state().shot_attempted, "fast release is a shot");
        let released = log
            .borrow()
            .iter()
            .find_map(|e| match e {
                GameEvent::BallReleased { velocity, shot, .. } => Some((*velocity, *shot)),
                _ => None,
            })
            .expect("release event");
        assert!(released.1);
        assert!((released.0 - Vec3::new(0.0, 3.0, -5.0)).length() < 0.05);

        for _ in 0..300 {
            s.tick(DT);
        }
        assert_eq!(count(&log, |e| matches!(e, GameEvent::MissedShot { .. })), 1);
        assert_eq!(s.state().missed_shots, 1);
        assert!(!s.state().shot_attempted);
        assert!(!s.state().game_over);
        assert!(s.snapshot().ball.is_some());
    }

    #[test]
    fn ball_dropped_through_hoop_scores_once_and_hoop_moves() {
        let (mut s, log) = started(GameConfig::default());
        let hoop_pos = s.snapshot().hoop.unwrap().position;
        let body = s.ball.body.unwrap();
        s.world.set_translation(&body, hoop_pos + Vec3::new(0.0, 0.35, 0.0));
        s.world.set_velocity(&body, Vec3::new(0.0, -2.0, 0.0));

        for _ in 0..60 {
            s.tick(DT);
        }
        assert_eq!(count(&log, |e| matches!(e, GameEvent::BasketScored { .. })), 1);
        assert_eq!(s.state().score, 1);
        assert_eq!(s.state().level, 2);
        assert_eq!(count(&log, |e| *e == GameEvent::NewLevel { level: 2 }), 1);
        assert_eq!(count(&log, |e| matches!(e, GameEvent::HoopMoved { .. })), 1);

        let moved_to = s.snapshot().hoop.unwrap().position;
        let room = s.room().unwrap();
        assert!(room.contains_xz(moved_to, s.config().hoop_radius));
        assert!(!s.hoop.is_moving);
    }

    #[test]
    fn upward_pass_through_hoop_does_not_score() {
        let (mut s, log) = started(GameConfig::default());
        let hoop_pos = s.snapshot().hoop.unwrap().position;
        let body = s.ball.body.unwrap();
        s.world.set_translation(&body, hoop_pos - Vec3::new(0.0, 0.4, 0.0));
        s.world.set_velocity(&body, Vec3::new(0.0, 4.0, 0.0));

        for _ in 0..10 {
            s.tick(DT);
        }
        assert_eq!(count(&log, |e| matches!(e, GameEvent::BasketScored { .. })), 0);
    }

    #[test]
    fn shot_clock_ends_game_exactly_once_on_24th_second() {
        let (mut s, log) = started(GameConfig::default());
        let mut over_at = Vec::new();
        for second in 1..=30 {
            s.tick(1.0);
            if s.frame_events().iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
                over_at.push(second);
            }
        }
        assert_eq!(over_at, vec![24]);
        assert_eq!(
            count(&log, |e| *e == GameEvent::GameOver { reason: GameOverReason::ShotClock }),
            1
        );
        let snap = s.snapshot();
        assert!(snap.hud.game_over);
        assert!(snap.ball.is_none() && snap.hoop.is_none());
        // Only the room remains
        assert_eq!(s.world.body_count(), 5);
    }

    #[test]
    fn third_miss_ends_game_and_reset_starts_over() {
        let (mut s, log) = started(GameConfig::default());
        for _ in 0..3 {
            s.state.shot_attempted = true;
            s.on_ground_touch();
        }
        s.tick(DT);
        assert_eq!(count(&log, |e| matches!(e, GameEvent::MissedShot { .. })), 3);
        assert_eq!(
            count(&log, |e| *e == GameEvent::GameOver { reason: GameOverReason::Misses }),
            1
        );
        assert!(s.snapshot().ball.is_none());

        // Start is refused while over; reset is what brings the game back
        s.push_input(InputEvent::StartGame);
        s.tick(DT);
        assert!(s.snapshot().ball.is_none());

        s.push_input(InputEvent::ResetGame);
        s.tick(DT);
        let snap = s.snapshot();
        assert!(!snap.hud.game_over);
        assert_eq!(snap.hud.missed_shots, 0);
        assert_eq!(snap.hud.score, 0);
        assert_eq!(snap.hud.level, 1);
        assert!(snap.ball.is_some() && snap.hoop.is_some());
        assert_eq!(count(&log, |e| *e == GameEvent::GameReset), 1);
    }

    #[test]
    fn reset_is_ignored_while_playing() {
        let (mut s, log) = started(GameConfig::default());
        s.state.score = 4;
        s.push_input(InputEvent::ResetGame);
        s.tick(DT);
        assert_eq!(s.state().score, 4);
        assert_eq!(count(&log, |e| *e == GameEvent::GameReset), 0);
    }

    #[test]
    fn release_without_holding_is_ignored() {
        let (mut s, log) = started(GameConfig::default());
        s.push_input(InputEvent::GrabEnd { id: HAND });
        s.push_input(InputEvent::GrabStart { id: ControllerId(7) });
        s.tick(DT);
        assert_eq!(count(&log, |e| matches!(e, GameEvent::BallReleased { .. })), 0);
        assert_eq!(count(&log, |e| matches!(e, GameEvent::BallGrabbed { .. })), 0);
        assert!(!s.snapshot().ball_held);
    }

    #[test]
    fn fire_power_up_scores_and_expires() {
        let (mut s, log) = started(GameConfig::default());
        s.push_input(InputEvent::PowerUp {
            kind: PowerUpKind::Fire,
        });
        s.tick(DT);
        assert_eq!(s.state().score, 1);
        assert!(s.state().double_points);
        for _ in 0..11 {
            s.tick(1.0);
        }
        assert!(!s.state().double_points);
        assert_eq!(
            count(&log, |e| *e == GameEvent::PowerUpEnded { kind: PowerUpKind::Fire }),
            1
        );
    }

    #[test]
    fn identical_sessions_stay_identical() {
        let run = || {
            let (mut s, _) = started(GameConfig::default());
            let body = s.ball.body.unwrap();
            s.world.set_velocity(&body, Vec3::new(1.0, 4.0, 0.5));
            for _ in 0..240 {
                s.tick(DT);
            }
            s.snapshot()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn end_tears_everything_down() {
        let (mut s, log) = started(GameConfig::default());
        s.push_input(InputEvent::EndSession);
        s.tick(DT);
        assert!(s.is_ended());
        assert_eq!(s.world.body_count(), 0);
        assert_eq!(s.bus.subscriber_count(), 0);
        assert!(s.timers.is_empty());

        let before = log.borrow().len();
        s.push_input(InputEvent::StartGame);
        s.tick(DT);
        assert_eq!(log.borrow().len(), before);
        assert!(s.snapshot().ball.is_none());
    }

    fn hoop_moves(log: &Rc<RefCell<Vec<GameEvent>>>) -> usize {
        count(log, |e| matches!(e, GameEvent::HoopMoved { .. }))
    }

    fn frames_until_hoop_lands(s: &Session) -> usize {
        (s.config().reposition_delay / DT).ceil() as usize + 2
    }

    #[test]
    fn disconnecting_the_holder_releases_the_ball() {
        let (mut s, log) = started(GameConfig::default());
        s.push_input(InputEvent::GrabStart { id: HAND });
        s.tick(DT);
        assert!(s.snapshot().ball_held);
        assert!(s.ball.body.is_none());

        s.push_input(InputEvent::ControllerDisconnected { id: HAND });
        s.tick(DT);
        assert_eq!(
            count(&log, |e| matches!(e, GameEvent::BallReleased { controller, .. } if *controller == HAND)),
            1
        );
        assert!(!s.controllers.contains(HAND));
        let snap = s.snapshot();
        assert!(!snap.ball_held);
        assert!(snap.ball.is_some());
        assert!(s.ball.body.is_some(), "ball is back in the physics world");
        assert_eq!(s.world.body_count(), 8);
    }

    #[test]
    fn second_controller_takes_the_ball_from_the_first() {
        let (mut s, log) = started(GameConfig::default());
        let other = ControllerId(1);
        let other_pose = Pose::new(Vec3::new(-0.2, 1.1, 0.4), Quat::IDENTITY);
        s.push_input(InputEvent::ControllerConnected {
            id: other,
            handedness: Handedness::Left,
        });
        s.push_input(InputEvent::ControllerPose {
            id: other,
            position: other_pose.position,
            rotation: other_pose.rotation,
        });
        s.push_input(InputEvent::GrabStart { id: HAND });
        s.tick(DT);
        s.push_input(InputEvent::GrabStart { id: other });
        s.tick(DT);

        assert_eq!(count(&log, |e| *e == GameEvent::BallGrabbed { controller: HAND }), 1);
        assert_eq!(count(&log, |e| *e == GameEvent::BallGrabbed { controller: other }), 1);
        assert_eq!(s.ball.possession.holder(), Some(other));
        let snap = s.snapshot();
        assert!(snap.ball_held);
        let expected = other_pose.transform_point(interaction::hold_offset(Handedness::Left));
        assert!((snap.ball.unwrap().position - expected).length() < 1e-5);
        // Still one ball, and it has no body while held: room + rim + sensor
        assert_eq!(s.world.body_count(), 7);

        // The old holder letting go does nothing
        s.push_input(InputEvent::GrabEnd { id: HAND });
        s.tick(DT);
        assert_eq!(count(&log, |e| matches!(e, GameEvent::BallReleased { .. })), 0);
        assert_eq!(s.ball.possession.holder(), Some(other));

        s.push_input(InputEvent::GrabEnd { id: other });
        s.tick(DT);
        assert_eq!(
            count(&log, |e| matches!(e, GameEvent::BallReleased { controller, .. } if *controller == other)),
            1
        );
        assert_eq!(s.world.body_count(), 8);
    }

    #[test]
    fn strict_regions_skip_neighbours_of_the_previous_region() {
        let config = GameConfig {
            strict_regions: true,
            ..GameConfig::default()
        };
        let (mut s, _) = started(config);
        let grid = s.config().grid_regions;
        let land = frames_until_hoop_lands(&s);

        let mut previous = None;
        for _ in 0..8 {
            s.reposition_hoop();
            let region = s.hoop.previous_region.expect("room placement picks a region");
            if let Some(prev) = previous {
                let allowed = placement::candidate_regions(Some(prev), grid, true);
                if allowed.is_empty() {
                    assert_eq!(region, prev);
                } else {
                    assert!(allowed.contains(&region), "region {} after {}", region, prev);
                }
            }
            previous = Some(region);
            for _ in 0..land {
                s.tick(DT);
            }
            assert!(!s.hoop.is_moving);
        }
    }

    #[test]
    fn pending_hoop_move_does_not_survive_game_over_or_reset() {
        let (mut s, log) = started(GameConfig::default());
        let start = s.snapshot().hoop.unwrap().position;
        let land = frames_until_hoop_lands(&s);

        s.reposition_hoop();
        assert!(s.hoop.is_moving);
        assert!(!s.timers.is_empty());
        s.game_over(GameOverReason::ShotClock);
        assert!(s.timers.is_empty());

        // A move that fires after game over is ignored too
        s.timers.schedule(
            0.1,
            Scheduled::MoveHoop {
                position: Vec3::new(1.0, 1.75, 3.0),
            },
        );
        for _ in 0..land {
            s.tick(DT);
        }
        assert_eq!(hoop_moves(&log), 0);
        assert!(s.snapshot().hoop.is_none());

        s.push_input(InputEvent::ResetGame);
        for _ in 0..land {
            s.tick(DT);
        }
        assert_eq!(hoop_moves(&log), 0);
        let hoop = s.snapshot().hoop.expect("hoop placed again");
        assert!((hoop.position - start).length() < 1e-4, "{:?}", hoop.position);
        assert!(!s.hoop.is_moving);
    }

    #[test]
    fn hoop_rests_at_reported_position_on_landing_frame() {
        let (mut s, log) = started(GameConfig::default());
        s.state.level = 6;
        s.hoop.motion.axes = MotionAxes {
            x: true,
            y: false,
            z: true,
        };
        s.reposition_hoop();

        let mut landed = None;
        for _ in 0..frames_until_hoop_lands(&s) {
            s.tick(DT);
            landed = s.frame_events().iter().find_map(|e| match e {
                GameEvent::HoopMoved { position } => Some(*position),
                _ => None,
            });
            if landed.is_some() {
                break;
            }
        }
        let landed = landed.expect("hoop moved");
        assert_eq!(s.snapshot().hoop.unwrap().position, landed);
        let (rim, _) = s.world.body_pose(&s.hoop.body.unwrap().rim);
        assert!((rim - landed).length() < 1e-4);
        assert_eq!(hoop_moves(&log), 1);
    }

    #[test]
    fn impossible_spacing_is_flagged_on_the_hud() {
        let config = GameConfig {
            min_hoop_spacing: 50.0,
            ..GameConfig::default()
        };
        let (mut s, _) = started(config);
        assert!(!s.snapshot().hud.hoop_spacing_relaxed);

        s.reposition_hoop();
        s.tick(DT);
        assert!(s.snapshot().hud.hoop_spacing_relaxed);

        s.game_over(GameOverReason::Misses);
        s.push_input(InputEvent::ResetGame);
        s.tick(DT);
        assert!(!s.snapshot().hud.hoop_spacing_relaxed);
    }

    #[test]
    fn reachable_spacing_leaves_hud_flag_clear() {
        let (mut s, _) = started(GameConfig::default());
        s.reposition_hoop();
        s.tick(DT);
        assert!(!s.snapshot().hud.hoop_spacing_relaxed);
    }

    #[test]
    fn reset_does_not_inherit_a_partial_physics_step() {
        let (mut s, _) = started(GameConfig::default());
        s.game_over(GameOverReason::Misses);
        s.tick(DT * 0.9);

        s.push_input(InputEvent::ResetGame);
        let before = s.sim_time;
        s.tick(DT * 0.5);
        assert_eq!(s.sim_time, before, "half a step must not complete one");
        assert!(s.snapshot().ball.is_some());
    }
}
