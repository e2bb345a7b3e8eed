use rand::Rng;

use crate::api::config::GameConfig;
use crate::components::hoop::{HoopMotion, MotionAxes};

/// `F(n)` with `F(1) = F(2) = 1`. Saturates instead of overflowing.
pub fn fibonacci(n: u32) -> u32 {
    if n <= 2 {
        return 1;
    }
    let (mut a, mut b) = (1u32, 1u32);
    for _ in 3..=n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    b
}

/// Score needed to leave `level`.
pub fn level_threshold(level: u32) -> u32 {
    fibonacci(level)
}

/// Hoop oscillation axes for a level. Higher tiers are checked first.
pub fn motion_pattern(level: u32, rng: &mut impl Rng) -> MotionAxes {
    if level >= 7 {
        let roll: f32 = rng.random();
        if roll < 0.3 {
            MotionAxes { x: true, y: false, z: false }
        } else if roll < 0.6 {
            MotionAxes { x: false, y: true, z: false }
        } else {
            MotionAxes { x: false, y: false, z: true }
        }
    } else if level >= 5 {
        if rng.random::<f32>() < 0.5 {
            MotionAxes { x: true, y: false, z: false }
        } else {
            MotionAxes { x: false, y: true, z: false }
        }
    } else if level >= 3 {
        MotionAxes { x: true, y: false, z: false }
    } else {
        MotionAxes::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketOutcome {
    pub points: u32,
    pub score: u32,
    /// New level, if this basket crossed the threshold.
    pub new_level: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissOutcome {
    pub missed: u32,
    pub game_over: bool,
}

/// Score, level and miss bookkeeping for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub score: u32,
    pub level: u32,
    /// Value the shot clock restarts from after each basket.
    pub shot_clock_initial: u32,
    pub missed_shots: u32,
    /// Set by a fast release, consumed by the next basket or ground touch.
    pub shot_attempted: bool,
    pub game_over: bool,
    pub game_started: bool,
    /// Fire power-up active.
    pub double_points: bool,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            score: 0,
            level: 1,
            shot_clock_initial: config.shot_clock_initial,
            missed_shots: 0,
            shot_attempted: false,
            game_over: false,
            game_started: false,
            double_points: false,
        }
    }

    /// Award points for a basket, level up if the threshold is reached and
    /// pick the hoop motion for the (possibly new) level.
    pub fn on_basket(
        &mut self,
        motion: &mut HoopMotion,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> BasketOutcome {
        self.shot_attempted = false;
        let points = if self.double_points { 2 } else { 1 };
        self.score = self.score.saturating_add(points);

        let mut new_level = None;
        if self.score >= level_threshold(self.level) {
            self.level += 1;
            new_level = Some(self.level);
            log::info!("Level up to {}", self.level);

            if self.level >= 7 {
                motion.movement_amplitude += 0.05;
                motion.movement_frequency += 0.1;
            }
            if self.level >= 3
                && self.score % 5 == 0
                && self.shot_clock_initial > config.shot_clock_floor
            {
                self.shot_clock_initial -= 1;
                log::debug!("Shot clock shortened to {}", self.shot_clock_initial);
            }
        }
        motion.axes = motion_pattern(self.level, rng);

        BasketOutcome {
            points,
            score: self.score,
            new_level,
        }
    }

    /// Extra points outside of a basket (fire power-up bonus).
    pub fn add_bonus(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// The ball hit the ground. Counts a miss only if a shot was in flight.
    pub fn on_ground_touch(&mut self, max_missed: u32) -> Option<MissOutcome> {
        if !self.shot_attempted || self.game_over {
            return None;
        }
        self.shot_attempted = false;
        self.missed_shots += 1;
        let game_over = self.missed_shots >= max_missed;
        if game_over {
            self.game_over = true;
        }
        Some(MissOutcome {
            missed: self.missed_shots,
            game_over,
        })
    }

    /// Back to a fresh game; hoop motion returns to its defaults.
    pub fn reset(&mut self, motion: &mut HoopMotion, config: &GameConfig) {
        *self = GameState::new(config);
        *motion = HoopMotion::new(config.movement_amplitude, config.movement_frequency);
    }
}
