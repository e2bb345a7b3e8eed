use crate::api::config::GameConfig;
use crate::api::types::{GameEvent, PowerUpKind};
use crate::core::timers::{TimerId, TimerQueue};
use crate::systems::clock::ShotClock;
use crate::systems::level::GameState;
use crate::systems::schedule::Scheduled;

/// Active power-ups and the timers that end them.
#[derive(Debug, Default)]
pub struct PowerUps {
    fire: Option<TimerId>,
    ice: Option<TimerId>,
}

impl PowerUps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.slot(kind).is_some()
    }

    fn slot(&self, kind: PowerUpKind) -> Option<TimerId> {
        match kind {
            PowerUpKind::Fire => self.fire,
            PowerUpKind::Ice => self.ice,
        }
    }

    fn slot_mut(&mut self, kind: PowerUpKind) -> &mut Option<TimerId> {
        match kind {
            PowerUpKind::Fire => &mut self.fire,
            PowerUpKind::Ice => &mut self.ice,
        }
    }

    /// Apply a power-up. Re-activating an active one restarts its timer.
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        state: &mut GameState,
        shot_clock: &mut ShotClock,
        timers: &mut TimerQueue<Scheduled>,
        config: &GameConfig,
    ) -> Vec<GameEvent> {
        if state.game_over {
            log::debug!("Ignoring {:?} power-up after game over", kind);
            return Vec::new();
        }
        if let Some(id) = self.slot_mut(kind).take() {
            timers.cancel(id);
        }

        let duration = match kind {
            PowerUpKind::Fire => {
                let score = state.add_bonus(1);
                state.double_points = true;
                log::info!("Fire power-up: score {} and double points", score);
                config.fire_duration
            }
            PowerUpKind::Ice => {
                shot_clock.pause();
                log::info!("Ice power-up: shot clock frozen");
                config.ice_duration
            }
        };
        *self.slot_mut(kind) = Some(timers.schedule(duration, Scheduled::PowerUpExpired { kind }));
        vec![GameEvent::PowerUpStarted { kind }]
    }

    /// Timer callback: undo the power-up's effect.
    pub fn expire(
        &mut self,
        kind: PowerUpKind,
        state: &mut GameState,
        shot_clock: &mut ShotClock,
    ) -> Vec<GameEvent> {
        if self.slot_mut(kind).take().is_none() {
            return Vec::new();
        }
        match kind {
            PowerUpKind::Fire => state.double_points = false,
            PowerUpKind::Ice => {
                if !state.game_over {
                    shot_clock.resume();
                }
            }
        }
        vec![GameEvent::PowerUpEnded { kind }]
    }

    /// Drop every active power-up without emitting events.
    pub fn clear(&mut self, state: &mut GameState, timers: &mut TimerQueue<Scheduled>) {
        for kind in [PowerUpKind::Fire, PowerUpKind::Ice] {
            if let Some(id) = self.slot_mut(kind).take() {
                timers.cancel(id);
            }
        }
        state.double_points = false;
    }
}
