use crate::core::time::IntervalClock;

/// What a shot-clock advance produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShotClockUpdate {
    /// Remaining seconds after each whole-second tick, in order.
    pub ticks: Vec<u32>,
    /// The clock hit zero during this advance. Reported once per run.
    pub expired: bool,
}

/// Whole-second countdown. Stops itself at zero.
#[derive(Debug, Clone)]
pub struct ShotClock {
    clock: IntervalClock,
    remaining: u32,
    expired: bool,
    paused: bool,
}

impl ShotClock {
    pub fn new(initial: u32) -> Self {
        Self {
            clock: IntervalClock::new(1.0),
            remaining: initial,
            expired: false,
            paused: false,
        }
    }

    /// Start counting down from `initial`.
    pub fn start(&mut self, initial: u32) {
        self.reset_to(initial);
        if !self.paused {
            self.clock.start();
        }
    }

    /// Put `initial` back on the clock without changing running/paused state.
    pub fn reset_to(&mut self, initial: u32) {
        self.remaining = initial;
        self.expired = false;
        self.clock.restart_interval();
    }

    pub fn stop(&mut self) {
        self.clock.reset();
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.clock.stop();
    }

    /// Undo `pause`. An expired clock stays stopped.
    pub fn resume(&mut self) {
        self.paused = false;
        if !self.expired {
            self.clock.start();
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn advance(&mut self, dt: f32) -> ShotClockUpdate {
        let mut update = ShotClockUpdate::default();
        if self.expired {
            return update;
        }
        for _ in 0..self.clock.advance(dt) {
            self.remaining = self.remaining.saturating_sub(1);
            update.ticks.push(self.remaining);
            if self.remaining == 0 {
                self.expired = true;
                self.clock.reset();
                update.expired = true;
                log::info!("Shot clock expired");
                break;
            }
        }
        update
    }
}

/// Elapsed whole seconds of play.
#[derive(Debug, Clone)]
pub struct GameClock {
    clock: IntervalClock,
    elapsed: u32,
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            clock: IntervalClock::new(1.0),
            elapsed: 0,
        }
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn reset(&mut self) {
        self.clock.reset();
        self.elapsed = 0;
    }

    pub fn advance(&mut self, dt: f32) -> u32 {
        self.elapsed += self.clock.advance(dt);
        self.elapsed
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_once_on_the_24th_tick() {
        let mut clock = ShotClock::new(24);
        clock.start(24);
        let mut expirations = Vec::new();
        for tick in 1..=30 {
            if clock.advance(1.0).expired {
                expirations.push(tick);
            }
        }
        assert_eq!(expirations, vec![24]);
        assert_eq!(clock.remaining(), 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn ticks_report_remaining_seconds() {
        let mut clock = ShotClock::new(5);
        clock.start(5);
        let update = clock.advance(2.5);
        assert_eq!(update.ticks, vec![4, 3]);
        assert!(!update.expired);
        // Large frame overshooting zero stops at zero
        let update = clock.advance(10.0);
        assert_eq!(update.ticks, vec![2, 1, 0]);
        assert!(update.expired);
    }

    #[test]
    fn reset_puts_time_back_and_clears_partial_second() {
        let mut clock = ShotClock::new(24);
        clock.start(24);
        clock.advance(3.9);
        assert_eq!(clock.remaining(), 21);
        clock.reset_to(20);
        assert_eq!(clock.remaining(), 20);
        assert!(clock.advance(0.5).ticks.is_empty());
        assert_eq!(clock.advance(0.5).ticks, vec![19]);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut clock = ShotClock::new(24);
        clock.start(24);
        clock.pause();
        assert!(clock.advance(5.0).ticks.is_empty());
        assert_eq!(clock.remaining(), 24);
        clock.resume();
        assert_eq!(clock.advance(1.0).ticks, vec![23]);
    }

    #[test]
    fn resume_after_expiry_stays_stopped() {
        let mut clock = ShotClock::new(1);
        clock.start(1);
        assert!(clock.advance(1.0).expired);
        clock.pause();
        clock.resume();
        assert!(!clock.is_running());
        assert!(clock.advance(5.0).ticks.is_empty());
    }

    #[test]
    fn game_clock_counts_up_while_running() {
        let mut clock = GameClock::new();
        assert_eq!(clock.advance(3.0), 0);
        clock.start();
        assert_eq!(clock.advance(2.5), 2);
        clock.stop();
        assert_eq!(clock.advance(10.0), 2);
        clock.reset();
        assert_eq!(clock.elapsed(), 0);
    }
}
