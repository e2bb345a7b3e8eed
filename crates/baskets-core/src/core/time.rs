/// Fixed timestep accumulator.
/// Ensures physics runs at a consistent rate regardless of frame time.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Steps allowed per frame before excess time is dropped.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // Cap to prevent spiral of death
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Drop any partial step carried over from earlier frames.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Counts whole intervals of simulated time (e.g. one-second clock ticks).
/// Stopped clocks ignore time; a restart continues from the partial interval.
#[derive(Debug, Clone)]
pub struct IntervalClock {
    interval: f32,
    accumulated: f32,
    running: bool,
}

impl IntervalClock {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop and forget any partial interval.
    /// Drop any partial step carried over from earlier frames.
    pub fn reset(&mut self) {
        self.running = false;
        self.accumulated = 0.0;
    }

    /// Forget the partial interval but keep running state.
    pub fn restart_interval(&mut self) {
        self.accumulated = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance by `dt`; returns how many intervals completed.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        self.accumulated += dt;
        let mut ticks = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            ticks += 1;
        }
        ticks
    }
}
