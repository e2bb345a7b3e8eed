// core/timers.rs
//
// Cancelable one-shot timers on simulated time.
// Actions are plain data; the owner decides what firing means, so a timer
// that outlives the state it was scheduled for can be dropped or ignored.
//
// Usage:
//   let mut timers = TimerQueue::new();
//   let id = timers.schedule(0.2, Action::MoveHoop);
//   for action in timers.advance(dt) { ... }

/// Handle returned by `schedule`, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

#[derive(Debug, Clone)]
struct Timer<A> {
    id: TimerId,
    due: f64,
    action: A,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<A> {
    now: f64,
    next_id: u32,
    timers: Vec<Timer<A>>,
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Schedule `action` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay.max(0.0) as f64,
            action,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every pending timer whose action matches.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&A) -> bool) {
        self.timers.retain(|t| !predicate(&t.action));
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Current simulated time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Advance time and return the actions that came due, earliest first.
    pub fn advance(&mut self, dt: f32) -> Vec<A> {
        self.now += dt.max(0.0) as f64;
        let now = self.now;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].due <= now {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|t| t.action).collect()
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
