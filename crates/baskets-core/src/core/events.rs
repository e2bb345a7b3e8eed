use crate::api::types::GameEvent;

/// Something that wants to hear about gameplay events (audio, particles, UI).
pub trait Subscriber {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> Subscriber for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

/// Synchronous publish/subscribe queue.
///
/// Events published during a frame are held until `dispatch`, which the
/// session calls once per frame after physics and gameplay reactions, so
/// subscribers always observe events in publish order.
pub struct EventBus {
    queue: Vec<GameEvent>,
    /// Everything dispatched since the last `begin_frame`.
    frame_log: Vec<GameEvent>,
    subscribers: Vec<(SubscriberId, Box<dyn Subscriber>)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            queue: Vec::with_capacity(16),
            frame_log: Vec::with_capacity(16),
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn unsubscribe_all(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Start a new frame: forget the previous frame's log.
    pub fn begin_frame(&mut self) {
        self.frame_log.clear();
    }

    /// Deliver all queued events to every subscriber, in publish order.
    pub fn dispatch(&mut self) {
        for event in std::mem::take(&mut self.queue) {
            for (_, subscriber) in self.subscribers.iter_mut() {
                subscriber.on_event(&event);
            }
            self.frame_log.push(event);
        }
    }

    /// Drop queued events without delivering them.
    pub fn discard_pending(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }

    /// Events dispatched since the last `begin_frame`.
    pub fn frame_events(&self) -> &[GameEvent] {
        &self.frame_log
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
