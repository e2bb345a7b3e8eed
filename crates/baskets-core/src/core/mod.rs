pub mod events;
pub mod physics;
pub mod time;
pub mod timers;
