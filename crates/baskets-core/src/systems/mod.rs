pub mod ball;
pub mod clock;
pub mod hoop;
pub mod interaction;
pub mod level;
pub mod placement;
pub mod powerup;
pub mod schedule;
pub mod scoreboard;
pub mod sensor;
