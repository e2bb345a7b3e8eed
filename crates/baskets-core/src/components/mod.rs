pub mod ball;
pub mod hoop;
pub mod pose;
pub mod room;
