pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;

pub use glam;

// Re-export key types at crate root for convenience
pub use api::config::GameConfig;
pub use api::error::SimError;
pub use api::session::{FrameSnapshot, Hud, Session};
pub use api::types::{
    ColliderTag, ControllerId, EntityKind, GameEvent, GameOverReason, Handedness, PowerUpKind,
    WireEvent,
};
pub use assets::manifest::ModelManifest;
pub use assets::registry::{VisualRegistry, VisualSource};
pub use bridge::protocol::{FrameBuffer, ProtocolLayout};
pub use components::pose::Pose;
pub use components::room::RoomBoundary;
pub use core::events::{EventBus, Subscriber, SubscriberId};
pub use core::physics::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, CollisionPair, PhysicsBody, PhysicsWorld,
};
pub use core::time::FixedTimestep;
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::instance::{PoseBuffer, PoseInstance};
