pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::error::EngineError;
pub use api::game::{EngineContext, Game, GameConfig};
pub use api::runner::GameRunner;
pub use api::types::{EntityId, Rect};
pub use components::character::{CharacterController, CharacterTuning};
pub use components::entity::{Entity, Marker};
pub use components::health::Health;
pub use components::interact::{DoorComponent, KeyComponent};
pub use components::motion::HomingComponent;
pub use core::body::{Body, BodyDesc, BodyKind, ColliderMaterial};
pub use core::coords::CoordSpace;
pub use core::physics::{
    CollisionPair, ContactEvents, ContactHit, DebugRecord, DebugShape, PhysicsWorld, RayHit,
};
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use input::queue::{Action, InputEvent, InputQueue, InputState, KeyBindings};
pub use assets::level::{LevelDesc, LevelStats};
pub use assets::save::SaveGame;
pub use systems::damage::{DamageConfig, DamageCorrelator};
pub use systems::debug::{debug_outlines, DebugOutline, OutlineKind};
pub use systems::interact::InteractConfig;
pub use systems::motion::{update_bounce, update_homing};
pub use systems::platformer::Platformer;
