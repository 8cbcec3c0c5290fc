use crate::api::types::EntityId;

pub const DEFAULT_NEXT_LEVEL: &str = "assets/level2.json";

/// A key that can be carried by the player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyComponent {
    pub held: bool,
    pub carrier: Option<EntityId>,
}

impl KeyComponent {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A door that opens once, when the player reaches it while a key is held.
#[derive(Debug, Clone, PartialEq)]
pub struct DoorComponent {
    pub open: bool,
    /// Level queued for loading when the door opens.
    pub next_level: String,
}

impl DoorComponent {
    pub fn new(next_level: impl Into<String>) -> Self {
        Self {
            open: false,
            next_level: next_level.into(),
        }
    }
}

impl Default for DoorComponent {
    fn default() -> Self {
        Self::new(DEFAULT_NEXT_LEVEL)
    }
}
