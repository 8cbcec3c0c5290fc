use crate::api::types::EntityId;

/// Speed a homing body flies at when the level gives none (units/s).
pub const DEFAULT_HOMING_SPEED: f32 = 60.0;

/// Distance at which a homing body counts as arrived and holds still.
pub const DEFAULT_ARRIVE_DISTANCE: f32 = 5.0;

/// Steers a body straight at another entity each tick, facing it.
#[derive(Debug, Clone, PartialEq)]
pub struct HomingComponent {
    /// Resolved once every entity of the level exists. `None` idles.
    pub target: Option<EntityId>,
    pub speed: f32,
    pub arrive_distance: f32,
}

impl HomingComponent {
    pub fn new(speed: f32) -> Self {
        Self {
            target: None,
            speed,
            arrive_distance: DEFAULT_ARRIVE_DISTANCE,
        }
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }
}

impl Default for HomingComponent {
    fn default() -> Self {
        Self::new(DEFAULT_HOMING_SPEED)
    }
}
