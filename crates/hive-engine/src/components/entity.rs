use crate::api::types::EntityId;
use crate::components::character::CharacterController;
use crate::components::health::Health;
use crate::components::interact::{DoorComponent, KeyComponent};
use crate::components::motion::HomingComponent;
use crate::core::body::Body;

/// Component kinds the scene indexes for per-tick scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Body,
    Standable,
    Hazard,
    Character,
    Health,
    Key,
    Door,
    Homing,
    Bounce,
}

impl Marker {
    pub const ALL: [Marker; 9] = [
        Marker::Body,
        Marker::Standable,
        Marker::Hazard,
        Marker::Character,
        Marker::Health,
        Marker::Key,
        Marker::Door,
        Marker::Homing,
        Marker::Bounce,
    ];
}

/// Fat entity: one struct with optional components.
/// Components are fixed once the entity is spawned; the scene indexes them.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// String tag for finding entities by name (level ids, hazard prefixes).
    pub tag: String,
    pub body: Option<Body>,
    pub health: Option<Health>,
    pub character: Option<CharacterController>,
    pub key: Option<KeyComponent>,
    pub door: Option<DoorComponent>,
    pub homing: Option<HomingComponent>,
    standable: bool,
    hazard: bool,
    bounce: bool,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            body: None,
            health: None,
            character: None,
            key: None,
            door: None,
            homing: None,
            standable: false,
            hazard: false,
            bounce: false,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_character(mut self, character: CharacterController) -> Self {
        self.character = Some(character);
        self
    }

    pub fn with_key(mut self, key: KeyComponent) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_door(mut self, door: DoorComponent) -> Self {
        self.door = Some(door);
        self
    }

    pub fn with_homing(mut self, homing: HomingComponent) -> Self {
        self.homing = Some(homing);
        self
    }

    /// Mark as ground the character controller may stand on.
    pub fn standable(mut self) -> Self {
        self.standable = true;
        self
    }

    /// Mark as damaging on contact.
    pub fn hazard(mut self) -> Self {
        self.hazard = true;
        self
    }

    /// Keep inside the world bounds, reflecting off the edges.
    pub fn bounce(mut self) -> Self {
        self.bounce = true;
        self
    }

    pub fn is_standable(&self) -> bool {
        self.standable
    }

    pub fn is_hazard(&self) -> bool {
        self.hazard
    }

    pub fn bounces(&self) -> bool {
        self.bounce
    }

    pub fn has_marker(&self, marker: Marker) -> bool {
        match marker {
            Marker::Body => self.body.is_some(),
            Marker::Standable => self.standable,
            Marker::Hazard => self.hazard,
            Marker::Character => self.character.is_some(),
            Marker::Health => self.health.is_some(),
            Marker::Key => self.key.is_some(),
            Marker::Door => self.door.is_some(),
            Marker::Homing => self.homing.is_some(),
            Marker::Bounce => self.bounce,
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = Marker> + '_ {
        Marker::ALL.into_iter().filter(move |m| self.has_marker(*m))
    }
}
