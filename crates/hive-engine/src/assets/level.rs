use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::EngineError;
use crate::api::game::EngineContext;
use crate::components::character::{CharacterController, CharacterTuning};
use crate::components::entity::Entity;
use crate::components::health::Health;
use crate::components::interact::{DoorComponent, KeyComponent, DEFAULT_NEXT_LEVEL};
use crate::components::motion::{HomingComponent, DEFAULT_HOMING_SPEED};
use crate::core::body::{BodyDesc, BodyKind, ColliderMaterial};

/// Entity tag used as the player when a level does not name one.
pub const DEFAULT_PLAYER_TAG: &str = "player";

/// Health given to a player the level spawns without any.
pub const DEFAULT_PLAYER_HEALTH: u32 = 3;

/// A level description, loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelDesc {
    /// World size. Keeps the current size when absent.
    #[serde(default)]
    pub world: Option<WorldSize>,
    /// Tag of the player entity (default: "player").
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntityDesc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: f32,
    pub height: f32,
}

/// One entity in a level file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDesc {
    /// Becomes the entity tag.
    pub id: String,
    #[serde(default)]
    pub body: Option<BodyDef>,
    #[serde(default)]
    pub standable: bool,
    #[serde(default)]
    pub hazard: bool,
    /// Character tuning; present means the entity is controlled.
    #[serde(default)]
    pub character: Option<CharacterTuning>,
    /// Maximum health.
    #[serde(default)]
    pub health: Option<u32>,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub door: Option<DoorDef>,
    /// Steer toward another entity of the level.
    #[serde(default)]
    pub homing: Option<HomingDef>,
    /// Reflect off the world bounds.
    #[serde(default)]
    pub bounce: bool,
}

/// Body placement in presentation space. `x`/`y` is the center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyDef {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_extent")]
    pub w: f32,
    #[serde(default = "default_extent")]
    pub h: f32,
    #[serde(default)]
    pub kind: BodyKind,
    /// Degrees, visually clockwise.
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub vx: f32,
    #[serde(default)]
    pub vy: f32,
    #[serde(default)]
    pub fixed_rotation: bool,
    #[serde(default)]
    pub gravity_scale: Option<f32>,
    #[serde(default)]
    pub friction: Option<f32>,
    #[serde(default)]
    pub restitution: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorDef {
    #[serde(default = "default_next_level")]
    pub next_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomingDef {
    /// Id of the entity to fly at. Resolved after every entity has spawned,
    /// so it may name one that comes later in the file.
    pub target: String,
    #[serde(default = "default_homing_speed")]
    pub speed: f32,
}

fn default_homing_speed() -> f32 {
    DEFAULT_HOMING_SPEED
}

fn default_extent() -> f32 {
    50.0
}

fn default_next_level() -> String {
    DEFAULT_NEXT_LEVEL.to_string()
}

/// What a level load produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelStats {
    pub entities: usize,
    pub bodies: usize,
    pub player_set: bool,
}

impl BodyDef {
    pub fn desc(&self, controlled: bool) -> BodyDesc {
        let mut desc = BodyDesc::new(self.kind, Vec2::new(self.w, self.h))
            .with_position(Vec2::new(self.x, self.y))
            .with_rotation(self.angle)
            .with_velocity(Vec2::new(self.vx, self.vy))
            .with_fixed_rotation(self.fixed_rotation || controlled);
        if let Some(scale) = self.gravity_scale {
            desc = desc.with_gravity_scale(scale);
        }
        desc
    }

    pub fn material(&self) -> ColliderMaterial {
        let defaults = ColliderMaterial::default();
        ColliderMaterial {
            friction: self.friction.unwrap_or(defaults.friction),
            restitution: self.restitution.unwrap_or(defaults.restitution),
            ..defaults
        }
    }
}

impl LevelDesc {
    /// Parse a level from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn player_tag(&self) -> &str {
        self.player.as_deref().unwrap_or(DEFAULT_PLAYER_TAG)
    }

    /// Replace the context's world with this level.
    ///
    /// The scene is cleared and physics rebuilt for the level's height before
    /// anything spawns. Homing targets are looked up by id once the whole
    /// level exists. A level without its player still loads; every
    /// player-dependent system then idles.
    pub fn spawn_into(&self, ctx: &mut EngineContext) -> Result<LevelStats, EngineError> {
        let size = self.world.unwrap_or(WorldSize {
            width: ctx.world_width(),
            height: ctx.world_height(),
        });
        ctx.reset_world(size.width, size.height);

        let player_tag = self.player_tag();
        let mut stats = LevelStats::default();
        let mut homing_targets = Vec::new();
        for desc in &self.entities {
            let is_player = desc.id == player_tag;
            let id = ctx.next_id();
            let mut entity = Entity::new(id).with_tag(desc.id.as_str());
            if desc.standable {
                entity = entity.standable();
            }
            if desc.hazard {
                entity = entity.hazard();
            }
            if let Some(tuning) = desc.character {
                entity = entity.with_character(CharacterController::new(tuning));
            } else if is_player {
                entity = entity.with_character(CharacterController::default());
            }
            match desc.health {
                Some(max) => entity = entity.with_health(Health::new(max)),
                None if is_player => {
                    entity = entity.with_health(Health::new(DEFAULT_PLAYER_HEALTH))
                }
                None => {}
            }
            if desc.key {
                entity = entity.with_key(KeyComponent::new());
            }
            if let Some(door) = &desc.door {
                entity = entity.with_door(DoorComponent::new(door.next_level.as_str()));
            }
            if let Some(homing) = &desc.homing {
                entity = entity.with_homing(HomingComponent::new(homing.speed));
            }
            if desc.bounce {
                entity = entity.bounce();
            }

            let controlled = entity.character.is_some();
            let id = match &desc.body {
                Some(body) => {
                    stats.bodies += 1;
                    ctx.spawn_with_body(entity, &body.desc(controlled), body.material())?
                }
                None => ctx.spawn(entity)?,
            };
            stats.entities += 1;
            if let Some(homing) = &desc.homing {
                homing_targets.push((id, homing.target.as_str()));
            }

            if is_player && !stats.player_set {
                ctx.set_player(id);
                stats.player_set = true;
            }
        }

        for (id, tag) in homing_targets {
            let target = ctx.scene.find_by_tag(tag).map(|e| e.id);
            if target.is_none() {
                log::warn!("{id} homes on unknown entity {tag:?}; it will idle");
            }
            if let Some(homing) = ctx.scene.get_mut(id).and_then(|e| e.homing.as_mut()) {
                homing.target = target;
            }
        }

        if !stats.player_set {
            log::warn!("level has no entity tagged {player_tag:?}; running without a player");
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Marker;

    const LEVEL: &str = r#"{
        "world": { "width": 2000, "height": 600 },
        "entities": [
            { "id": "ground", "standable": true,
              "body": { "x": 1000, "y": 575, "w": 2000, "h": 50, "kind": "fixed" } },
            { "id": "player", "body": { "x": 100, "y": 500 } },
            { "id": "bee_1", "hazard": true,
              "body": { "x": 400, "y": 300, "w": 30, "h": 30, "kind": "kinematic", "vx": -40 } },
            { "id": "key", "key": true, "body": { "x": 600, "y": 530, "w": 20, "h": 20 } },
            { "id": "door", "door": {}, "body": { "x": 1900, "y": 500, "w": 60, "h": 100, "kind": "fixed" } },
            { "id": "spawn_marker" }
        ]
    }"#;

    #[test]
    fn parse_fills_defaults() {
        let level = LevelDesc::from_json(LEVEL).unwrap();
        assert_eq!(level.entities.len(), 6);
        assert_eq!(level.player_tag(), "player");

        let player = level.entities[1].body.as_ref().unwrap();
        assert_eq!((player.w, player.h), (50.0, 50.0));
        assert_eq!(player.kind, BodyKind::Dynamic);
        assert_eq!(
            level.entities[4].door.as_ref().unwrap().next_level,
            DEFAULT_NEXT_LEVEL
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            LevelDesc::from_json("{ \"entities\": [ { } ] }"),
            Err(EngineError::Json(_))
        ));
    }

    #[test]
    fn spawn_into_builds_scene_and_world() {
        let level = LevelDesc::from_json(LEVEL).unwrap();
        let mut ctx = EngineContext::default();
        let stats = level.spawn_into(&mut ctx).unwrap();

        assert_eq!(
            stats,
            LevelStats {
                entities: 6,
                bodies: 5,
                player_set: true
            }
        );
        assert_eq!(ctx.world_width(), 2000.0);
        assert_eq!(ctx.world_height(), 600.0);
        assert_eq!(ctx.physics.body_count(), 5);

        let player = ctx.player().unwrap();
        let entity = ctx.scene.get(player).unwrap();
        assert_eq!(entity.tag, "player");
        assert!(entity.character.is_some());
        assert_eq!(entity.health.unwrap().max(), DEFAULT_PLAYER_HEALTH);

        let bee = ctx.scene.find_by_tag("bee_1").unwrap();
        assert!(bee.is_hazard());
        assert_eq!(ctx.velocity(bee.id), Vec2::new(-40.0, 0.0));

        assert_eq!(ctx.scene.ids_with(Marker::Standable).len(), 1);
        assert_eq!(ctx.scene.ids_with(Marker::Key).len(), 1);
        assert_eq!(ctx.scene.ids_with(Marker::Door).len(), 1);
    }

    #[test]
    fn reload_replaces_previous_level() {
        let level = LevelDesc::from_json(LEVEL).unwrap();
        let mut ctx = EngineContext::default();
        level.spawn_into(&mut ctx).unwrap();
        let first_player = ctx.player().unwrap();

        level.spawn_into(&mut ctx).unwrap();
        assert_eq!(ctx.scene.len(), 6);
        assert_eq!(ctx.physics.body_count(), 5);
        assert!(!ctx.scene.is_alive(first_player));
    }

    #[test]
    fn level_without_player_still_loads() {
        let level = LevelDesc::from_json(
            r#"{ "player": "hero", "entities": [ { "id": "player", "body": { "x": 0, "y": 0 } } ] }"#,
        )
        .unwrap();
        let mut ctx = EngineContext::default();
        let stats = level.spawn_into(&mut ctx).unwrap();
        assert!(!stats.player_set);
        assert_eq!(ctx.player(), None);
        // Only the named player gets a default controller.
        assert!(ctx.scene.find_by_tag("player").unwrap().character.is_none());
    }

    #[test]
    fn homing_targets_resolve_after_spawn() {
        let level = LevelDesc::from_json(
            r#"{ "entities": [
                { "id": "missile", "homing": { "target": "player" }, "bounce": true,
                  "body": { "x": 500, "y": 100, "w": 20, "h": 20, "kind": "kinematic" } },
                { "id": "stray", "homing": { "target": "nobody", "speed": 10 },
                  "body": { "x": 700, "y": 100, "w": 20, "h": 20, "kind": "kinematic" } },
                { "id": "player", "body": { "x": 100, "y": 500 } }
            ] }"#,
        )
        .unwrap();
        let mut ctx = EngineContext::default();
        level.spawn_into(&mut ctx).unwrap();

        let missile = ctx.scene.find_by_tag("missile").unwrap();
        let homing = missile.homing.as_ref().unwrap();
        assert_eq!(homing.target, ctx.player());
        assert_eq!(homing.speed, DEFAULT_HOMING_SPEED);
        assert!(missile.bounces());

        let stray = ctx.scene.find_by_tag("stray").unwrap();
        assert_eq!(stray.homing.as_ref().unwrap().target, None);
        assert_eq!(stray.homing.as_ref().unwrap().speed, 10.0);
        assert!(!stray.bounces());
        assert_eq!(ctx.scene.ids_with(Marker::Homing).len(), 2);
        assert_eq!(ctx.scene.ids_with(Marker::Bounce).len(), 1);
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level1.json");
        std::fs::write(&path, LEVEL).unwrap();
        assert_eq!(LevelDesc::load(&path).unwrap().entities.len(), 6);

        let missing = dir.path().join("nope.json");
        assert!(matches!(
            LevelDesc::load(&missing),
            Err(EngineError::Io { .. })
        ));
    }
}
