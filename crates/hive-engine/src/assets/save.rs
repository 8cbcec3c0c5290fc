use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::EngineError;
use crate::api::game::EngineContext;
use crate::api::types::EntityId;
use crate::assets::level::WorldSize;
use crate::core::scene::Scene;

pub const SAVE_VERSION: u32 = 1;

/// Snapshot of the dynamic state of a running level.
///
/// Only what a level file cannot reproduce is stored: body motion, health,
/// key and door state. Entities are matched back by tag and by their
/// position among same-tag entities in spawn order, so a save applies to a
/// freshly loaded copy of the same level. Untagged entities share the empty
/// tag and are matched the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    /// Level file the snapshot was taken in.
    #[serde(default)]
    pub level: Option<String>,
    pub world: WorldSize,
    /// Simulated seconds at capture. Informational; restore keeps the live clock.
    #[serde(default)]
    pub elapsed: f64,
    #[serde(default)]
    pub entities: Vec<SavedEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEntity {
    pub id: String,
    /// How many entities with the same tag were spawned before this one.
    #[serde(default)]
    pub occurrence: usize,
    #[serde(default)]
    pub body: Option<SavedBody>,
    #[serde(default)]
    pub health: Option<u32>,
    #[serde(default)]
    pub key_held: Option<bool>,
    #[serde(default)]
    pub door_open: Option<bool>,
}

/// Presentation-space motion state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedBody {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Degrees, visually clockwise.
    pub angle: f32,
}

impl SaveGame {
    /// Capture every entity in `ctx`.
    pub fn capture(ctx: &EngineContext) -> Self {
        let entities = save_keys(&ctx.scene)
            .into_iter()
            .filter_map(|(id, occurrence)| ctx.scene.get(id).map(|e| (e, occurrence)))
            .map(|(e, occurrence)| SavedEntity {
                id: e.tag.clone(),
                occurrence,
                body: e.body.filter(|b| b.is_valid(&ctx.physics)).map(|b| {
                    let pos = b.position(&ctx.physics);
                    let vel = b.velocity(&ctx.physics);
                    SavedBody {
                        x: pos.x,
                        y: pos.y,
                        vx: vel.x,
                        vy: vel.y,
                        angle: b.angle(&ctx.physics),
                    }
                }),
                health: e.health.map(|h| h.current()),
                key_held: e.key.as_ref().map(|k| k.held),
                door_open: e.door.as_ref().map(|d| d.open),
            })
            .collect();

        Self {
            version: SAVE_VERSION,
            level: ctx.current_level().map(str::to_string),
            world: WorldSize {
                width: ctx.world_width(),
                height: ctx.world_height(),
            },
            elapsed: ctx.elapsed(),
            entities,
        }
    }

    /// Write the saved state onto the entities with the same tag and
    /// occurrence. Returns how many saved entities found a match.
    pub fn apply(&self, ctx: &mut EngineContext) -> usize {
        let player = ctx.player();
        let live: HashMap<(String, usize), EntityId> = save_keys(&ctx.scene)
            .into_iter()
            .filter_map(|(id, occurrence)| {
                let tag = ctx.scene.get(id)?.tag.clone();
                Some(((tag, occurrence), id))
            })
            .collect();

        let mut matched = 0;
        for saved in &self.entities {
            let entity = live
                .get(&(saved.id.clone(), saved.occurrence))
                .and_then(|id| ctx.scene.get_mut(*id));
            let Some(entity) = entity else {
                log::warn!(
                    "saved entity {:?} #{} not in the current level",
                    saved.id,
                    saved.occurrence
                );
                continue;
            };
            matched += 1;

            if let (Some(health), Some(current)) = (entity.health.as_mut(), saved.health) {
                health.set_current(current);
            }
            if let (Some(key), Some(held)) = (entity.key.as_mut(), saved.key_held) {
                key.held = held;
                key.carrier = if held { player } else { None };
            }
            if let (Some(door), Some(open)) = (entity.door.as_mut(), saved.door_open) {
                door.open = open;
            }

            let Some(saved_body) = saved.body else {
                continue;
            };
            match entity.body.filter(|b| b.is_valid(&ctx.physics)) {
                Some(body) => {
                    body.set_position(&mut ctx.physics, Vec2::new(saved_body.x, saved_body.y));
                    body.set_angle(&mut ctx.physics, saved_body.angle);
                    body.set_velocity(&mut ctx.physics, Vec2::new(saved_body.vx, saved_body.vy));
                }
                None => log::warn!(
                    "saved entity {:?} #{} has no live body to restore",
                    saved.id,
                    saved.occurrence
                ),
            }
        }
        matched
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|e| EngineError::io(path, e))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_json(&json)
    }
}

/// Every live entity with its occurrence among same-tag entities, in spawn order.
fn save_keys(scene: &Scene) -> Vec<(EntityId, usize)> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    scene
        .iter()
        .map(|e| {
            let count = seen.entry(e.tag.as_str()).or_default();
            let occurrence = *count;
            *count += 1;
            (e.id, occurrence)
        })
        .collect()
}
