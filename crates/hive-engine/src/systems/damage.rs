//! Hazard damage with a per-hazard cooldown.
//!
//! Two detection paths feed the same cooldown table: begin-contact events
//! from the physics step, and a per-tick AABB scan of every hazard against
//! the player. Whichever fires first in a tick sets the cooldown, so the
//! other observes it and does nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;
use crate::components::entity::{Entity, Marker};
use crate::core::physics::{CollisionPair, PhysicsWorld};
use crate::core::scene::Scene;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Health removed per hit.
    pub damage: u32,
    /// Seconds before the same hazard may trigger again.
    pub cooldown: f64,
    /// Entities whose tag starts with this count as hazards without the marker.
    pub hazard_prefix: Option<String>,
    /// Extra slack added to both rectangles in the manual scan.
    pub overlap_margin: f32,
    /// Run the per-tick AABB scan in addition to contact events.
    pub manual_scan: bool,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            damage: 1,
            cooldown: 1.0,
            hazard_prefix: Some("bee".to_string()),
            overlap_margin: 0.0,
            manual_scan: true,
        }
    }
}

/// Applies hazard damage to the player and remembers when each hazard may
/// strike again.
#[derive(Debug, Clone, Default)]
pub struct DamageCorrelator {
    pub config: DamageConfig,
    cooldowns: HashMap<EntityId, f64>,
}

impl DamageCorrelator {
    pub fn new(config: DamageConfig) -> Self {
        Self {
            config,
            cooldowns: HashMap::new(),
        }
    }

    /// Hazard marker, or a tag matching the configured prefix.
    pub fn is_hazard(&self, entity: &Entity) -> bool {
        entity.is_hazard()
            || self
                .config
                .hazard_prefix
                .as_deref()
                .is_some_and(|prefix| entity.tag.starts_with(prefix))
    }

    /// Event path: damage from begin-contacts between the player and a hazard.
    pub fn process_contacts(
        &mut self,
        scene: &mut Scene,
        player: Option<EntityId>,
        begins: &[CollisionPair],
        now: f64,
    ) -> u32 {
        let Some(player) = player else {
            return 0;
        };
        let mut hits = 0;
        for pair in begins {
            let Some(other) = pair.other(player) else {
                continue;
            };
            let hazard = match scene.get(other) {
                Some(entity) => self.is_hazard(entity),
                None => {
                    log::debug!("skipping contact with despawned {other}");
                    continue;
                }
            };
            if hazard && self.try_damage(scene, player, other, now) {
                hits += 1;
            }
        }
        hits
    }

    /// Scan path: damage from every hazard currently overlapping the player.
    pub fn scan_overlaps(
        &mut self,
        scene: &mut Scene,
        physics: &PhysicsWorld,
        player: Option<EntityId>,
        now: f64,
    ) -> u32 {
        let Some((player, body)) = player.and_then(|id| Some((id, scene.get(id)?.body?))) else {
            return 0;
        };
        let player_rect = body.rect(physics).inflate(self.config.overlap_margin);

        let margin = self.config.overlap_margin;
        let touching: Vec<EntityId> = scene
            .iter()
            .filter(|e| e.id != player && self.is_hazard(e))
            .filter(|e| {
                e.body
                    .is_some_and(|b| b.rect(physics).inflate(margin).overlaps(&player_rect))
            })
            .map(|e| e.id)
            .collect();

        let mut hits = 0;
        for hazard in touching {
            if self.try_damage(scene, player, hazard, now) {
                hits += 1;
            }
        }
        hits
    }

    /// Apply one hit from `hazard` unless it is cooling down.
    ///
    /// The cooldown is armed even when the player's invulnerability swallows
    /// the damage. Returns whether health actually dropped.
    pub fn try_damage(
        &mut self,
        scene: &mut Scene,
        player: EntityId,
        hazard: EntityId,
        now: f64,
    ) -> bool {
        if let Some(until) = self.cooldowns.get(&hazard) {
            if now < *until {
                log::trace!("{hazard} cooling down until {until:.2}");
                return false;
            }
        }
        self.cooldowns.insert(hazard, now + self.config.cooldown);

        let Some(health) = scene.get_mut(player).and_then(|e| e.health.as_mut()) else {
            return false;
        };
        if !health.take_damage(self.config.damage) {
            return false;
        }
        log::info!("{player} hit by {hazard}, health {}/{}", health.current(), health.max());
        if health.is_dead() {
            log::info!("{player} died");
        }
        true
    }

    /// When `hazard` may strike again, if it has struck at all.
    pub fn cooldown_until(&self, hazard: EntityId) -> Option<f64> {
        self.cooldowns.get(&hazard).copied()
    }

    /// Forget every cooldown. Called on level (re)load.
    pub fn clear(&mut self) {
        self.cooldowns.clear();
    }
}

/// Count down invulnerability on every entity with health.
pub fn tick_health(scene: &mut Scene, dt: f32) {
    let ids = scene.ids_with(Marker::Health).to_vec();
    for id in ids {
        if let Some(health) = scene.get_mut(id).and_then(|e| e.health.as_mut()) {
            health.tick(dt);
        }
    }
}
