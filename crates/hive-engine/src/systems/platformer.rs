//! The platformer rules as a [`Game`]: levels from JSON, one player with a
//! character controller, homing and bouncing hazards, a key and a door to
//! the next level.

use crate::api::error::EngineError;
use crate::api::game::{EngineContext, Game, GameConfig};
use crate::assets::level::LevelDesc;
use crate::assets::save::SaveGame;
use crate::input::queue::{Action, InputState};
use crate::systems::character::update_characters;
use crate::systems::damage::{tick_health, DamageConfig, DamageCorrelator};
use crate::systems::interact::{update_doors, update_keys, InteractConfig};
use crate::systems::motion::{update_bounce, update_homing};

pub const DEFAULT_START_LEVEL: &str = "assets/level1.json";

pub struct Platformer {
    config: GameConfig,
    damage: DamageCorrelator,
    interact: InteractConfig,
    start_level: String,
}

impl Platformer {
    pub fn new(start_level: impl Into<String>) -> Self {
        Self {
            config: GameConfig::default(),
            damage: DamageCorrelator::default(),
            interact: InteractConfig::default(),
            start_level: start_level.into(),
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_damage(mut self, config: DamageConfig) -> Self {
        self.damage = DamageCorrelator::new(config);
        self
    }

    pub fn with_interact(mut self, config: InteractConfig) -> Self {
        self.interact = config;
        self
    }

    pub fn damage(&self) -> &DamageCorrelator {
        &self.damage
    }

    /// The player exists and has run out of health.
    pub fn is_game_over(&self, ctx: &EngineContext) -> bool {
        ctx.player()
            .and_then(|id| ctx.scene.get(id))
            .and_then(|e| e.health)
            .is_some_and(|h| h.is_dead())
    }

    /// Heal the player and reload the current level on the next tick.
    pub fn restart(&mut self, ctx: &mut EngineContext) {
        if let Some(health) = ctx
            .player()
            .and_then(|id| ctx.scene.get_mut(id))
            .and_then(|e| e.health.as_mut())
        {
            health.reset();
        }
        let level = ctx
            .current_level()
            .map(str::to_string)
            .unwrap_or_else(|| self.start_level.clone());
        ctx.queue_level_load(level);
    }

    /// Load the save's level right away and apply the saved state on top.
    pub fn restore(
        &mut self,
        ctx: &mut EngineContext,
        save: &SaveGame,
    ) -> Result<usize, EngineError> {
        if let Some(level) = &save.level {
            self.load_level(ctx, level)?;
            ctx.set_current_level(level.as_str());
        }
        Ok(save.apply(ctx))
    }
}

impl Default for Platformer {
    fn default() -> Self {
        Self::new(DEFAULT_START_LEVEL)
    }
}

impl Game for Platformer {
    fn config(&self) -> GameConfig {
        self.config.clone()
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        ctx.queue_level_load(self.start_level.as_str());
    }

    fn load_level(&mut self, ctx: &mut EngineContext, path: &str) -> Result<(), EngineError> {
        let level = LevelDesc::load(path)?;
        let stats = level.spawn_into(ctx)?;
        self.damage.clear();
        log::info!(
            "{path}: {} entities, {} bodies, player {}",
            stats.entities,
            stats.bodies,
            if stats.player_set { "set" } else { "missing" }
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputState, dt: f32) {
        if self.is_game_over(ctx) {
            return;
        }
        let player = ctx.player();
        let now = ctx.elapsed();
        let world_width = ctx.world_width();

        for hit in &ctx.contacts().hits {
            log::debug!("{} hit {} at {:.0}", hit.entity_a, hit.entity_b, hit.speed);
        }
        let begins = ctx.contacts().begin.clone();
        self.damage.process_contacts(&mut ctx.scene, player, &begins, now);

        update_characters(&mut ctx.scene, &mut ctx.physics, input, player, world_width);
        update_homing(&ctx.scene, &mut ctx.physics);
        update_bounce(&ctx.scene, &mut ctx.physics, world_width);

        if self.damage.config.manual_scan {
            self.damage.scan_overlaps(&mut ctx.scene, &ctx.physics, player, now);
        }

        update_keys(
            &mut ctx.scene,
            &mut ctx.physics,
            player,
            input.is_down(Action::Pickup),
            &self.interact,
        );
        if let Some(next) = update_doors(&mut ctx.scene, &ctx.physics, player, &self.interact) {
            ctx.queue_level_load(next);
        }

        tick_health(&mut ctx.scene, dt);
    }
}
