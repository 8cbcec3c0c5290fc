use glam::Vec2;

use crate::api::error::EngineError;
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::body::{Body, BodyDesc, ColliderMaterial};
use crate::core::coords::CoordSpace;
use crate::core::physics::{ContactEvents, PhysicsWorld, DEFAULT_DEBUG_TTL, DEFAULT_HIT_SPEED};
use crate::core::scene::Scene;
use crate::input::queue::{InputState, KeyBindings};

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds. `None` steps once per frame with the clamped frame dt.
    pub fixed_dt: Option<f32>,
    /// Upper bound for a single frame's dt (default: 0.1).
    pub max_frame_dt: f32,
    /// World width in presentation units.
    pub world_width: f32,
    /// World height in presentation units; anchors the physics Y flip.
    pub world_height: f32,
    /// Gravity in presentation space. Positive Y pulls down.
    pub gravity: Vec2,
    /// Approach speed at which a new contact also reports a hit.
    pub hit_speed: f32,
    /// Ticks a ray/query debug record stays visible.
    pub debug_ttl: u32,
    pub bindings: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: None,
            max_frame_dt: 0.1,
            world_width: 5000.0,
            world_height: 1200.0,
            gravity: Vec2::new(0.0, 980.0),
            hit_speed: DEFAULT_HIT_SPEED,
            debug_ttl: DEFAULT_DEBUG_TTL,
            bindings: KeyBindings::default(),
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state. Level loads should be queued, not run inline.
    fn init(&mut self, ctx: &mut EngineContext);

    /// Load a level queued through `EngineContext::queue_level_load`.
    /// Runs at the start of a tick, before the physics step.
    fn load_level(&mut self, _ctx: &mut EngineContext, _path: &str) -> Result<(), EngineError> {
        Ok(())
    }

    /// The game loop tick. Runs after the physics step and its contact events.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputState, dt: f32);
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub physics: PhysicsWorld,
    world_width: f32,
    gravity: Vec2,
    hit_speed: f32,
    debug_ttl: u32,
    player: Option<EntityId>,
    contacts: ContactEvents,
    pending_level: Option<String>,
    current_level: Option<String>,
    elapsed: f64,
}

impl EngineContext {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            scene: Scene::new(),
            physics: Self::build_world(
                config.gravity,
                config.world_height,
                config.hit_speed,
                config.debug_ttl,
            ),
            world_width: config.world_width,
            gravity: config.gravity,
            hit_speed: config.hit_speed,
            debug_ttl: config.debug_ttl,
            player: None,
            contacts: ContactEvents::default(),
            pending_level: None,
            current_level: None,
            elapsed: 0.0,
        }
    }

    fn build_world(gravity: Vec2, height: f32, hit_speed: f32, debug_ttl: u32) -> PhysicsWorld {
        PhysicsWorld::new(gravity, CoordSpace::new(height))
            .with_hit_speed(hit_speed)
            .with_debug_ttl(debug_ttl)
    }

    /// Reserve the next entity ID.
    pub fn next_id(&mut self) -> EntityId {
        self.scene.allocate_id()
    }

    pub fn world_width(&self) -> f32 {
        self.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.physics.space().height()
    }

    /// Seconds of simulated time since the context was created.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    // -- Entities --

    /// Register an entity. A body it carries gets its back-reference here,
    /// once the id is known to be live.
    pub fn spawn(&mut self, entity: Entity) -> Result<EntityId, EngineError> {
        let body = entity.body;
        match self.scene.spawn(entity) {
            Ok(id) => {
                if let Some(body) = body {
                    body.attach_entity(&mut self.physics, id);
                }
                Ok(id)
            }
            Err(err) => {
                if let Some(body) = body {
                    body.destroy(&mut self.physics);
                }
                Err(err)
            }
        }
    }

    /// Spawn an entity with a new physics body.
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> Result<EntityId, EngineError> {
        let body = Body::create(&mut self.physics, desc, material);
        self.spawn(entity.with_body(body))
    }

    /// Despawn an entity, releasing its physics body if present.
    pub fn despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.despawn(id) {
            if let Some(body) = &entity.body {
                body.destroy(&mut self.physics);
            }
            if self.player == Some(id) {
                self.player = None;
            }
        }
    }

    /// The body of a live entity.
    pub fn body(&self, id: EntityId) -> Option<Body> {
        self.scene.get(id).and_then(|e| e.body)
    }

    /// Set the linear velocity of an entity's physics body.
    pub fn set_velocity(&mut self, id: EntityId, vel: Vec2) {
        if let Some(body) = self.body(id) {
            body.set_velocity(&mut self.physics, vel);
        }
    }

    /// Get the linear velocity of an entity's physics body.
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.body(id)
            .map(|body| body.velocity(&self.physics))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_player(&mut self, id: EntityId) {
        self.player = Some(id);
    }

    /// The player, if one is set and still alive.
    pub fn player(&self) -> Option<EntityId> {
        self.player.filter(|id| self.scene.is_alive(*id))
    }

    // -- Physics --

    /// Advance physics by `dt` and replace the contact events of the last step.
    pub fn step_physics(&mut self, dt: f32) -> Result<(), EngineError> {
        self.contacts.clear();
        self.physics.step_into(dt, &mut self.contacts)?;
        self.elapsed += dt as f64;
        Ok(())
    }

    /// Contact events from the most recent physics step.
    pub fn contacts(&self) -> &ContactEvents {
        &self.contacts
    }

    // -- Levels --

    /// Request a level load at the start of the next tick.
    pub fn queue_level_load(&mut self, path: impl Into<String>) {
        self.pending_level = Some(path.into());
    }

    pub fn take_pending_level(&mut self) -> Option<String> {
        self.pending_level.take()
    }

    pub fn has_pending_level(&self) -> bool {
        self.pending_level.is_some()
    }

    pub fn current_level(&self) -> Option<&str> {
        self.current_level.as_deref()
    }

    pub fn set_current_level(&mut self, path: impl Into<String>) {
        self.current_level = Some(path.into());
    }

    /// Drop every entity and rebuild the physics world for a new world size.
    pub fn reset_world(&mut self, width: f32, height: f32) {
        for entity in self.scene.clear() {
            if let Some(body) = entity.body {
                body.destroy(&mut self.physics);
            }
        }
        self.physics = Self::build_world(self.gravity, height, self.hit_speed, self.debug_ttl);
        self.world_width = width;
        self.player = None;
        self.contacts.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
