use crate::api::game::{EngineContext, Game, GameConfig};
use crate::core::time::{clamp_frame_dt, FixedTimestep};
use crate::input::queue::{InputEvent, InputQueue, InputState};

/// Generic game runner that wires up the engine loop.
///
/// Per tick: drain input, apply a queued level load, clamp dt, then for each
/// step run physics (with its contact events) before `Game::update`.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    state: InputState,
    timestep: Option<FixedTimestep>,
    config: GameConfig,
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self {
            ctx: EngineContext::new(&config),
            input: InputQueue::new(),
            state: InputState::new(config.bindings.clone()),
            timestep: config.fixed_dt.map(FixedTimestep::new),
            game,
            config,
            initialized: false,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame tick.
    pub fn tick(&mut self, frame_dt: f32) {
        if !self.initialized {
            return;
        }

        for event in self.input.drain() {
            self.state.apply(event);
        }

        if let Some(path) = self.ctx.take_pending_level() {
            match self.game.load_level(&mut self.ctx, &path) {
                Ok(()) => {
                    log::info!("loaded level {path}");
                    self.ctx.set_current_level(path);
                }
                Err(err) => log::warn!("level load {path} failed: {err}"),
            }
        }

        let Some(dt) = clamp_frame_dt(frame_dt, self.config.max_frame_dt) else {
            log::debug!("skipping tick with unsteppable dt {frame_dt}");
            return;
        };

        let (steps, step_dt) = match &mut self.timestep {
            Some(timestep) => (timestep.accumulate(dt), timestep.dt()),
            None => (1, dt),
        };
        for _ in 0..steps {
            if let Err(err) = self.ctx.step_physics(step_dt) {
                log::error!("physics step failed: {err}");
                break;
            }
            self.game.update(&mut self.ctx, &self.state, step_dt);
            self.ctx.physics.tick_debug();
        }
    }

    pub fn ctx(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// The game and its context at once, for calls that need both.
    pub fn parts_mut(&mut self) -> (&mut G, &mut EngineContext) {
        (&mut self.game, &mut self.ctx)
    }

    pub fn input_state(&self) -> &InputState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
