//! Engine context
//!
//! [`Engine`] owns the scene, the render dispatch, the graphics context and
//! the engine modules, and drives them through an explicit lifecycle.
//!
//! ## Frame order
//!
//! ```text
//! modules.update ─► scene.update ─► gfx.begin_frame ─► scene.render
//!                                          ─► dispatch.render_frame ─► gfx.present
//! ```

use log::{debug, info, warn};
use thiserror::Error;

use crate::application::Application;
use crate::core::config::{ConfigError, EngineConfig};
use crate::foundation::time::Timer;
use crate::render::{GraphicsContext, GraphicsError, RenderDispatch, RenderError, RenderFrame};
use crate::scene::{EntityBehavior, EntityId, Lifecycle, Scene, SceneError, SceneResult};

/// Subsystem driven by the engine every frame
///
/// Modules are initialized in registration order before the scene and shut
/// down in reverse order after it.
pub trait EngineModule {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Called once during `Engine::init`
    fn init(&mut self, scene: &mut Scene, root: EntityId) -> SceneResult<()> {
        let _ = (scene, root);
        Ok(())
    }

    /// Called at the start of every frame, before the scene update
    fn update(&mut self, scene: &mut Scene, root: EntityId, delta_time: f32) -> SceneResult<()>;

    /// Called once during `Engine::shutdown`
    fn shutdown(&mut self) {}
}

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created, `init` not called yet
    Created,
    /// Initialized and producing frames
    Running,
    /// Shut down; terminal
    ShutDown,
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Render dispatch error
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Graphics context error
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// Engine module error
    #[error("Module '{name}' failed: {source}")]
    Module {
        /// Module name
        name: String,
        /// Underlying error
        source: SceneError,
    },

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),

    /// Operation not allowed in the current state
    #[error("Cannot {operation} while engine is {state:?}")]
    InvalidState {
        /// Attempted operation
        operation: &'static str,
        /// State at the time
        state: EngineState,
    },
}

/// Main engine struct
pub struct Engine {
    config: EngineConfig,
    scene: Scene,
    root: EntityId,
    dispatch: RenderDispatch,
    graphics: Box<dyn GraphicsContext>,
    timer: Timer,
    modules: Vec<Box<dyn EngineModule>>,
    state: EngineState,
    running: bool,
}

impl Engine {
    /// Create an engine over `graphics`; nothing is initialized yet
    pub fn create(config: EngineConfig, graphics: Box<dyn GraphicsContext>) -> Result<Self, EngineError> {
        config.validate()?;
        info!("Creating engine '{}'", config.window.title);

        let mut scene = Scene::with_config(config.scene.clone());
        let root = scene.spawn_group();
        let timer = config.frame.fixed_delta.map_or_else(Timer::new, Timer::fixed);

        Ok(Self {
            config,
            scene,
            root,
            dispatch: RenderDispatch::new(),
            graphics,
            timer,
            modules: Vec::new(),
            state: EngineState::Created,
            running: false,
        })
    }

    fn expect_state(&self, expected: EngineState, operation: &'static str) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Register a module; modules added while running are initialized now
    pub fn add_module(&mut self, mut module: Box<dyn EngineModule>) -> Result<(), EngineError> {
        match self.state {
            EngineState::Created => {}
            EngineState::Running => {
                module
                    .init(&mut self.scene, self.root)
                    .map_err(|source| EngineError::Module {
                        name: module.name().to_string(),
                        source,
                    })?;
            }
            EngineState::ShutDown => {
                return Err(EngineError::InvalidState {
                    operation: "add a module",
                    state: self.state,
                })
            }
        }
        debug!("Added engine module '{}'", module.name());
        self.modules.push(module);
        Ok(())
    }

    /// Initialize graphics, modules and the scene
    pub fn init(&mut self) -> Result<(), EngineError> {
        self.expect_state(EngineState::Created, "initialize")?;
        info!("Initializing engine...");

        let window = &self.config.window;
        self.graphics
            .init(window.width, window.height)
            .map_err(|e| EngineError::InitializationFailed(format!("Graphics context: {e}")))?;

        for module in &mut self.modules {
            module
                .init(&mut self.scene, self.root)
                .map_err(|source| EngineError::Module {
                    name: module.name().to_string(),
                    source,
                })?;
        }

        self.scene.init(self.root)?;
        self.state = EngineState::Running;
        self.running = true;
        info!("Engine initialized with {} modules", self.modules.len());
        Ok(())
    }

    /// Produce one frame, returning its delta time
    pub fn frame(&mut self) -> Result<f32, EngineError> {
        self.expect_state(EngineState::Running, "render a frame")?;
        let delta_time = self.timer.tick();

        for module in &mut self.modules {
            module
                .update(&mut self.scene, self.root, delta_time)
                .map_err(|source| EngineError::Module {
                    name: module.name().to_string(),
                    source,
                })?;
        }

        self.scene.update(self.root, delta_time)?;

        self.graphics.begin_frame()?;
        {
            let mut frame = RenderFrame::new(&mut self.dispatch, &mut *self.graphics);
            self.scene.render(self.root, &mut frame)?;
        }
        self.dispatch.render_frame(&self.scene, &mut *self.graphics)?;
        self.graphics.present()?;

        Ok(delta_time)
    }

    /// Resize the graphics surface
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.expect_state(EngineState::Running, "resize")?;
        self.graphics.resize(width, height)?;
        self.config.window.width = width;
        self.config.window.height = height;
        debug!("Resized to {width}x{height}");
        Ok(())
    }

    /// Tear everything down
    ///
    /// Idempotent. Every stage runs even if an earlier one failed; the first
    /// failure is returned.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        if self.state == EngineState::ShutDown {
            return Ok(());
        }
        info!("Shutting down engine...");
        let was_running = self.state == EngineState::Running;
        self.state = EngineState::ShutDown;
        self.running = false;

        let mut first_error: Option<EngineError> = None;

        if matches!(self.scene.lifecycle(self.root), Ok(Lifecycle::Initialized)) {
            if let Err(err) = self.scene.destroy(self.root) {
                warn!("Scene teardown failed: {err}");
                first_error = first_error.or(Some(err.into()));
            }
        }

        for module in self.modules.iter_mut().rev() {
            module.shutdown();
            debug!("Module '{}' shut down", module.name());
        }

        if let Err(err) = self.dispatch.destroy(&mut *self.graphics) {
            warn!("Render dispatch teardown failed: {err}");
            first_error = first_error.or(Some(err.into()));
        }

        if was_running {
            if let Err(err) = self.graphics.destroy() {
                warn!("Graphics teardown failed: {err}");
                first_error = first_error.or(Some(err.into()));
            }
        }

        info!("Engine shutdown complete");
        first_error.map_or(Ok(()), Err)
    }

    /// Drive `app` until it quits or `max_frames` frames were produced
    ///
    /// Initializes the engine if needed and always shuts it down before
    /// returning.
    pub fn run<A: Application>(&mut self, app: &mut A, max_frames: Option<u64>) -> Result<(), EngineError> {
        let result = self.run_loop(app, max_frames);
        app.cleanup(self);
        let shutdown = self.shutdown();
        result.and(shutdown)
    }

    fn run_loop<A: Application>(&mut self, app: &mut A, max_frames: Option<u64>) -> Result<(), EngineError> {
        if self.state == EngineState::Created {
            self.init()?;
        }
        app.initialize(self)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        info!("Starting main loop...");
        let mut frames = 0;
        while self.running && max_frames.map_or(true, |max| frames < max) {
            let delta_time = self.timer.delta_time();
            app.update(self, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;
            if !self.running {
                break;
            }
            self.frame()?;
            frames += 1;
        }
        debug!("Main loop finished after {frames} frames");
        Ok(())
    }

    /// Request the main loop to stop after the current frame
    pub fn quit(&mut self) {
        info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Spawn an entity as the last child of the root container
    pub fn spawn(&mut self, behavior: impl EntityBehavior) -> SceneResult<EntityId> {
        let id = self.scene.spawn(behavior);
        self.scene.add_child(self.root, id)?;
        Ok(id)
    }

    /// Root container entity
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Render dispatch
    pub fn dispatch(&self) -> &RenderDispatch {
        &self.dispatch
    }

    /// Graphics context
    pub fn graphics(&self) -> &dyn GraphicsContext {
        self.graphics.as_ref()
    }

    /// Graphics context as its concrete type
    pub fn graphics_as<T: GraphicsContext>(&self) -> Option<&T> {
        self.graphics.as_ref().as_any().downcast_ref::<T>()
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Frames produced so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }

    /// Names of the registered modules in order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name()).collect()
    }
}
