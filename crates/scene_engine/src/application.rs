//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::render::RenderError;
use crate::scene::SceneError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to build a program on top of the engine and hand it
/// to [`Engine::run`].
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is initialized. Use this to populate the
    /// scene under [`Engine::root`] and register modules.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the engine produces it. Call
    /// [`Engine::quit`] to stop the loop.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        let _ = (engine, delta_time);
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once after the main loop ends, before the engine shuts down.
    fn cleanup(&mut self, engine: &mut Engine) {
        let _ = engine;
    }
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Render dispatch error
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
