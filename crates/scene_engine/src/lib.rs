//! # Scene Engine
//!
//! The entity/scene-graph core of a small real-time rendering engine.
//!
//! ## Features
//!
//! - **Scene tree**: arena-backed entities with per-entity property bits
//! - **Lifecycle**: `init` / `update` / `render` / `destroy` with dead-child sweeping
//! - **Actions**: transient per-entity behaviors that finish on their own
//! - **Render dispatch**: one protocol per rendered entity type, FIFO per frame
//! - **Engine context**: explicit module and graphics lifecycle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.spawn(Image::new("logo", 64.0, 64.0))?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default().with_fixed_delta(1.0 / 60.0);
//!     let mut engine = Engine::create(config, Box::new(HeadlessGraphics::new()))?;
//!     engine.run(&mut MyApp, Some(60))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError, EngineModule, EngineState};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{Config, EngineConfig},
        foundation::{
            bits::{Bits16, Bits8, PropertyBits},
            math::{Mat4, Transform, Vec2, Vec3},
            time::Timer,
        },
        render::{
            GraphicsContext, HeadlessGraphics, Image, RenderFrame, RenderProtocol, Renderable,
        },
        scene::{
            actions::{Lifetime, MoveBy, Repeat, RotateBy},
            Action, ActionStatus, EntityBehavior, EntityCore, EntityId, Property, Scene,
            SceneError, SceneResult,
        },
        AppError, Application, Engine, EngineError, EngineModule,
    };
}
