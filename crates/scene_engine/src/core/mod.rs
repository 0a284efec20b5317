//! # Core Engine Module
//!
//! Shared configuration used by every subsystem of the engine context.

pub mod config;

pub use config::{
    Config,
    ConfigError,
    EngineConfig,
    FrameConfig,
    LoggingConfig,
    SceneConfig,
    WindowConfig,
};
