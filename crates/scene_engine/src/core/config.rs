//! # Engine Configuration
//!
//! All configuration structures for the engine context live here. Each
//! section is a plain serde struct with defaults and builder-style setters, and
//! [`EngineConfig`] ties them together and implements [`Config`] so it can be
//! read from TOML or RON.
//!
//! ## Sections
//!
//! - **Window**: initial surface size handed to the graphics context
//! - **Scene**: traversal guards and swept-entity storage policy
//! - **Logging**: default level and per-module filters
//! - **Frame**: fixed or wall-clock frame timing

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// Window and surface settings passed to `GraphicsContext::init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial surface width in pixels
    pub width: u32,
    /// Initial surface height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scene Engine".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Scene graph behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Maximum nesting depth accepted by `add_child`
    pub max_depth: usize,
    /// Free arena storage of entities removed by the dead-child sweep
    ///
    /// When disabled, swept entities stay addressable (destroyed and
    /// detached) until `Scene::despawn` is called.
    pub release_swept_entities: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            release_swept_entities: true,
        }
    }
}

/// Logger setup consumed by `foundation::logging::init_with_config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Per-module overrides, e.g. `("scene_engine::render", "trace")`
    pub modules: Vec<(String, String)>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            modules: Vec::new(),
        }
    }
}

impl LoggingConfig {
    /// Render as an `env_logger` filter string
    pub fn filter_string(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(self.modules.iter().map(|(module, level)| format!("{module}={level}")))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Frame timing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Fixed delta time in seconds; `None` uses the wall clock
    pub fixed_delta: Option<f32>,
}

/// # Engine Configuration
///
/// Top-level configuration for an `Engine` context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window and surface settings
    pub window: WindowConfig,
    /// Scene graph behavior
    pub scene: SceneConfig,
    /// Logger setup
    pub logging: LoggingConfig,
    /// Frame timing
    pub frame: FrameConfig,
}

impl EngineConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Set the initial surface size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the default log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Use a fixed delta time per frame
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.frame.fixed_delta = Some(delta);
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.scene.max_depth = depth;
        self
    }

    /// Keep swept entities addressable until despawned
    pub fn with_retained_swept_entities(mut self) -> Self {
        self.scene.release_swept_entities = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        if self.scene.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".to_string()));
        }

        if let Some(delta) = self.frame.fixed_delta {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "fixed_delta must be a positive number of seconds, got {delta}"
                )));
            }
        }

        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(EngineConfig::new().with_size(0, 10).validate().is_err());
        assert!(EngineConfig::new().with_fixed_delta(-1.0).validate().is_err());
        assert!(EngineConfig::new().with_max_depth(0).validate().is_err());
        assert!(EngineConfig::new().with_log_level("loud").validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::new()
            .with_title("round trip")
            .with_size(640, 480)
            .with_fixed_delta(0.5);

        let text = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = EngineConfig::new().with_retained_swept_entities();
        config.logging.modules.push(("scene_engine::render".to_string(), "trace".to_string()));

        let text = config.to_ron_string().unwrap();
        let parsed = EngineConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = EngineConfig::from_toml_str("[window]\nwidth = 320\n").unwrap();
        assert_eq!(parsed.window.width, 320);
        assert_eq!(parsed.window.height, WindowConfig::default().height);
        assert!(parsed.scene.release_swept_entities);
    }

    #[test]
    fn test_filter_string() {
        let mut logging = LoggingConfig::default();
        logging.modules.push(("scene_engine::scene".to_string(), "debug".to_string()));
        assert_eq!(logging.filter_string(), "info,scene_engine::scene=debug");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = EngineConfig::load_from_file("engine.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
