//! Glide configuration system
//!
//! Loads engine settings from `glide.toml`, with environment variables
//! taking precedence over the file.

use std::path::{Path, PathBuf};

use glide_motion::animation::{AnimationDescriptor, AnimationPair};
use glide_motion::gesture::{GestureConfig, SwipeDirection};
use glide_motion::navigator::{DEFAULT_DURATION_MS, EngineConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "glide.toml";

/// Errors from loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlideConfig {
    /// Back-swipe thresholds
    pub gesture: GestureConfig,
    /// Screen transition defaults
    pub animation: AnimationSection,
    pub diagnostics: DiagnosticsConfig,
}

/// Screen transition defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSection {
    pub duration_ms: f64,
    /// Preset used to enter screens without their own animation
    pub default_enter: String,
    /// Preset used to leave screens without their own animation
    pub default_exit: String,
    /// Route going back lands on once the history runs out
    pub default_route: Option<String>,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            default_enter: "none".to_string(),
            default_exit: "none".to_string(),
            default_route: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Filter directive handed to the logger, e.g. `glide_motion=debug`
    pub log_filter: Option<String>,
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl GlideConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `glide.toml` from the current directory, or defaults if it is
    /// missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Unparseable values are ignored.
    pub fn merge_with_env(&mut self) {
        // Gesture settings
        if let Ok(val) = std::env::var("GLIDE_SWIPE_DIRECTION") {
            if let Ok(direction) = val.parse::<SwipeDirection>() {
                self.gesture.swipe_direction = direction;
            }
        }
        if let Ok(val) = std::env::var("GLIDE_SWIPE_AREA_WIDTH") {
            if let Ok(width) = val.parse::<f64>() {
                self.gesture.swipe_area_width = width;
            }
        }
        if let Ok(val) = std::env::var("GLIDE_HYSTERESIS") {
            if let Ok(hysteresis) = val.parse::<f64>() {
                self.gesture.hysteresis = hysteresis;
            }
        }
        if let Ok(val) = std::env::var("GLIDE_MIN_FLING_VELOCITY") {
            if let Ok(velocity) = val.parse::<f64>() {
                self.gesture.min_fling_velocity = velocity;
            }
        }
        if let Ok(val) = std::env::var("GLIDE_DISABLE_DISCOVERY") {
            self.gesture.disable_discovery = parse_flag(&val);
        }

        // Animation settings
        if let Ok(val) = std::env::var("GLIDE_DURATION_MS") {
            if let Ok(duration) = val.parse::<f64>() {
                self.animation.duration_ms = duration;
            }
        }

        if let Ok(filter) = std::env::var("GLIDE_LOG") {
            self.diagnostics.log_filter = Some(filter);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from glide.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Engine settings described by this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            gesture: self.gesture,
            duration_ms: self.animation.duration_ms,
            default_animation: AnimationPair::new(
                AnimationDescriptor::preset(self.animation.default_enter.as_str()),
                AnimationDescriptor::preset(self.animation.default_exit.as_str()),
            ),
            default_route: self.animation.default_route.clone(),
        }
    }
}
