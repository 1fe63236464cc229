//! Glide: screen transitions, shared element morphs and back-swipe
//! navigation.
//!
//! Re-exports the engine and its configuration loader.

pub use glide_config as config;
pub use glide_motion as motion;

pub use glide_config::GlideConfig;
pub use glide_motion::{GlideError, NavigationEngine, Result};
