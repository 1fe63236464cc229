//! Glide motion engine
//!
//! Screen transitions for single-window applications: paired exit/enter
//! animations of whole screens, shared element morphs through a transient
//! overlay, and an interactive back-swipe that scrubs the transition in
//! progress.
//!
//! The engine is single-threaded and frame driven. The host supplies the
//! animation primitive ([`animation::Animatable`]) and the surfaces
//! ([`screen::ScreenSurface`], [`ghost::OverlaySurface`],
//! [`scene::ElementNode`]); the [`headless`] module implements all of them
//! in software.

pub mod animation;
pub mod error;
pub mod events;
pub mod gesture;
pub mod ghost;
pub mod headless;
pub mod history;
pub mod matcher;
pub mod navigator;
pub mod scene;
pub mod screen;
pub mod timeline;

pub use error::{GlideError, Result};
pub use events::{EventBus, EventKind, NavigationEvent, Subscription};
pub use gesture::{GestureConfig, GestureRecognizer, Release, SwipeDirection, SwipeEnd, SwipeMove, SwipeStart};
pub use ghost::{GhostCompositor, GhostState};
pub use history::History;
pub use matcher::{TransitionPair, match_scenes};
pub use navigator::{EngineConfig, EnginePhase, NavigationEngine, TransitionKind};
pub use scene::{Rect, Scene, SharedElementConfig, TransitionStyle};
pub use screen::{Screen, ScreenConfig, ScreenHandle};
pub use timeline::{Timeline, TimelineState};
