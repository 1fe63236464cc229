//! Error types for the transition engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, GlideError>;

/// Errors surfaced by the transition engine.
///
/// Only programmer errors and unrecoverable lookups are returned to callers.
/// Animation faults (a vanished shared element, an interrupted transition)
/// are recovered inside the engine and logged instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlideError {
    /// A shared element id was registered twice on the same scene.
    #[error("duplicate shared element id `{id}` in scene `{scene}`")]
    DuplicateId { scene: String, id: String },

    /// A matched pair lost one of its nodes before its animation started.
    #[error("shared element `{0}` has no attached node")]
    MissingEndpoint(String),

    /// No mounted screen is registered for the route.
    #[error("no screen registered for route `{0}`")]
    UnknownScreen(String),

    /// Two screens were registered under the same name.
    #[error("screen `{0}` is already registered")]
    DuplicateScreen(String),

    /// A preset animation name that the preset table does not know.
    #[error("unknown animation preset `{0}`")]
    UnknownPreset(String),

    /// An easing string that could not be parsed.
    #[error("invalid easing function `{0}`")]
    InvalidEasing(String),

    /// Back navigation was requested with nothing to go back to.
    #[error("no previous route to go back to")]
    NoPreviousRoute,
}
