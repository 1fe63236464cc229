//! The animation primitive the engine consumes from its host.
//!
//! Anything able to run keyframes against a node with play/pause/seek,
//! playback rate control and a completion signal satisfies the contract.
//! Completion is polled once per frame rather than delivered through a
//! callback, which keeps the engine free of re-entrant borrows.

use serde::{Deserialize, Serialize};

use super::keyframes::{AnimationOptions, KeyframeSet};

/// Playback state of a host animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    /// Not attached to a timeline (never played or canceled).
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

/// Outcome of a host animation's completion notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    #[default]
    Pending,
    Finished,
    /// Settled through `cancel()`. Consumers treat this as a no-op path.
    Canceled,
}

impl Completion {
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A running keyframe animation owned by the engine.
pub trait AnimationHandle {
    fn play(&mut self);
    fn pause(&mut self);
    /// Drop the effect and settle the completion as canceled.
    fn cancel(&mut self);
    /// Jump to the end in the current playback direction and settle the
    /// completion as finished.
    fn finish(&mut self);

    /// Current time in milliseconds, including delay.
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, time_ms: f64);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn play_state(&self) -> PlayState;

    /// Poll the completion notification. Running animations that crossed
    /// their boundary since the last poll settle here.
    fn poll_completion(&mut self) -> Completion;

    /// Write the current effect values into the target's own style so they
    /// survive removal of the animation.
    fn commit_styles(&mut self);

    fn options(&self) -> &AnimationOptions;

    fn is_playing(&self) -> bool {
        self.play_state() == PlayState::Running
    }
}

/// Boxed handle as stored by the timeline and the ghost compositor.
pub type BoxedAnimation = Box<dyn AnimationHandle>;

/// Something keyframes can be run against.
pub trait Animatable {
    fn animate(&self, keyframes: &KeyframeSet, options: AnimationOptions) -> BoxedAnimation;
}
