//! Paired exit/enter animation of whole screens.
//!
//! The [`Timeline`] owns the exit animation of the outgoing screen and the
//! enter animation of the incoming one. Both are created together, share one
//! playback rate and are always seeked to the same time, so progress in the
//! [0, 100] domain means the same thing for both. They are stored as a single
//! `Option` of a pair: the timeline never holds one without the other.
//!
//! Completion is observed on [`Timeline::on_frame`] (or forced by
//! [`Timeline::finish`]) and reported exactly once per start.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::animation::{
    Animatable, AnimationHandle, BoxedAnimation, Completion, EasingFunction, ResolvedAnimation,
};

/// Lower bound for the duration used to map progress to time.
const MIN_DURATION_MS: f64 = 1.0;

/// Coarse playback state of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineState {
    /// No animations attached.
    Idle,
    Running,
    Paused,
}

/// How a timeline run starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineOptions {
    pub duration_ms: f64,
    pub playback_rate: f64,
    /// Gesture-driven runs start at the end (progress 100) and use linear
    /// easing by default.
    pub gesture: bool,
    /// Start playing immediately. Gesture runs start paused.
    pub play: bool,
}

impl TimelineOptions {
    pub fn programmatic(duration_ms: f64) -> Self {
        Self { duration_ms, playback_rate: 1.0, gesture: false, play: true }
    }

    pub fn gesture(duration_ms: f64) -> Self {
        Self { duration_ms, playback_rate: 1.0, gesture: true, play: false }
    }
}

/// Default easing for screen animations.
pub fn default_easing(gesture: bool) -> EasingFunction {
    if gesture {
        EasingFunction::Linear
    } else {
        EasingFunction::EaseOut
    }
}

/// Reported once when a run completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEnd {
    pub playback_rate: f64,
    pub gesture: bool,
    pub progress: f64,
}

impl TimelineEnd {
    /// A gesture run that played back toward the start of the
    /// back-navigation, i.e. the swipe was reverted.
    pub fn reverted(&self) -> bool {
        self.gesture && self.playback_rate > 0.0
    }
}

type EndCallback = Box<dyn FnOnce(&TimelineEnd)>;

struct ScreenAnimations {
    exit: BoxedAnimation,
    enter: BoxedAnimation,
}

impl ScreenAnimations {
    fn each(&mut self, mut f: impl FnMut(&mut BoxedAnimation)) {
        f(&mut self.exit);
        f(&mut self.enter);
    }
}

/// The whole-screen animation pair.
pub struct Timeline {
    animations: Option<ScreenAnimations>,
    duration_ms: f64,
    playback_rate: f64,
    gesture: bool,
    progress: f64,
    on_end: Option<EndCallback>,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("state", &self.state())
            .field("duration_ms", &self.duration_ms)
            .field("playback_rate", &self.playback_rate)
            .field("gesture", &self.gesture)
            .field("progress", &self.progress)
            .finish()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            animations: None,
            duration_ms: MIN_DURATION_MS,
            playback_rate: 1.0,
            gesture: false,
            progress: 0.0,
            on_end: None,
        }
    }

    /// Create both animations and start the run. A run still in flight is
    /// finished first; its end report is returned.
    pub fn start(
        &mut self,
        exit_target: &dyn Animatable,
        exit: &ResolvedAnimation,
        enter_target: &dyn Animatable,
        enter: &ResolvedAnimation,
        options: TimelineOptions,
    ) -> Option<TimelineEnd> {
        let previous = self.finish();

        self.duration_ms = if options.duration_ms > 0.0 { options.duration_ms } else { MIN_DURATION_MS };
        self.playback_rate = options.playback_rate;
        self.gesture = options.gesture;

        let mut animations = ScreenAnimations {
            exit: exit_target.animate(&exit.keyframes, exit.options),
            enter: enter_target.animate(&enter.keyframes, enter.options),
        };
        let rate = self.playback_rate;
        let duration = self.duration_ms;
        animations.each(|a| a.set_playback_rate(rate));
        if options.gesture {
            animations.each(|a| a.set_current_time(duration));
        }
        if !options.play {
            animations.each(|a| a.pause());
        }

        self.progress = progress_of(animations.exit.current_time(), self.duration_ms);
        self.animations = Some(animations);
        debug!(
            duration_ms = self.duration_ms,
            rate = self.playback_rate,
            gesture = self.gesture,
            play = options.play,
            "timeline started"
        );
        previous
    }

    /// Register the completion callback for the current run. Replaces any
    /// callback not yet fired.
    pub fn set_on_end(&mut self, on_end: impl FnOnce(&TimelineEnd) + 'static) {
        self.on_end = Some(Box::new(on_end));
    }

    pub fn state(&self) -> TimelineState {
        match &self.animations {
            None => TimelineState::Idle,
            Some(a) if a.exit.is_playing() => TimelineState::Running,
            Some(_) => TimelineState::Paused,
        }
    }

    pub fn is_active(&self) -> bool {
        self.animations.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.state() == TimelineState::Running
    }

    pub fn is_gesture(&self) -> bool {
        self.gesture
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    /// Seek both animations to `progress / 100 * duration`. Refused while
    /// the timeline plays freely.
    pub fn set_progress(&mut self, progress: f64) -> bool {
        if self.is_playing() {
            warn!(progress, "seek refused while the timeline is playing");
            return false;
        }
        self.progress = progress.clamp(0.0, 100.0);
        let time = self.progress / 100.0 * self.duration_ms;
        if let Some(animations) = self.animations.as_mut() {
            animations.each(|a| a.set_current_time(time));
        }
        trace!(progress = self.progress, "timeline seek");
        true
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
        if let Some(animations) = self.animations.as_mut() {
            animations.each(|a| a.set_playback_rate(rate));
        }
    }

    pub fn play(&mut self) {
        if let Some(animations) = self.animations.as_mut() {
            animations.each(|a| a.play());
        }
    }

    pub fn pause(&mut self) {
        if let Some(animations) = self.animations.as_mut() {
            animations.each(|a| a.pause());
        }
        self.sync_progress();
    }

    /// Observe playback. Returns the end report on the frame the run
    /// completes.
    pub fn on_frame(&mut self) -> Option<TimelineEnd> {
        let animations = self.animations.as_mut()?;
        let exit = animations.exit.poll_completion();
        let enter = animations.enter.poll_completion();
        self.sync_progress();

        match (exit, enter) {
            (Completion::Pending, _) | (_, Completion::Pending) => None,
            (Completion::Canceled, Completion::Canceled) => {
                debug!("timeline animations canceled by the host");
                self.detach();
                None
            }
            _ => self.settle(),
        }
    }

    /// Jump both animations to their end and report completion now. No-op
    /// when idle.
    pub fn finish(&mut self) -> Option<TimelineEnd> {
        let animations = self.animations.as_mut()?;
        animations.each(|a| a.finish());
        self.settle()
    }

    /// Drop both animations without committing them. The end callback is
    /// discarded.
    pub fn cancel(&mut self) -> bool {
        let Some(mut animations) = self.animations.take() else {
            return false;
        };
        animations.each(|a| a.cancel());
        self.on_end = None;
        self.reset();
        debug!("timeline canceled");
        true
    }

    fn sync_progress(&mut self) {
        if let Some(animations) = &self.animations {
            self.progress = progress_of(animations.exit.current_time(), self.duration_ms);
        }
    }

    fn settle(&mut self) -> Option<TimelineEnd> {
        let mut animations = self.animations.take()?;
        self.progress = progress_of(animations.exit.current_time(), self.duration_ms);
        animations.each(|a| {
            a.commit_styles();
            a.cancel();
        });

        let end = TimelineEnd {
            playback_rate: self.playback_rate,
            gesture: self.gesture,
            progress: self.progress,
        };
        debug!(rate = end.playback_rate, gesture = end.gesture, progress = end.progress, "timeline finished");
        if let Some(on_end) = self.on_end.take() {
            on_end(&end);
        }
        self.playback_rate = 1.0;
        self.gesture = false;
        Some(end)
    }

    fn detach(&mut self) {
        self.animations = None;
        self.on_end = None;
        self.reset();
    }

    fn reset(&mut self) {
        self.progress = 0.0;
        self.playback_rate = 1.0;
        self.gesture = false;
    }
}

fn progress_of(time_ms: f64, duration_ms: f64) -> f64 {
    (time_ms / duration_ms * 100.0).clamp(0.0, 100.0)
}
