//! A software implementation of the host animation primitive.
//!
//! All animations created from one [`SoftwareClock`] share its time source,
//! so advancing the clock moves every running animation at once, the same
//! way a document timeline does. The current time of an animation is either
//! a held value (paused, finished, or seeked while not running) or derived
//! from its start time and playback rate.
//!
//! Effects are rendered into a [`StyleCell`]: each running animation owns one
//! effect layer keyed by its [`AnimationId`], layered over the base style.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::host::{Animatable, AnimationHandle, BoxedAnimation, Completion, PlayState};
use super::keyframes::{AnimatedValue, AnimationOptions, KeyframeSet};

/// Unique identifier for an animation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

impl AnimationId {
    /// Generate a new unique animation ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared monotonic clock in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct SoftwareClock(Rc<Cell<f64>>);

impl SoftwareClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.0.get()
    }

    pub fn advance(&self, delta_ms: f64) {
        self.0.set(self.0.get() + delta_ms.max(0.0));
    }
}

/// Base style plus the effect layers of the animations targeting a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedStyle {
    pub base: BTreeMap<String, AnimatedValue>,
    effects: BTreeMap<AnimationId, BTreeMap<String, AnimatedValue>>,
}

impl RenderedStyle {
    /// Effective value: the newest effect layer that sets the property wins,
    /// otherwise the base style.
    pub fn value(&self, property: &str) -> Option<&AnimatedValue> {
        self.effects
            .values()
            .rev()
            .find_map(|layer| layer.get(property))
            .or_else(|| self.base.get(property))
    }

    /// Numeric effective value, if any.
    pub fn number(&self, property: &str) -> Option<f64> {
        self.value(property).and_then(AnimatedValue::as_f64)
    }

    pub fn active_effects(&self) -> usize {
        self.effects.len()
    }
}

pub type StyleCell = Rc<RefCell<RenderedStyle>>;

/// Keyframe animation running against a [`StyleCell`].
#[derive(Debug)]
pub struct SoftwareAnimation {
    id: AnimationId,
    clock: SoftwareClock,
    keyframes: KeyframeSet,
    options: AnimationOptions,
    start_time: Option<f64>,
    hold_time: Option<f64>,
    rate: f64,
    state: PlayState,
    completion: Completion,
    target: StyleCell,
}

impl SoftwareAnimation {
    /// Create an animation and start playing it from time zero.
    pub fn start(
        clock: SoftwareClock,
        target: StyleCell,
        keyframes: KeyframeSet,
        options: AnimationOptions,
    ) -> Self {
        let mut animation = Self {
            id: AnimationId::new(),
            clock,
            keyframes,
            options,
            start_time: None,
            hold_time: Some(0.0),
            rate: 1.0,
            state: PlayState::Idle,
            completion: Completion::Pending,
            target,
        };
        animation.play();
        animation
    }

    pub fn id(&self) -> AnimationId {
        self.id
    }

    fn end_time(&self) -> f64 {
        self.options.end_time()
    }

    fn raw_time(&self) -> f64 {
        match (self.hold_time, self.start_time) {
            (Some(hold), _) => hold,
            (None, Some(start)) => (self.clock.now() - start) * self.rate,
            (None, None) => 0.0,
        }
    }

    /// Latch into the finished state once a running animation crosses the
    /// boundary in its playback direction.
    fn update_finished(&mut self) {
        if self.state != PlayState::Running || self.rate == 0.0 {
            return;
        }
        let time = self.raw_time();
        let boundary = if self.rate > 0.0 && time >= self.end_time() {
            Some(self.end_time())
        } else if self.rate < 0.0 && time <= 0.0 {
            Some(0.0)
        } else {
            None
        };
        if let Some(boundary) = boundary {
            trace!(id = self.id.0, boundary, "software animation finished");
            self.hold_time = Some(boundary);
            self.start_time = None;
            self.state = PlayState::Finished;
            if self.completion == Completion::Pending {
                self.completion = Completion::Finished;
            }
        }
    }

    /// Leaving the finished or idle state renews the completion notification.
    fn renew_completion(&mut self) {
        if matches!(self.state, PlayState::Finished | PlayState::Idle) {
            self.completion = Completion::Pending;
        }
    }

    /// Iteration progress at the current time, honoring delay and fill.
    fn iteration_progress(&self) -> Option<f64> {
        let local = self.current_time() - self.options.delay_ms;
        let duration = self.options.duration_ms;
        if local < 0.0 {
            return self.options.fill.applies_backwards().then_some(0.0);
        }
        if local >= duration {
            return self.options.fill.applies_forwards().then_some(1.0);
        }
        Some(local / duration)
    }

    fn sample(&self) -> Option<BTreeMap<String, AnimatedValue>> {
        let progress = self.iteration_progress()?;
        Some(self.keyframes.sample(self.options.easing.evaluate(progress)))
    }

    fn render(&self) {
        let mut style = self.target.borrow_mut();
        match (self.state, self.sample()) {
            (PlayState::Idle, _) | (_, None) => {
                style.effects.remove(&self.id);
            }
            (_, Some(values)) => {
                style.effects.insert(self.id, values);
            }
        }
    }
}

impl AnimationHandle for SoftwareAnimation {
    fn play(&mut self) {
        let mut time = self.raw_time();
        if self.rate > 0.0 && (time >= self.end_time() || time < 0.0) {
            time = 0.0;
        } else if self.rate < 0.0 && (time <= 0.0 || time > self.end_time()) {
            time = self.end_time();
        }
        self.renew_completion();
        if self.rate == 0.0 {
            self.hold_time = Some(time);
            self.start_time = None;
        } else {
            self.hold_time = None;
            self.start_time = Some(self.clock.now() - time / self.rate);
        }
        self.state = PlayState::Running;
        self.render();
    }

    fn pause(&mut self) {
        self.update_finished();
        let time = match self.state {
            PlayState::Idle if self.rate < 0.0 => self.end_time(),
            PlayState::Idle => 0.0,
            _ => self.raw_time(),
        };
        self.renew_completion();
        self.hold_time = Some(time);
        self.start_time = None;
        self.state = PlayState::Paused;
        self.render();
    }

    fn cancel(&mut self) {
        if self.completion == Completion::Pending {
            self.completion = Completion::Canceled;
        }
        self.state = PlayState::Idle;
        self.hold_time = None;
        self.start_time = None;
        self.render();
    }

    fn finish(&mut self) {
        let boundary = if self.rate < 0.0 { 0.0 } else { self.end_time() };
        self.hold_time = Some(boundary);
        self.start_time = None;
        self.state = PlayState::Finished;
        if self.completion == Completion::Pending {
            self.completion = Completion::Finished;
        }
        self.render();
    }

    fn current_time(&self) -> f64 {
        let time = self.raw_time();
        if self.state == PlayState::Running {
            time.clamp(0.0, self.end_time())
        } else {
            time
        }
    }

    fn set_current_time(&mut self, time_ms: f64) {
        if self.state == PlayState::Running && self.rate != 0.0 {
            self.start_time = Some(self.clock.now() - time_ms / self.rate);
            self.hold_time = None;
        } else {
            self.renew_completion();
            self.hold_time = Some(time_ms);
            self.start_time = None;
            if self.state != PlayState::Running {
                self.state = PlayState::Paused;
            }
        }
        self.render();
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        let time = self.raw_time();
        self.rate = rate;
        if self.state == PlayState::Running {
            if rate == 0.0 {
                self.hold_time = Some(time);
                self.start_time = None;
            } else {
                self.hold_time = None;
                self.start_time = Some(self.clock.now() - time / rate);
            }
        }
    }

    fn play_state(&self) -> PlayState {
        self.state
    }

    fn poll_completion(&mut self) -> Completion {
        self.update_finished();
        self.render();
        self.completion
    }

    fn commit_styles(&mut self) {
        if let Some(values) = self.sample() {
            self.target.borrow_mut().base.extend(values);
        }
    }

    fn options(&self) -> &AnimationOptions {
        &self.options
    }
}

impl Drop for SoftwareAnimation {
    fn drop(&mut self) {
        self.target.borrow_mut().effects.remove(&self.id);
    }
}

/// A node the software host can animate.
#[derive(Debug, Clone, Default)]
pub struct SoftwareTarget {
    pub clock: SoftwareClock,
    pub style: StyleCell,
}

impl SoftwareTarget {
    pub fn new(clock: SoftwareClock) -> Self {
        Self { clock, style: StyleCell::default() }
    }
}

impl Animatable for SoftwareTarget {
    fn animate(&self, keyframes: &KeyframeSet, options: AnimationOptions) -> BoxedAnimation {
        Box::new(SoftwareAnimation::start(
            self.clock.clone(),
            Rc::clone(&self.style),
            keyframes.clone(),
            options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::keyframes::{Keyframe, OPACITY};

    fn fade(clock: &SoftwareClock) -> (SoftwareAnimation, StyleCell) {
        let style = StyleCell::default();
        let keyframes = KeyframeSet::new(vec![Keyframe::new().opacity(0.0), Keyframe::new().opacity(1.0)]);
        let animation = SoftwareAnimation::start(
            clock.clone(),
            Rc::clone(&style),
            keyframes,
            AnimationOptions::new(100.0),
        );
        (animation, style)
    }

    #[test]
    fn test_runs_with_clock() {
        let clock = SoftwareClock::new();
        let (mut animation, style) = fade(&clock);
        clock.advance(50.0);
        assert_eq!(animation.poll_completion(), Completion::Pending);
        assert_eq!(animation.current_time(), 50.0);
        assert_eq!(style.borrow().number(OPACITY), Some(0.5));

        clock.advance(60.0);
        assert_eq!(animation.poll_completion(), Completion::Finished);
        assert_eq!(animation.play_state(), PlayState::Finished);
        assert_eq!(animation.current_time(), 100.0);
    }

    #[test]
    fn test_negative_rate_finishes_at_zero() {
        let clock = SoftwareClock::new();
        let (mut animation, _style) = fade(&clock);
        animation.pause();
        animation.set_current_time(80.0);
        animation.set_playback_rate(-2.0);
        animation.play();
        clock.advance(20.0);
        assert_eq!(animation.poll_completion(), Completion::Pending);
        assert_eq!(animation.current_time(), 40.0);
        clock.advance(30.0);
        assert_eq!(animation.poll_completion(), Completion::Finished);
        assert_eq!(animation.current_time(), 0.0);
    }

    #[test]
    fn test_paused_animation_ignores_clock() {
        let clock = SoftwareClock::new();
        let (mut animation, _style) = fade(&clock);
        animation.pause();
        animation.set_current_time(30.0);
        clock.advance(500.0);
        assert_eq!(animation.poll_completion(), Completion::Pending);
        assert_eq!(animation.current_time(), 30.0);
    }

    #[test]
    fn test_cancel_removes_effect() {
        let clock = SoftwareClock::new();
        let (mut animation, style) = fade(&clock);
        clock.advance(10.0);
        animation.poll_completion();
        assert_eq!(style.borrow().active_effects(), 1);
        animation.cancel();
        assert_eq!(animation.poll_completion(), Completion::Canceled);
        assert_eq!(style.borrow().active_effects(), 0);
        assert_eq!(style.borrow().value(OPACITY), None);
    }

    #[test]
    fn test_finish_then_commit_keeps_final_value() {
        let clock = SoftwareClock::new();
        let (mut animation, style) = fade(&clock);
        animation.finish();
        animation.finish();
        assert_eq!(animation.poll_completion(), Completion::Finished);
        animation.commit_styles();
        animation.cancel();
        // Finished completion is not rewritten by a later cancel.
        assert_eq!(animation.poll_completion(), Completion::Finished);
        assert_eq!(style.borrow().number(OPACITY), Some(1.0));
    }

    #[test]
    fn test_play_after_finish_restarts() {
        let clock = SoftwareClock::new();
        let (mut animation, _style) = fade(&clock);
        animation.finish();
        animation.play();
        assert_eq!(animation.poll_completion(), Completion::Pending);
        assert_eq!(animation.current_time(), 0.0);
    }
}
