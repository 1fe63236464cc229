//! Ghost compositor: shared element clones in a transient overlay.
//!
//! For every matched pair the compositor clones the live nodes into the
//! overlay surface, freezes the captured computed style onto the clones,
//! hides the originals and animates the clones between the captured
//! positions. Each pair is animated per axis so horizontal and vertical
//! motion can carry their own timing.
//!
//! ```text
//!   begin ──► Preparing ──(next frame)──► Transitioning ──► Settling ──► Idle
//!     │            │                           │
//!     │            └──(nothing to morph)──► Idle└──cancel──► Canceling ──► Idle
//!     └──(zero duration)──► Idle
//! ```
//!
//! Scenes are only sampled on the frame after `begin`, so an incoming screen
//! may register its shared elements after it was mounted.
//!
//! All per-pair animations live in the same progress domain as the screen
//! timeline: progress `p` seeks every animation to `p / 100` of its end time.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::animation::{
    Animatable, AnimatedValue, AnimationHandle, AnimationOptions, BoxedAnimation, Completion,
    Keyframe, KeyframeSet, TRANSLATE_X, TRANSLATE_Y, Z_INDEX,
};
use crate::error::GlideError;
use crate::matcher::{TransitionPair, match_scenes};
use crate::scene::{
    AxisConfig, AxisTiming, ElementRef, Rect, SceneSnapshot, SharedElementConfig, StyleMap, TransitionStyle,
};

/// State of the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostState {
    #[default]
    Idle,
    /// Waiting for the next frame to sample geometry and clone.
    Preparing,
    Transitioning,
    Settling,
    Canceling,
}

/// What happened on a call to [`GhostCompositor::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostFrame {
    Idle,
    /// Nothing to morph; the transition is a plain screen swap.
    Bypassed,
    /// Clones are in place and animating.
    Started { pairs: usize },
    Running,
    /// All pair animations completed; clones removed.
    Settled,
}

/// A clone living in the overlay.
pub trait GhostNode: Animatable {
    /// Detach the clone from the overlay.
    fn remove(&self);
}

pub type GhostRef = Rc<dyn GhostNode>;

/// The top-layer surface hosting clones during a transition.
pub trait OverlaySurface {
    fn show(&self);
    fn hide(&self);
    fn is_visible(&self) -> bool;
    /// Clone `source` into the overlay with `style` frozen onto it,
    /// absolutely positioned at `rect`.
    fn insert_clone(&self, source: &ElementRef, style: &StyleMap, rect: Rect, z_index: i32) -> GhostRef;
    /// Number of clones currently attached.
    fn clone_count(&self) -> usize;
}

/// Supplies scene geometry for one side of a transition.
pub trait SceneSource {
    /// Sample geometry now.
    fn scene_snapshot(&self) -> SceneSnapshot;
    fn keep_alive(&self) -> bool;
}

/// One shared element transition, as requested by the navigator.
#[derive(Clone)]
pub struct GhostRequest {
    pub start: Rc<dyn SceneSource>,
    pub end: Rc<dyn SceneSource>,
    pub duration_ms: f64,
    /// Gesture-driven transitions start paused at the end and are seeked.
    pub gesture: bool,
}

impl fmt::Debug for GhostRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostRequest")
            .field("duration_ms", &self.duration_ms)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

struct GhostPair {
    id: String,
    start_node: ElementRef,
    end_node: ElementRef,
    clones: Vec<GhostRef>,
    animations: Vec<BoxedAnimation>,
}

impl GhostPair {
    fn restore(&self, show_start: bool) {
        self.end_node.set_hidden(false);
        if show_start {
            self.start_node.set_hidden(false);
        }
        for clone in &self.clones {
            clone.remove();
        }
    }
}

/// Drives shared element clones for one transition at a time.
pub struct GhostCompositor {
    overlay: Rc<dyn OverlaySurface>,
    state: GhostState,
    pending: Option<GhostRequest>,
    pairs: Vec<GhostPair>,
    gesture: bool,
    keep_alive_source: bool,
    playback_rate: f64,
}

impl fmt::Debug for GhostCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostCompositor")
            .field("state", &self.state)
            .field("pairs", &self.pairs.len())
            .field("gesture", &self.gesture)
            .finish()
    }
}

impl GhostCompositor {
    pub fn new(overlay: Rc<dyn OverlaySurface>) -> Self {
        Self {
            overlay,
            state: GhostState::Idle,
            pending: None,
            pairs: Vec::new(),
            gesture: false,
            keep_alive_source: false,
            playback_rate: 1.0,
        }
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn overlay(&self) -> &Rc<dyn OverlaySurface> {
        &self.overlay
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, GhostState::Preparing | GhostState::Transitioning)
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Schedule a transition. A transition in flight is finished first so two
    /// clone sets never share the overlay. Returns `false` when the duration
    /// is zero and the request is bypassed.
    pub fn begin(&mut self, request: GhostRequest) -> bool {
        if self.is_active() {
            debug!(state = ?self.state, "finishing in-flight ghost transition");
            self.finish();
        }
        if request.duration_ms <= 0.0 {
            trace!(duration_ms = request.duration_ms, "ghost transition bypassed");
            return false;
        }
        self.state = GhostState::Preparing;
        self.pending = Some(request);
        true
    }

    /// Advance the compositor by one frame.
    pub fn on_frame(&mut self) -> GhostFrame {
        match self.state {
            GhostState::Preparing => self.prepare(),
            GhostState::Transitioning => {
                let mut settled = true;
                let mut all_canceled = true;
                for animation in self.pairs.iter_mut().flat_map(|p| p.animations.iter_mut()) {
                    match animation.poll_completion() {
                        Completion::Pending => settled = false,
                        Completion::Finished => all_canceled = false,
                        Completion::Canceled => {}
                    }
                }
                if !settled {
                    GhostFrame::Running
                } else if all_canceled {
                    self.cancel();
                    GhostFrame::Idle
                } else {
                    self.settle();
                    GhostFrame::Settled
                }
            }
            _ => GhostFrame::Idle,
        }
    }

    /// Seek every pair animation. Only honored while gesture driven.
    pub fn set_progress(&mut self, progress: f64) -> bool {
        if self.state != GhostState::Transitioning || !self.gesture {
            return false;
        }
        let fraction = progress.clamp(0.0, 100.0) / 100.0;
        for animation in self.animations_mut() {
            let end = animation.options().end_time();
            animation.set_current_time(fraction * end);
        }
        true
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
        for animation in self.animations_mut() {
            animation.set_playback_rate(rate);
        }
    }

    pub fn play(&mut self) {
        for animation in self.animations_mut() {
            animation.play();
        }
    }

    pub fn pause(&mut self) {
        for animation in self.animations_mut() {
            animation.pause();
        }
    }

    /// Complete the transition now. Safe in any state.
    pub fn finish(&mut self) -> bool {
        match self.state {
            GhostState::Preparing => {
                // Nothing was cloned yet.
                self.pending = None;
                self.state = GhostState::Idle;
                true
            }
            GhostState::Transitioning => {
                for animation in self.animations_mut() {
                    animation.finish();
                }
                self.settle();
                true
            }
            _ => false,
        }
    }

    /// Abort the transition and restore every original. Safe in any state.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            GhostState::Preparing => {
                self.pending = None;
                self.state = GhostState::Idle;
                true
            }
            GhostState::Transitioning => {
                self.state = GhostState::Canceling;
                for pair in &mut self.pairs {
                    for animation in &mut pair.animations {
                        animation.cancel();
                    }
                    pair.restore(true);
                }
                debug!(pairs = self.pairs.len(), "ghost transition canceled");
                self.teardown();
                true
            }
            _ => false,
        }
    }

    fn animations_mut(&mut self) -> impl Iterator<Item = &mut BoxedAnimation> {
        self.pairs.iter_mut().flat_map(|p| p.animations.iter_mut())
    }

    fn prepare(&mut self) -> GhostFrame {
        let Some(request) = self.pending.take() else {
            self.state = GhostState::Idle;
            return GhostFrame::Idle;
        };

        let start = request.start.scene_snapshot();
        let end = request.end.scene_snapshot();
        let matched = match_scenes(&start, &end);
        if matched.is_empty() {
            self.state = GhostState::Idle;
            return GhostFrame::Bypassed;
        }

        self.gesture = request.gesture;
        self.keep_alive_source = request.start.keep_alive();
        self.playback_rate = 1.0;
        self.overlay.show();

        for pair in matched {
            match self.clone_pair(&pair, request.duration_ms) {
                Ok(ghost) => self.pairs.push(ghost),
                Err(err) => warn!(id = %pair.id, error = %err, "skipping shared element"),
            }
        }

        if self.pairs.is_empty() {
            self.overlay.hide();
            self.state = GhostState::Idle;
            return GhostFrame::Bypassed;
        }

        if self.gesture {
            for animation in self.animations_mut() {
                let end = animation.options().end_time();
                animation.set_current_time(end);
                animation.pause();
            }
        }

        self.state = GhostState::Transitioning;
        debug!(pairs = self.pairs.len(), gesture = self.gesture, "ghost transition started");
        GhostFrame::Started { pairs: self.pairs.len() }
    }

    fn clone_pair(&self, pair: &TransitionPair, duration_ms: f64) -> Result<GhostPair, GlideError> {
        let start_node = pair
            .start
            .live_node()
            .ok_or_else(|| GlideError::MissingEndpoint(format!("{} in {}", pair.id, pair.start.owner)))?;
        let end_node = pair
            .end
            .live_node()
            .ok_or_else(|| GlideError::MissingEndpoint(format!("{} in {}", pair.id, pair.end.owner)))?;

        let (from, to) = (pair.start.rect, pair.end.rect);
        let config = merge_config(&pair.end.config, &pair.start.config);
        let x = options(config.x_timing(duration_ms));
        let y = options(config.y_timing(duration_ms));

        let start_z = z_index(&pair.start.style);
        let start_clone = self.overlay.insert_clone(&start_node, &pair.start.style, from, start_z);
        let mut clones = vec![Rc::clone(&start_clone)];
        let mut animations = Vec::with_capacity(4);

        let position_x = |with: fn(Keyframe, f64) -> Keyframe, a: f64, b: f64| {
            KeyframeSet::new(vec![
                with(Keyframe::new().set(TRANSLATE_X, AnimatedValue::px(from.x)), a),
                with(Keyframe::new().set(TRANSLATE_X, AnimatedValue::px(to.x)), b),
            ])
        };
        let position_y = || {
            KeyframeSet::new(vec![
                Keyframe::new().set(TRANSLATE_Y, AnimatedValue::px(from.y)),
                Keyframe::new().set(TRANSLATE_Y, AnimatedValue::px(to.y)),
            ])
        };
        let plain = |k: Keyframe, _: f64| k;
        let fading = |k: Keyframe, o: f64| k.opacity(o);

        match pair.style {
            TransitionStyle::Morph => {
                animations.push(start_clone.animate(&position_x(plain, 0.0, 0.0), x));
                let (start_look, end_look) = blended_style(&pair.start.style, &pair.end.style);
                let size = KeyframeSet::new(vec![
                    start_look
                        .set(TRANSLATE_Y, AnimatedValue::px(from.y))
                        .set("width", AnimatedValue::px(from.width))
                        .set("height", AnimatedValue::px(from.height)),
                    end_look
                        .set(TRANSLATE_Y, AnimatedValue::px(to.y))
                        .set("width", AnimatedValue::px(to.width))
                        .set("height", AnimatedValue::px(to.height)),
                ]);
                animations.push(start_clone.animate(&size, y));
            }
            style => {
                let end_z = z_index(&pair.end.style).max(0).min(start_z - 1);
                let end_clone = self.overlay.insert_clone(&end_node, &pair.end.style, from, end_z);
                clones.push(Rc::clone(&end_clone));

                let (start_x, end_x) = match style {
                    TransitionStyle::Fade => (position_x(fading, 1.0, 0.0), position_x(plain, 0.0, 0.0)),
                    TransitionStyle::FadeThrough => (
                        through(position_x(fading, 1.0, 0.0)),
                        through(position_x(fading, 0.0, 1.0)),
                    ),
                    _ => (position_x(fading, 1.0, 0.0), position_x(fading, 0.0, 1.0)),
                };
                animations.push(start_clone.animate(&start_x, x));
                animations.push(start_clone.animate(&position_y(), y));
                animations.push(end_clone.animate(&end_x, x));
                animations.push(end_clone.animate(&position_y(), y));
            }
        }

        start_node.set_hidden(true);
        end_node.set_hidden(true);
        trace!(id = %pair.id, style = ?pair.style, dx = to.x - from.x, dy = to.y - from.y, "pair cloned");

        Ok(GhostPair { id: pair.id.clone(), start_node, end_node, clones, animations })
    }

    fn settle(&mut self) {
        self.state = GhostState::Settling;
        let show_start = !self.keep_alive_source || self.gesture;
        for pair in &self.pairs {
            trace!(id = %pair.id, show_start, "pair settled");
            pair.restore(show_start);
        }
        debug!(pairs = self.pairs.len(), "ghost transition settled");
        self.teardown();
    }

    fn teardown(&mut self) {
        self.pairs.clear();
        self.overlay.hide();
        self.gesture = false;
        self.playback_rate = 1.0;
        self.state = GhostState::Idle;
    }
}

/// End node settings first, start node settings as fallback.
fn merge_config(primary: &SharedElementConfig, fallback: &SharedElementConfig) -> SharedElementConfig {
    let axis = |a: &AxisConfig, b: &AxisConfig| AxisConfig {
        duration_ms: a.duration_ms.or(b.duration_ms),
        delay_ms: a.delay_ms.or(b.delay_ms),
        easing: a.easing.or(b.easing),
    };
    SharedElementConfig {
        transition: primary.transition.or(fallback.transition),
        duration_ms: primary.duration_ms.or(fallback.duration_ms),
        delay_ms: primary.delay_ms.or(fallback.delay_ms),
        easing: primary.easing.or(fallback.easing),
        x: axis(&primary.x, &fallback.x),
        y: axis(&primary.y, &fallback.y),
    }
}

fn options(timing: AxisTiming) -> AnimationOptions {
    AnimationOptions::new(timing.duration_ms)
        .with_delay(timing.delay_ms)
        .with_easing(timing.easing)
}

/// Both clones pass through transparent halfway.
fn through(mut set: KeyframeSet) -> KeyframeSet {
    set.frames.insert(1, Keyframe::at(0.5).opacity(0.0));
    set
}

/// Start and end frames for the numeric properties both styles carry, so a
/// morphing clone takes on the end element's look. Stacking and position are
/// driven separately.
fn blended_style(start: &StyleMap, end: &StyleMap) -> (Keyframe, Keyframe) {
    let mut from = Keyframe::new();
    let mut to = Keyframe::new();
    for (property, start_value) in start {
        if matches!(property.as_str(), Z_INDEX | TRANSLATE_X | TRANSLATE_Y | "width" | "height") {
            continue;
        }
        let Some(end_value) = end.get(property) else {
            continue;
        };
        let (a, b) = (AnimatedValue::parse_css(start_value), AnimatedValue::parse_css(end_value));
        if a.blends_with(&b) {
            from = from.set(property, a);
            to = to.set(property, b);
        }
    }
    (from, to)
}

fn z_index(style: &StyleMap) -> i32 {
    style
        .get(Z_INDEX)
        .and_then(|z| z.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SoftwareClock;
    use crate::headless::{HeadlessElement, HeadlessOverlay, HeadlessSurface};
    use crate::scene::ElementNode;
    use crate::screen::{Screen, ScreenConfig, ScreenHandle};

    struct Fixture {
        clock: SoftwareClock,
        overlay: Rc<HeadlessOverlay>,
        ghost: GhostCompositor,
        a: ScreenHandle,
        b: ScreenHandle,
        a_hero: Rc<HeadlessElement>,
        b_hero: Rc<HeadlessElement>,
    }

    fn screen(clock: &SoftwareClock, name: &str) -> ScreenHandle {
        let surface = HeadlessSurface::new(clock, Rect::new(0.0, 0.0, 400.0, 800.0));
        let screen = Screen::new(name, surface, ScreenConfig::new(format!("/{name}")));
        screen.mount();
        screen
    }

    fn fixture(style: Option<TransitionStyle>) -> Fixture {
        fixture_with(SharedElementConfig { transition: style, ..Default::default() })
    }

    fn fixture_with(config: SharedElementConfig) -> Fixture {
        let clock = SoftwareClock::new();
        let overlay = HeadlessOverlay::new(&clock);
        let ghost = GhostCompositor::new(overlay.clone());
        let a = screen(&clock, "a");
        let b = screen(&clock, "b");
        let a_hero = HeadlessElement::new(&clock, Rect::new(10.0, 20.0, 50.0, 50.0));
        let b_hero = HeadlessElement::new(&clock, Rect::new(100.0, 300.0, 200.0, 200.0));
        a.register_element("0", a_hero.clone(), config).unwrap();
        b.register_element("0", b_hero.clone(), config).unwrap();
        Fixture { clock, overlay, ghost, a, b, a_hero, b_hero }
    }

    fn request(f: &Fixture, gesture: bool) -> GhostRequest {
        GhostRequest { start: f.a.clone(), end: f.b.clone(), duration_ms: 300.0, gesture }
    }

    #[test]
    fn test_morph_settles_and_removes_clones() {
        let mut f = fixture(None);
        assert!(f.ghost.begin(request(&f, false)));
        assert_eq!(f.ghost.state(), GhostState::Preparing);
        assert_eq!(f.overlay.clone_count(), 0);

        assert_eq!(f.ghost.on_frame(), GhostFrame::Started { pairs: 1 });
        assert_eq!(f.ghost.state(), GhostState::Transitioning);
        assert_eq!(f.overlay.clone_count(), 1);
        assert!(f.overlay.is_visible());
        assert!(f.a_hero.is_hidden() && f.b_hero.is_hidden());

        f.clock.advance(150.0);
        assert_eq!(f.ghost.on_frame(), GhostFrame::Running);
        f.clock.advance(200.0);
        assert_eq!(f.ghost.on_frame(), GhostFrame::Settled);
        assert_eq!(f.ghost.state(), GhostState::Idle);
        assert_eq!(f.overlay.clone_count(), 0);
        assert!(!f.overlay.is_visible());
        assert!(!f.a_hero.is_hidden() && !f.b_hero.is_hidden());
    }

    #[test]
    fn test_cross_fade_uses_two_clones() {
        let mut f = fixture(Some(TransitionStyle::CrossFade));
        f.ghost.begin(request(&f, false));
        assert_eq!(f.ghost.on_frame(), GhostFrame::Started { pairs: 1 });
        assert_eq!(f.overlay.clone_count(), 2);
        assert!(f.ghost.finish());
        assert!(!f.ghost.finish());
        assert_eq!(f.overlay.clone_count(), 0);
    }

    #[test]
    fn test_keep_alive_source_stays_hidden() {
        let mut f = fixture(None);
        f.a.set_keep_alive(true);
        f.ghost.begin(request(&f, false));
        f.ghost.on_frame();
        assert!(f.ghost.finish());
        assert!(f.a_hero.is_hidden());
        assert!(!f.b_hero.is_hidden());
    }

    #[test]
    fn test_gesture_restores_keep_alive_source() {
        let mut f = fixture(None);
        f.a.set_keep_alive(true);
        f.ghost.begin(request(&f, true));
        f.ghost.on_frame();
        f.ghost.finish();
        assert!(!f.a_hero.is_hidden());
    }

    #[test]
    fn test_cancel_restores_everything() {
        let mut f = fixture(Some(TransitionStyle::Fade));
        f.a.set_keep_alive(true);
        f.ghost.begin(request(&f, false));
        f.ghost.on_frame();
        assert!(f.ghost.cancel());
        assert!(!f.ghost.cancel());
        assert_eq!(f.ghost.state(), GhostState::Idle);
        assert_eq!(f.overlay.clone_count(), 0);
        assert!(!f.a_hero.is_hidden() && !f.b_hero.is_hidden());
    }

    #[test]
    fn test_finish_and_cancel_are_noops_when_idle() {
        let mut f = fixture(None);
        assert!(!f.ghost.finish());
        assert!(!f.ghost.cancel());
        assert_eq!(f.ghost.on_frame(), GhostFrame::Idle);
    }

    #[test]
    fn test_zero_duration_bypasses() {
        let mut f = fixture(None);
        let mut req = request(&f, false);
        req.duration_ms = 0.0;
        assert!(!f.ghost.begin(req));
        assert_eq!(f.ghost.state(), GhostState::Idle);
    }

    #[test]
    fn test_empty_scene_bypasses_on_next_frame() {
        let mut f = fixture(None);
        f.b.unregister_element("0");
        assert!(f.ghost.begin(request(&f, false)));
        assert_eq!(f.ghost.on_frame(), GhostFrame::Bypassed);
        assert_eq!(f.ghost.state(), GhostState::Idle);
        assert!(!f.overlay.is_visible());
    }

    #[test]
    fn test_scene_registered_after_begin_is_cloned() {
        let mut f = fixture(None);
        f.b.unregister_element("0");
        assert!(f.ghost.begin(request(&f, false)));
        assert_eq!(f.ghost.state(), GhostState::Preparing);

        // The incoming screen lays out and registers before the next frame.
        f.b.register_element("0", f.b_hero.clone(), SharedElementConfig::default()).unwrap();
        assert_eq!(f.ghost.on_frame(), GhostFrame::Started { pairs: 1 });
        assert_eq!(f.overlay.clone_count(), 1);
        assert!(f.b_hero.is_hidden());
    }

    #[test]
    fn test_morph_blends_computed_style() {
        let mut f = fixture_with(SharedElementConfig {
            easing: Some(crate::animation::EasingFunction::Linear),
            ..Default::default()
        });
        f.a_hero.set_style("border-radius", "0px");
        f.b_hero.set_style("border-radius", "20px");
        f.a_hero.set_style("background-color", "red");
        f.b_hero.set_style("background-color", "blue");
        f.ghost.begin(request(&f, true));
        f.ghost.on_frame();
        let clone = f.overlay.clones().pop().unwrap();

        assert!(f.ghost.set_progress(50.0));
        assert_eq!(clone.style().borrow().number("border-radius"), Some(10.0));
        assert!(f.ghost.set_progress(100.0));
        assert_eq!(clone.style().borrow().number("border-radius"), Some(20.0));
        // Keywords stay frozen at the start element's value.
        assert_eq!(
            clone.style().borrow().value("background-color"),
            Some(&crate::animation::AnimatedValue::keyword("red"))
        );
    }

    #[test]
    fn test_missing_endpoint_is_skipped() {
        let mut f = fixture(None);
        f.ghost.begin(request(&f, false));
        f.b_hero.set_connected(false);
        assert_eq!(f.ghost.on_frame(), GhostFrame::Bypassed);
        assert_eq!(f.overlay.clone_count(), 0);
        assert!(!f.overlay.is_visible());
        assert!(!f.a_hero.is_hidden());
    }

    #[test]
    fn test_second_begin_finishes_first() {
        let mut f = fixture(None);
        f.ghost.begin(request(&f, false));
        f.ghost.on_frame();
        assert_eq!(f.overlay.clone_count(), 1);
        assert!(f.ghost.begin(request(&f, false)));
        // The first clone set is gone before the second is prepared.
        assert_eq!(f.overlay.clone_count(), 0);
        assert_eq!(f.ghost.on_frame(), GhostFrame::Started { pairs: 1 });
        assert_eq!(f.overlay.clone_count(), 1);
        assert_eq!(f.overlay.max_clone_count(), 1);
    }

    #[test]
    fn test_gesture_seek_moves_clone() {
        let mut f = fixture(None);
        f.ghost.begin(request(&f, true));
        f.ghost.on_frame();
        let clone = f.overlay.clones().pop().unwrap();
        // Starts at the end position.
        assert_eq!(clone.style().borrow().number(TRANSLATE_X), Some(100.0));
        assert!(f.ghost.set_progress(0.0));
        assert_eq!(clone.style().borrow().number(TRANSLATE_X), Some(10.0));
        assert!(f.ghost.set_progress(50.0));
        let x = clone.style().borrow().number(TRANSLATE_X).unwrap();
        assert!(x > 10.0 && x < 100.0);
    }

    #[test]
    fn test_seek_refused_for_programmatic_transition() {
        let mut f = fixture(None);
        f.ghost.begin(request(&f, false));
        f.ghost.on_frame();
        assert!(!f.ghost.set_progress(50.0));
    }

    #[test]
    fn test_end_clone_stacks_below_start() {
        let mut f = fixture(Some(TransitionStyle::CrossFade));
        f.a_hero.set_style(Z_INDEX, "5");
        f.b_hero.set_style(Z_INDEX, "7");
        f.ghost.begin(request(&f, false));
        f.ghost.on_frame();
        let clones = f.overlay.clones();
        assert_eq!(clones[0].z_index(), 5);
        assert_eq!(clones[1].z_index(), 4);
    }

    #[test]
    fn test_fade_through_is_transparent_halfway() {
        let mut f = fixture_with(SharedElementConfig {
            transition: Some(TransitionStyle::FadeThrough),
            easing: Some(crate::animation::EasingFunction::Linear),
            ..Default::default()
        });
        f.ghost.begin(request(&f, true));
        f.ghost.on_frame();
        f.ghost.set_progress(50.0);
        for clone in f.overlay.clones() {
            assert_eq!(clone.style().borrow().number(crate::animation::OPACITY), Some(0.0));
        }
    }
}
