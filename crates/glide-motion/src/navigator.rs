//! Navigation state machine.
//!
//! [`NavigationEngine`] owns the screens, the route history and the three
//! drivers of a transition: the whole-screen [`Timeline`], the shared element
//! [`GhostCompositor`] and the back-swipe [`GestureRecognizer`]. The host
//! feeds it route changes and swipe events and calls
//! [`on_frame`](NavigationEngine::on_frame) once per animation frame.
//!
//! ```text
//!   navigate / go_back ─────────────► Transitioning ──(timeline end)──► Idle
//!   swipe_start ──► Scrubbing ──swipe_end──► Releasing ──(timeline end)──► Idle
//! ```
//!
//! Lifecycle events are queued while an operation mutates state and
//! published on the engine's [`EventBus`] once it is done.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::animation::{
    AnimationDescriptor, AnimationOptions, AnimationPair, AnimationRole, KeyframeSet, ResolveContext,
    ResolvedAnimation,
};
use crate::error::{GlideError, Result};
use crate::events::{EventBus, EventKind, EventQueue, NavigationEvent, Subscription};
use crate::gesture::{
    ArmContext, GestureConfig, GestureRecognizer, Release, SwipeEnd, SwipeMove, SwipeStart,
};
use crate::ghost::{GhostCompositor, GhostFrame, GhostRequest};
use crate::history::History;
use crate::screen::{RouteContext, ScreenHandle};
use crate::timeline::{Timeline, TimelineEnd, TimelineOptions, default_easing};

/// Default duration of a screen transition.
pub const DEFAULT_DURATION_MS: f64 = 350.0;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Gesture defaults; screens may override them.
    pub gesture: GestureConfig,
    pub duration_ms: f64,
    /// Used by screens that do not configure their own animations.
    pub default_animation: AnimationPair,
    /// Route going back lands on once the history runs out.
    pub default_route: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            duration_ms: DEFAULT_DURATION_MS,
            default_animation: AnimationPair::default(),
            default_route: None,
        }
    }
}

/// Why the current transition runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Forward,
    Back,
    /// Back-swipe; the exit screen is the one being returned to.
    Gesture,
}

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Idle,
    /// A programmatic transition is playing.
    Transitioning,
    /// The pointer drives progress.
    Scrubbing,
    /// A released swipe plays out.
    Releasing,
}

struct ActiveTransition {
    /// Animated with its exit descriptor.
    exit: ScreenHandle,
    /// Animated with its enter descriptor.
    enter: ScreenHandle,
    kind: TransitionKind,
}

/// Coordinates screens, history and the transition drivers.
pub struct NavigationEngine {
    timeline: Timeline,
    ghost: GhostCompositor,
    recognizer: GestureRecognizer,
    config: EngineConfig,
    bus: EventBus,
    queue: EventQueue,
    screens: Vec<ScreenHandle>,
    history: History,
    route_params: BTreeMap<String, String>,
    current: Option<ScreenHandle>,
    transition: Option<ActiveTransition>,
}

impl fmt::Debug for NavigationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationEngine")
            .field("phase", &self.phase())
            .field("current", &self.current.as_ref().map(|s| s.name()))
            .field("history", &self.history)
            .field("timeline", &self.timeline)
            .field("ghost", &self.ghost)
            .finish_non_exhaustive()
    }
}

impl NavigationEngine {
    pub fn new(
        timeline: Timeline,
        compositor: GhostCompositor,
        recognizer: GestureRecognizer,
        config: EngineConfig,
    ) -> Self {
        let default_route = config.default_route.clone();
        let initial = default_route.clone().unwrap_or_else(|| "/".to_string());
        Self {
            timeline,
            ghost: compositor,
            recognizer,
            config,
            bus: EventBus::new(),
            queue: EventQueue::new(),
            screens: Vec::new(),
            history: History::new(initial, default_route),
            route_params: BTreeMap::new(),
            current: None,
            transition: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn ghost(&self) -> &GhostCompositor {
        &self.ghost
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self, handler: impl FnMut(&NavigationEvent) + 'static) -> Subscription {
        self.bus.subscribe(handler)
    }

    pub fn subscribe_to(
        &self,
        kind: EventKind,
        handler: impl FnMut(&NavigationEvent) + 'static,
    ) -> Subscription {
        self.bus.subscribe_to(kind, handler)
    }

    pub fn current_screen(&self) -> Option<&ScreenHandle> {
        self.current.as_ref()
    }

    pub fn current_route(&self) -> Option<&str> {
        self.history.current()
    }

    /// Parameters passed with the last `navigate`.
    pub fn route_params(&self) -> &BTreeMap<String, String> {
        &self.route_params
    }

    pub fn screens(&self) -> &[ScreenHandle] {
        &self.screens
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition_kind(&self) -> Option<TransitionKind> {
        self.transition.as_ref().map(|t| t.kind)
    }

    pub fn phase(&self) -> EnginePhase {
        match &self.transition {
            None => EnginePhase::Idle,
            Some(t) if t.kind != TransitionKind::Gesture => EnginePhase::Transitioning,
            Some(_) if self.recognizer.is_scrubbing() => EnginePhase::Scrubbing,
            Some(_) => EnginePhase::Releasing,
        }
    }

    /// Add a screen. Names are unique per engine.
    pub fn register_screen(&mut self, screen: ScreenHandle) -> Result<()> {
        if self.screens.iter().any(|s| s.name() == screen.name()) {
            return Err(GlideError::DuplicateScreen(screen.name().to_string()));
        }
        debug!(screen = %screen.name(), path = ?screen.path(), "screen registered");
        self.screens.push(screen);
        Ok(())
    }

    /// Remove a screen that is not currently shown.
    pub fn unregister_screen(&mut self, name: &str) -> Option<ScreenHandle> {
        if self.current.as_ref().is_some_and(|c| c.name() == name) {
            warn!(screen = name, "refusing to unregister the current screen");
            return None;
        }
        let index = self.screens.iter().position(|s| s.name() == name)?;
        Some(self.screens.remove(index))
    }

    /// Screen answering `route`, or the fallback screen.
    pub fn screen_for(&self, route: &str) -> Result<ScreenHandle> {
        self.screens
            .iter()
            .find(|s| s.matches(route))
            .or_else(|| self.screens.iter().find(|s| s.is_fallback()))
            .cloned()
            .ok_or_else(|| GlideError::UnknownScreen(route.to_string()))
    }

    /// Show the screen for `route` without animating and reset the history
    /// to it.
    pub fn start(&mut self, route: impl Into<String>) -> Result<()> {
        let route = route.into();
        let screen = self.screen_for(&route)?;
        self.settle_in_flight();
        if let Some(previous) = self.current.take().filter(|c| !Rc::ptr_eq(c, &screen)) {
            previous.unmount();
        }
        info!(%route, screen = %screen.name(), "start");
        self.history = History::new(route, self.config.default_route.clone());
        screen.mount();
        screen.set_interactive(true);
        self.current = Some(screen);
        self.reconfigure_recognizer();
        self.flush();
        Ok(())
    }

    /// Navigate forward to `route`. A transition in flight is finished
    /// first.
    pub fn navigate(&mut self, route: impl Into<String>, route_params: BTreeMap<String, String>) -> Result<()> {
        let route = route.into();
        let incoming = self.screen_for(&route)?;
        self.settle_in_flight();
        let from = self.history.current().map(str::to_string);
        info!(%route, from = ?from, screen = %incoming.name(), "navigate");
        self.history.push(route.clone(), false);
        self.route_params = route_params;
        self.transition_to(incoming, from, route, TransitionKind::Forward);
        self.flush();
        Ok(())
    }

    /// Navigate back one entry, animating as a back navigation.
    pub fn go_back(&mut self) -> Result<()> {
        self.settle_in_flight();
        if !self.history.can_go_back() {
            return Err(GlideError::NoPreviousRoute);
        }
        let target = self.history.previous().unwrap_or(self.history.default_route()).to_string();
        let incoming = self.screen_for(&target)?;
        let step = self.history.back()?;
        info!(route = %step.route, left = %step.left, replace_state = step.replace_state, "go back");
        self.queue.push(NavigationEvent::GoBack { replace_state: step.replace_state });
        self.route_params.clear();
        self.transition_to(incoming, Some(step.left), step.route, TransitionKind::Back);
        self.flush();
        Ok(())
    }

    /// Apply an inbound event. Outbound-only events are ignored.
    pub fn handle_event(&mut self, event: &NavigationEvent) -> Result<()> {
        match event {
            NavigationEvent::Navigate { route, route_params } => self.navigate(route.clone(), route_params.clone()),
            NavigationEvent::GoBack { .. } => self.go_back(),
            other => {
                trace!(event = other.name(), "ignoring outbound event");
                Ok(())
            }
        }
    }

    /// Advance one animation frame.
    pub fn on_frame(&mut self) {
        if let GhostFrame::Started { .. } = self.ghost.on_frame() {
            self.sync_ghost_to_gesture();
        }

        if self.recognizer.is_scrubbing() {
            // The pointer is the only progress driver while scrubbing.
            self.flush();
            return;
        }

        match self.timeline.on_frame() {
            Some(end) => self.complete(end),
            None if self.transition.is_some() && !self.timeline.is_active() => {
                debug!("timeline detached by the host, finishing transition");
                self.abort(false);
            }
            None if self.timeline.is_playing() => {
                let progress = reported_progress(self.transition_kind(), self.timeline.progress());
                self.queue.push(NavigationEvent::MotionProgress { progress });
            }
            None => {}
        }
        self.flush();
    }

    /// Complete the transition in flight now.
    pub fn finish_transition(&mut self) -> bool {
        let active = self.transition.is_some();
        self.settle_in_flight();
        self.flush();
        active
    }

    /// Abort the transition in flight. The route change stands; only the
    /// animation is dropped. Emits `page-animation-cancel`.
    pub fn cancel_transition(&mut self) -> bool {
        let canceled = self.abort(true);
        self.flush();
        canceled
    }

    /// Host swipe start. Returns whether a back-swipe session armed.
    pub fn swipe_start(&mut self, event: &SwipeStart) -> bool {
        let target = self.back_target();
        // The swipe scrubs the forward transition previous -> current
        // backwards from its end.
        let resolved = match (&target, &self.current) {
            (Some((previous_route, previous)), Some(current)) => {
                let ctx = RouteContext {
                    current: self.history.current().map(str::to_string),
                    next: Some(previous_route.clone()),
                    gesture_navigating: true,
                };
                Some(self.resolve(previous, current, &ctx, false, true))
            }
            _ => None,
        };
        let ctx = ArmContext {
            animation_playing: self.transition.is_some(),
            has_previous: target.is_some(),
            duration_ms: resolved.as_ref().map_or(self.config.duration_ms, |(_, _, duration)| *duration),
        };
        let progress = match self.recognizer.swipe_start(event, &ctx) {
            Ok(progress) => progress,
            Err(veto) => {
                trace!(?veto, "back swipe vetoed");
                return false;
            }
        };
        let (Some((_, previous)), Some(current), Some((exit, enter, duration_ms))) =
            (target, self.current.clone(), resolved)
        else {
            self.recognizer.settle();
            return false;
        };

        info!(from = %current.name(), to = %previous.name(), "back swipe armed");
        self.queue.push(NavigationEvent::MotionProgressStart { progress });
        self.queue.push(NavigationEvent::PageAnimationStart);
        previous.mount();
        previous.set_interactive(false);
        previous.set_transition_role(false, true);
        current.set_interactive(false);
        current.set_transition_role(true, false);

        self.timeline.start(&*previous, &exit, &*current, &enter, TimelineOptions::gesture(duration_ms));
        self.ghost.begin(GhostRequest {
            start: previous.clone(),
            end: current.clone(),
            duration_ms,
            gesture: true,
        });
        self.transition = Some(ActiveTransition { exit: previous, enter: current, kind: TransitionKind::Gesture });
        self.flush();
        true
    }

    /// Host swipe move. Returns the new progress while scrubbing.
    pub fn swipe_move(&mut self, event: &SwipeMove) -> Option<f64> {
        let progress = self.recognizer.swipe_move(event)?;
        self.timeline.set_progress(progress);
        self.ghost.set_progress(progress);
        self.queue.push(NavigationEvent::MotionProgress { progress });
        self.flush();
        Some(progress)
    }

    /// Host swipe release. Returns the decision taken.
    pub fn swipe_end(&mut self, event: &SwipeEnd) -> Option<Release> {
        let release = self.recognizer.swipe_end(event)?;
        let rate = release.playback_rate();
        let progress = self.timeline.progress();
        self.timeline.set_playback_rate(rate);
        self.ghost.set_playback_rate(rate);

        // Already at the boundary the release heads for.
        let at_boundary = if release.is_commit() { progress <= 0.0 } else { progress >= 100.0 };
        if at_boundary {
            if let Some(end) = self.timeline.finish() {
                self.complete(end);
            }
        } else {
            self.timeline.play();
            self.ghost.play();
        }
        self.flush();
        Some(release)
    }

    fn transition_to(&mut self, incoming: ScreenHandle, from: Option<String>, to: String, kind: TransitionKind) {
        let Some(outgoing) = self.current.clone() else {
            incoming.mount();
            incoming.set_interactive(true);
            self.current = Some(incoming);
            self.reconfigure_recognizer();
            return;
        };
        if Rc::ptr_eq(&outgoing, &incoming) {
            trace!(screen = %incoming.name(), "route change within the current screen");
            return;
        }

        // Exit first: the outgoing screen stops reacting before geometry is
        // sampled on the next frame.
        outgoing.set_interactive(false);
        outgoing.set_transition_role(false, true);
        self.queue.push(NavigationEvent::PageAnimationStart);

        incoming.mount();
        incoming.set_interactive(false);
        incoming.set_transition_role(true, false);

        let ctx = RouteContext { current: from, next: Some(to), gesture_navigating: false };
        let back = kind == TransitionKind::Back;
        let (exit, enter, duration_ms) = self.resolve(&outgoing, &incoming, &ctx, back, false);
        self.timeline.start(
            &*outgoing,
            &exit,
            &*incoming,
            &enter,
            TimelineOptions::programmatic(duration_ms),
        );
        self.ghost.begin(GhostRequest {
            start: outgoing.clone(),
            end: incoming.clone(),
            duration_ms,
            gesture: false,
        });
        self.current = Some(incoming.clone());
        self.transition = Some(ActiveTransition { exit: outgoing, enter: incoming, kind });
    }

    /// Resolve the exit and enter animations and the run duration. A
    /// descriptor that fails to resolve degrades to no animation.
    fn resolve(
        &self,
        exit_screen: &ScreenHandle,
        enter_screen: &ScreenHandle,
        ctx: &RouteContext,
        back_navigating: bool,
        gesture: bool,
    ) -> (ResolvedAnimation, ResolvedAnimation, f64) {
        let exit = exit_screen
            .animations(ctx)
            .map(|pair| pair.exit)
            .unwrap_or_else(|| self.config.default_animation.exit.clone());
        let enter = enter_screen
            .animations(ctx)
            .map(|pair| pair.enter)
            .unwrap_or_else(|| self.config.default_animation.enter.clone());
        let duration_ms = enter.duration_ms().or(exit.duration_ms()).unwrap_or(self.config.duration_ms);
        let easing = default_easing(gesture);

        let resolve = |descriptor: &AnimationDescriptor, role: AnimationRole| {
            let rctx = ResolveContext { role, back_navigating, duration_ms, easing };
            descriptor.resolve(&rctx).unwrap_or_else(|err| {
                warn!(error = %err, ?role, "animation descriptor failed to resolve, not animating");
                ResolvedAnimation {
                    keyframes: KeyframeSet::default(),
                    options: AnimationOptions::new(duration_ms).with_easing(easing),
                }
            })
        };
        (resolve(&exit, AnimationRole::Exit), resolve(&enter, AnimationRole::Enter), duration_ms)
    }

    /// Route and screen a back navigation would land on.
    fn back_target(&self) -> Option<(String, ScreenHandle)> {
        let current = self.current.as_ref()?;
        if !self.history.can_go_back() {
            return None;
        }
        let route = self.history.previous().unwrap_or(self.history.default_route()).to_string();
        let screen = self.screen_for(&route).ok()?;
        (!Rc::ptr_eq(&screen, current)).then_some((route, screen))
    }

    /// Bring the compositor in line with a gesture that moved or was
    /// released before the clones existed.
    fn sync_ghost_to_gesture(&mut self) {
        if self.transition_kind() != Some(TransitionKind::Gesture) {
            return;
        }
        self.ghost.set_progress(self.timeline.progress());
        if !self.recognizer.is_scrubbing() {
            self.ghost.set_playback_rate(self.timeline.playback_rate());
            self.ghost.play();
        }
    }

    fn settle_in_flight(&mut self) {
        if let Some(end) = self.timeline.finish() {
            self.complete(end);
        } else if self.transition.is_some() {
            self.abort(false);
        }
        self.ghost.finish();
    }

    /// Finalize the screens once the timeline ends.
    fn complete(&mut self, end: TimelineEnd) {
        let Some(t) = self.transition.take() else {
            return;
        };
        match t.kind {
            TransitionKind::Forward | TransitionKind::Back => {
                t.exit.unmount();
                self.current = Some(t.enter.clone());
                let progress = reported_progress(Some(t.kind), end.progress);
                self.queue.push(NavigationEvent::MotionProgress { progress });
            }
            TransitionKind::Gesture => {
                self.ghost.finish();
                self.recognizer.settle();
                if end.reverted() {
                    debug!(screen = %t.enter.name(), "back swipe reverted");
                    t.exit.unmount();
                    self.current = Some(t.enter.clone());
                } else {
                    debug!(screen = %t.exit.name(), "back swipe committed");
                    t.enter.unmount();
                    match self.history.back() {
                        Ok(step) => {
                            self.queue.push(NavigationEvent::GoBack { replace_state: step.replace_state });
                        }
                        Err(err) => warn!(error = %err, "history out of sync with back swipe"),
                    }
                    self.route_params.clear();
                    self.current = Some(t.exit.clone());
                }
                self.queue.push(NavigationEvent::MotionProgressEnd { progress: end.progress });
            }
        }
        t.exit.set_transition_role(false, false);
        t.enter.set_transition_role(false, false);
        if let Some(current) = &self.current {
            current.set_interactive(true);
        }
        self.reconfigure_recognizer();
        self.queue.push(NavigationEvent::PageAnimationEnd);
        debug!(kind = ?t.kind, rate = end.playback_rate, "transition complete");
    }

    /// Drop the animations and jump to the state the transition leads to.
    /// Gestures are treated as reverted.
    fn abort(&mut self, emit: bool) -> bool {
        let Some(t) = self.transition.take() else {
            return false;
        };
        self.timeline.cancel();
        self.ghost.cancel();
        if t.kind == TransitionKind::Gesture {
            self.recognizer.settle();
            self.queue.push(NavigationEvent::MotionProgressEnd { progress: 100.0 });
        }
        // Programmatic runs already made the incoming screen current; a
        // gesture never changed it.
        t.exit.unmount();
        t.enter.set_transition_role(false, false);
        self.current = Some(t.enter.clone());
        t.enter.set_interactive(true);
        self.reconfigure_recognizer();
        if emit {
            self.queue.push(NavigationEvent::PageAnimationCancel);
        }
        debug!(kind = ?t.kind, "transition aborted");
        true
    }

    /// Apply the current screen's gesture overrides over the engine
    /// defaults. Left alone while a session runs.
    fn reconfigure_recognizer(&mut self) {
        if self.recognizer.is_active() {
            return;
        }
        let config = match &self.current {
            Some(screen) => self.config.gesture.with_overrides(screen.gesture_overrides()),
            None => self.config.gesture,
        };
        self.recognizer.set_config(config);
    }

    fn flush(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        self.bus.flush(&mut self.queue);
    }
}

/// Progress as reported on `motion-progress`. Programmatic back navigation
/// counts down.
fn reported_progress(kind: Option<TransitionKind>, progress: f64) -> f64 {
    match kind {
        Some(TransitionKind::Back) => 100.0 - progress,
        _ => progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::animation::{AnimationConfig, AnimationKind, SoftwareClock, TRANSLATE_X};
    use crate::gesture::{GestureOverrides, SwipeDirection};
    use crate::headless::{HeadlessOverlay, HeadlessSurface};
    use crate::scene::Rect;
    use crate::screen::{Screen, ScreenConfig, ScreenSurface};

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 400.0, 800.0);

    struct Fixture {
        clock: SoftwareClock,
        engine: NavigationEngine,
        home: Rc<HeadlessSurface>,
        details: Rc<HeadlessSurface>,
        events: Rc<RefCell<Vec<NavigationEvent>>>,
        _subscription: Subscription,
    }

    fn fixture(details_config: ScreenConfig) -> Fixture {
        fixture_with(300.0, details_config)
    }

    fn fixture_with(duration_ms: f64, details_config: ScreenConfig) -> Fixture {
        let clock = SoftwareClock::new();
        let overlay = HeadlessOverlay::new(&clock);
        let config = EngineConfig {
            duration_ms,
            default_animation: AnimationPair::new(
                AnimationConfig::new(AnimationKind::Slide),
                AnimationConfig::new(AnimationKind::Slide),
            ),
            ..EngineConfig::default()
        };
        let mut engine = NavigationEngine::new(
            Timeline::new(),
            GhostCompositor::new(overlay),
            GestureRecognizer::new(config.gesture),
            config,
        );
        let home = HeadlessSurface::new(&clock, VIEWPORT);
        let details = HeadlessSurface::new(&clock, VIEWPORT);
        engine.register_screen(Screen::new("home", home.clone(), ScreenConfig::new("/"))).unwrap();
        engine.register_screen(Screen::new("details", details.clone(), details_config)).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        engine.start("/").unwrap();
        Fixture { clock, engine, home, details, events, _subscription: subscription }
    }

    fn names(f: &Fixture) -> Vec<&'static str> {
        f.events
            .borrow()
            .iter()
            .filter(|e| e.kind() != EventKind::MotionProgress)
            .map(|e| e.name())
            .collect()
    }

    fn run_out(f: &mut Fixture) {
        for _ in 0..40 {
            f.clock.advance(16.0);
            f.engine.on_frame();
        }
    }

    #[test]
    fn test_navigate_swaps_screens() {
        let mut f = fixture(ScreenConfig::new("/details"));
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        assert_eq!(f.engine.phase(), EnginePhase::Transitioning);
        assert!(f.details.is_mounted());
        assert!(!f.home.is_interactive() && !f.details.is_interactive());

        run_out(&mut f);
        assert_eq!(f.engine.phase(), EnginePhase::Idle);
        assert!(!f.home.is_mounted());
        assert!(f.details.is_interactive());
        assert_eq!(f.engine.current_screen().map(|s| s.name()), Some("details"));
        assert_eq!(names(&f), ["page-animation-start", "page-animation-end"]);
    }

    #[test]
    fn test_unknown_route_is_an_error() {
        let mut f = fixture(ScreenConfig::new("/details"));
        let err = f.engine.navigate("/nowhere", BTreeMap::new()).unwrap_err();
        assert_eq!(err, GlideError::UnknownScreen("/nowhere".into()));
        assert_eq!(f.engine.history().current(), Some("/"));
    }

    #[test]
    fn test_fallback_screen_catches_unknown_routes() {
        let mut f = fixture(ScreenConfig::fallback());
        f.engine.navigate("/anything", BTreeMap::new()).unwrap();
        assert_eq!(f.engine.current_screen().map(|s| s.name()), Some("details"));
    }

    #[test]
    fn test_duplicate_screen_name() {
        let mut f = fixture(ScreenConfig::new("/details"));
        let surface = HeadlessSurface::new(&f.clock, VIEWPORT);
        let err = f.engine.register_screen(Screen::new("home", surface, ScreenConfig::new("/x"))).unwrap_err();
        assert_eq!(err, GlideError::DuplicateScreen("home".into()));
    }

    #[test]
    fn test_second_navigate_finishes_first() {
        let mut f = fixture(ScreenConfig::new("/details"));
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        f.engine.on_frame();
        f.engine.navigate("/", BTreeMap::new()).unwrap();
        assert_eq!(
            names(&f),
            ["page-animation-start", "page-animation-end", "page-animation-start"]
        );
        assert!(f.details.is_mounted());
        run_out(&mut f);
        assert!(!f.details.is_mounted());
        assert_eq!(f.engine.history().entries().len(), 3);
    }

    #[test]
    fn test_go_back_reports_inverted_progress() {
        let mut f = fixture(ScreenConfig::new("/details"));
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        f.engine.finish_transition();
        f.events.borrow_mut().clear();

        f.engine.go_back().unwrap();
        f.clock.advance(100.0);
        f.engine.on_frame();
        let progress = f.events.borrow().iter().rev().find_map(NavigationEvent::progress).unwrap();
        assert!(progress < 100.0 && progress > 0.0);
        run_out(&mut f);
        let last = f.events.borrow().iter().rev().find_map(NavigationEvent::progress).unwrap();
        assert_eq!(last, 0.0);
        assert_eq!(f.events.borrow()[0], NavigationEvent::GoBack { replace_state: false });
        assert_eq!(f.engine.current_route(), Some("/"));
    }

    #[test]
    fn test_go_back_without_history() {
        let mut f = fixture(ScreenConfig::new("/details"));
        assert_eq!(f.engine.go_back(), Err(GlideError::NoPreviousRoute));
    }

    #[test]
    fn test_cancel_keeps_route_change() {
        let mut f = fixture(ScreenConfig::new("/details"));
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        assert!(f.engine.cancel_transition());
        assert!(!f.engine.cancel_transition());
        assert!(!f.home.is_mounted());
        assert!(f.details.is_interactive());
        assert_eq!(names(&f), ["page-animation-start", "page-animation-cancel"]);
    }

    fn swipe(f: &mut Fixture, to_x: f64, velocity: f64) -> Option<Release> {
        let start = SwipeStart::new(10.0, 300.0, SwipeDirection::Right, VIEWPORT);
        assert!(f.engine.swipe_start(&start));
        f.engine.on_frame();
        f.engine.swipe_move(&SwipeMove { x: to_x, y: 300.0 });
        f.engine.swipe_end(&SwipeEnd { x: to_x, y: 300.0, velocity })
    }

    fn at_details(config: ScreenConfig) -> Fixture {
        let mut f = fixture(config);
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        f.engine.finish_transition();
        f.events.borrow_mut().clear();
        f
    }

    #[test]
    fn test_swipe_commit_goes_back() {
        let mut f = at_details(ScreenConfig::new("/details"));
        let release = swipe(&mut f, 300.0, 0.0).unwrap();
        assert!(release.is_commit());
        assert_eq!(f.engine.phase(), EnginePhase::Releasing);
        run_out(&mut f);
        assert_eq!(f.engine.phase(), EnginePhase::Idle);
        assert_eq!(f.engine.current_screen().map(|s| s.name()), Some("home"));
        assert!(!f.details.is_mounted());
        assert_eq!(f.engine.current_route(), Some("/"));
        assert_eq!(
            names(&f),
            ["motion-progress-start", "page-animation-start", "go-back", "motion-progress-end", "page-animation-end"]
        );
    }

    #[test]
    fn test_swipe_revert_stays() {
        let mut f = at_details(ScreenConfig::new("/details"));
        let release = swipe(&mut f, 40.0, 0.0).unwrap();
        assert!(!release.is_commit());
        run_out(&mut f);
        assert_eq!(f.engine.current_screen().map(|s| s.name()), Some("details"));
        assert!(!f.home.is_mounted());
        assert!(f.details.is_interactive());
        assert_eq!(f.engine.current_route(), Some("/details"));
    }

    #[test]
    fn test_swipe_scrub_seeks_screens() {
        let mut f = at_details(ScreenConfig::new("/details"));
        let start = SwipeStart::new(10.0, 300.0, SwipeDirection::Right, VIEWPORT);
        assert!(f.engine.swipe_start(&start));
        assert!(f.home.is_mounted());
        assert_eq!(f.engine.swipe_move(&SwipeMove { x: 210.0, y: 300.0 }), Some(50.0));
        assert_eq!(f.engine.timeline().progress(), 50.0);
        // Scrubbing suspends natural playback.
        f.clock.advance(1_000.0);
        f.engine.on_frame();
        assert_eq!(f.engine.timeline().progress(), 50.0);
        assert!(f.details.rendered().borrow().number(TRANSLATE_X).is_some());
    }

    #[test]
    fn test_swipe_arms_on_screen_duration() {
        let timed = AnimationPair::symmetric(AnimationConfig::new(AnimationKind::Slide).duration(250.0));
        let mut f = fixture_with(0.0, ScreenConfig::new("/details").animation(timed));
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        f.engine.finish_transition();

        let start = SwipeStart::new(10.0, 300.0, SwipeDirection::Right, VIEWPORT);
        assert!(f.engine.swipe_start(&start));
        assert_eq!(f.engine.phase(), EnginePhase::Scrubbing);
    }

    #[test]
    fn test_swipe_refused_without_any_duration() {
        let mut f = fixture_with(0.0, ScreenConfig::new("/details"));
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        f.engine.finish_transition();

        let start = SwipeStart::new(10.0, 300.0, SwipeDirection::Right, VIEWPORT);
        assert!(!f.engine.swipe_start(&start));
        assert!(!f.engine.is_transitioning());
    }

    #[test]
    fn test_second_swipe_start_ignored() {
        let mut f = at_details(ScreenConfig::new("/details"));
        let start = SwipeStart::new(10.0, 300.0, SwipeDirection::Right, VIEWPORT);
        assert!(f.engine.swipe_start(&start));
        assert!(!f.engine.swipe_start(&start));
    }

    #[test]
    fn test_swipe_needs_previous_screen() {
        let mut f = fixture(ScreenConfig::new("/details"));
        let start = SwipeStart::new(10.0, 300.0, SwipeDirection::Right, VIEWPORT);
        assert!(!f.engine.swipe_start(&start));
    }

    #[test]
    fn test_screen_gesture_overrides() {
        let overrides = GestureOverrides { swipe_direction: Some(SwipeDirection::Left), ..Default::default() };
        let mut f = at_details(ScreenConfig::new("/details").gesture(overrides));
        assert_eq!(f.engine.recognizer().config().swipe_direction, SwipeDirection::Left);
        let right = SwipeStart::new(10.0, 300.0, SwipeDirection::Right, VIEWPORT);
        assert!(!f.engine.swipe_start(&right));
        let left = SwipeStart::new(390.0, 300.0, SwipeDirection::Left, VIEWPORT);
        assert!(f.engine.swipe_start(&left));
    }

    #[test]
    fn test_keep_alive_screen_is_hidden_not_unmounted() {
        let mut f = fixture(ScreenConfig::new("/details"));
        f.engine.screens()[0].set_keep_alive(true);
        f.engine.navigate("/details", BTreeMap::new()).unwrap();
        run_out(&mut f);
        assert!(f.home.is_mounted());
        assert!(f.home.is_hidden());
        f.engine.go_back().unwrap();
        assert!(!f.home.is_hidden());
        assert_eq!(f.home.mount_count(), 1);
    }

    #[test]
    fn test_inbound_events() {
        let mut f = fixture(ScreenConfig::new("/details"));
        let params = BTreeMap::from([("id".to_string(), "7".to_string())]);
        f.engine
            .handle_event(&NavigationEvent::Navigate { route: "/details".into(), route_params: params.clone() })
            .unwrap();
        assert_eq!(f.engine.route_params(), &params);
        f.engine.handle_event(&NavigationEvent::GoBack { replace_state: false }).unwrap();
        assert_eq!(f.engine.current_route(), Some("/"));
        f.engine.handle_event(&NavigationEvent::PageAnimationEnd).unwrap();
    }
}
