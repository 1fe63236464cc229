//! Back-swipe recognition.
//!
//! The recognizer turns swipe events into a progress value in the timeline's
//! [0, 100] domain and takes a single commit/revert decision on release.
//! A back-swipe scrubs a transition that starts at 100 (the current screen
//! fully shown) and moves toward 0 as the finger travels across the viewport,
//! where the previous screen is fully revealed.
//!
//! ```text
//! Idle ──swipe_start──► Armed ──swipe_move──► Scrubbing ──swipe_end──► Committing ──settle──► Idle
//!                         │                       │                  └► Reverting ───settle──► Idle
//!                         └───────────────────────┴──swipe_end──────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::scene::Rect;

/// Playback rate of a committed swipe released slowly.
pub const COMMIT_RATE: f64 = -1.0;
/// Playback rate of a committed fling.
pub const FLING_RATE: f64 = -5.0;
/// Playback rate of a reverted swipe.
pub const REVERT_RATE: f64 = 0.5;

/// Direction a back-swipe travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

/// Axis of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl SwipeDirection {
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Horizontal,
            Self::Up | Self::Down => Axis::Vertical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Distance of `(x, y)` from the edge a swipe in this direction starts
    /// from.
    fn edge_distance(self, x: f64, y: f64, viewport: &Rect) -> f64 {
        match self {
            Self::Right => x - viewport.x,
            Self::Left => viewport.x + viewport.width - x,
            Self::Down => y - viewport.y,
            Self::Up => viewport.y + viewport.height - y,
        }
    }

    /// Signed travel from `start` to `current` along this direction.
    fn displacement(self, start: (f64, f64), current: (f64, f64)) -> f64 {
        match self {
            Self::Right => current.0 - start.0,
            Self::Left => start.0 - current.0,
            Self::Down => current.1 - start.1,
            Self::Up => start.1 - current.1,
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown swipe direction: {other}")),
        }
    }
}

/// Recognizer thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub swipe_direction: SwipeDirection,
    /// Width of the discovery strip along the starting edge, in pixels.
    pub swipe_area_width: f64,
    /// Progress margin from completion beyond which a release commits.
    pub hysteresis: f64,
    /// Release velocity above which a swipe commits regardless of distance.
    pub min_fling_velocity: f64,
    pub disable_discovery: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_direction: SwipeDirection::Right,
            swipe_area_width: 100.0,
            hysteresis: 50.0,
            min_fling_velocity: 400.0,
            disable_discovery: false,
        }
    }
}

/// Per-screen replacements for the engine's gesture settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureOverrides {
    pub swipe_direction: Option<SwipeDirection>,
    pub swipe_area_width: Option<f64>,
    pub hysteresis: Option<f64>,
    pub min_fling_velocity: Option<f64>,
    pub disable_discovery: Option<bool>,
}

impl GestureConfig {
    /// Apply overrides on top of these settings.
    pub fn with_overrides(&self, overrides: &GestureOverrides) -> Self {
        Self {
            swipe_direction: overrides.swipe_direction.unwrap_or(self.swipe_direction),
            swipe_area_width: overrides.swipe_area_width.unwrap_or(self.swipe_area_width),
            hysteresis: overrides.hysteresis.unwrap_or(self.hysteresis),
            min_fling_velocity: overrides.min_fling_velocity.unwrap_or(self.min_fling_velocity),
            disable_discovery: overrides.disable_discovery.unwrap_or(self.disable_discovery),
        }
    }
}

/// An element on the event's propagation path that may veto swipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GestureRegion {
    pub disabled: bool,
}

/// Swipe start as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeStart {
    pub x: f64,
    pub y: f64,
    pub direction: SwipeDirection,
    pub touches: u32,
    pub viewport: Rect,
    /// Gesture regions between the root and the touch target.
    #[serde(default)]
    pub path: Vec<GestureRegion>,
}

impl SwipeStart {
    pub fn new(x: f64, y: f64, direction: SwipeDirection, viewport: Rect) -> Self {
        Self { x, y, direction, touches: 1, viewport, path: Vec::new() }
    }
}

/// Pointer position while swiping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeMove {
    pub x: f64,
    pub y: f64,
}

/// Release of the swipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeEnd {
    pub x: f64,
    pub y: f64,
    /// Release speed along the swipe axis, pixels per second.
    pub velocity: f64,
}

/// Engine facts the recognizer cannot observe itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmContext {
    pub animation_playing: bool,
    pub has_previous: bool,
    pub duration_ms: f64,
}

/// Why a swipe did not arm. Not an error: the swipe is simply ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureVeto {
    SessionActive,
    MultiTouch,
    DiscoveryDisabled,
    AnimationPlaying,
    ZeroDuration,
    DirectionMismatch,
    OutsideSwipeArea,
    NoPreviousScreen,
    DisabledRegion,
}

/// Recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureState {
    #[default]
    Idle,
    Armed,
    Scrubbing,
    Committing,
    Reverting,
}

/// A swipe from arming to settle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub axis: Axis,
    pub direction: SwipeDirection,
    pub start: (f64, f64),
    /// Viewport length along the axis.
    pub extent: f64,
    pub progress: f64,
    pub committed: bool,
}

/// Outcome of a release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Play on to the back navigation at `playback_rate` (negative).
    Commit { playback_rate: f64 },
    /// Snap back to the current screen.
    Revert { playback_rate: f64 },
}

impl Release {
    pub fn playback_rate(self) -> f64 {
        match self {
            Self::Commit { playback_rate } | Self::Revert { playback_rate } => playback_rate,
        }
    }

    pub fn is_commit(self) -> bool {
        matches!(self, Self::Commit { .. })
    }
}

/// Commit if the swipe travelled further than `hysteresis` from completion
/// or was released faster than the fling threshold.
pub fn release_decision(progress: f64, velocity: f64, config: &GestureConfig) -> Release {
    if (100.0 - progress) > config.hysteresis || velocity > config.min_fling_velocity {
        let playback_rate = if velocity >= config.min_fling_velocity { FLING_RATE } else { COMMIT_RATE };
        Release::Commit { playback_rate }
    } else {
        Release::Revert { playback_rate: REVERT_RATE }
    }
}

/// Back-swipe state machine.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    state: GestureState,
    session: Option<GestureSession>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self { config, state: GestureState::Idle, session: None }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the pointer currently drives progress.
    pub fn is_scrubbing(&self) -> bool {
        matches!(self.state, GestureState::Armed | GestureState::Scrubbing)
    }

    pub fn progress(&self) -> Option<f64> {
        self.session.map(|s| s.progress)
    }

    /// Try to arm a session. On success the initial progress (100) is
    /// returned.
    pub fn swipe_start(&mut self, start: &SwipeStart, ctx: &ArmContext) -> Result<f64, GestureVeto> {
        let veto = self.check(start, ctx);
        if let Some(veto) = veto {
            trace!(?veto, "swipe ignored");
            return Err(veto);
        }

        let axis = self.config.swipe_direction.axis();
        let extent = match axis {
            Axis::Horizontal => start.viewport.width,
            Axis::Vertical => start.viewport.height,
        };
        self.session = Some(GestureSession {
            axis,
            direction: self.config.swipe_direction,
            start: (start.x, start.y),
            extent: extent.max(1.0),
            progress: 100.0,
            committed: false,
        });
        self.state = GestureState::Armed;
        debug!(direction = %self.config.swipe_direction, x = start.x, y = start.y, "swipe armed");
        Ok(100.0)
    }

    fn check(&self, start: &SwipeStart, ctx: &ArmContext) -> Option<GestureVeto> {
        let config = &self.config;
        if self.session.is_some() {
            return Some(GestureVeto::SessionActive);
        }
        if start.touches > 1 {
            return Some(GestureVeto::MultiTouch);
        }
        if config.disable_discovery {
            return Some(GestureVeto::DiscoveryDisabled);
        }
        if ctx.animation_playing {
            return Some(GestureVeto::AnimationPlaying);
        }
        if ctx.duration_ms <= 0.0 {
            return Some(GestureVeto::ZeroDuration);
        }
        if start.direction != config.swipe_direction {
            return Some(GestureVeto::DirectionMismatch);
        }
        let distance = config.swipe_direction.edge_distance(start.x, start.y, &start.viewport);
        if !(0.0..config.swipe_area_width).contains(&distance) {
            return Some(GestureVeto::OutsideSwipeArea);
        }
        if !ctx.has_previous {
            return Some(GestureVeto::NoPreviousScreen);
        }
        if start.path.iter().any(|region| region.disabled) {
            return Some(GestureVeto::DisabledRegion);
        }
        None
    }

    /// Map the pointer to progress. Ignored outside an armed or scrubbing
    /// session.
    pub fn swipe_move(&mut self, event: &SwipeMove) -> Option<f64> {
        if !self.is_scrubbing() {
            return None;
        }
        let session = self.session.as_mut()?;
        let travelled = session.direction.displacement(session.start, (event.x, event.y));
        session.progress = (100.0 - travelled / session.extent * 100.0).clamp(0.0, 100.0);
        self.state = GestureState::Scrubbing;
        Some(session.progress)
    }

    /// Take the commit/revert decision. Only the first release of a session
    /// decides; later calls return `None`.
    pub fn swipe_end(&mut self, event: &SwipeEnd) -> Option<Release> {
        if !self.is_scrubbing() {
            return None;
        }
        let session = self.session.as_mut()?;
        let release = release_decision(session.progress, event.velocity, &self.config);
        session.committed = release.is_commit();
        self.state = if session.committed { GestureState::Committing } else { GestureState::Reverting };
        debug!(
            progress = session.progress,
            velocity = event.velocity,
            commit = session.committed,
            rate = release.playback_rate(),
            "swipe released"
        );
        Some(release)
    }

    /// Clear the session once the playback after release has finished.
    pub fn settle(&mut self) -> Option<GestureSession> {
        self.state = GestureState::Idle;
        self.session.take()
    }
}
