//! Screen animation descriptors and the built-in preset library.
//!
//! A screen describes its enter and exit animations either by naming a
//! preset, by a kind/direction pair that maps onto a preset, or with its own
//! keyframes. [`AnimationDescriptor::resolve`] turns any of these into the
//! keyframes and timing handed to the host, once, before the timeline starts.
//!
//! Preset names:
//!
//! | name | effect |
//! |---|---|
//! | `none` | no visual change, keeps the timeline duration |
//! | `fade-in` / `fade-out` | opacity |
//! | `slide-{dir}-{in,out}` | forward slide, the entering screen covers |
//! | `slide-back-{dir}-{in,out}` | backward slide, the exiting screen uncovers |
//! | `zoom-{in,out}-{in,out}` | scale with opacity |

use serde::{Deserialize, Serialize};

use super::easing::EasingFunction;
use super::keyframes::{
    AnimatedValue, AnimationOptions, FillMode, Keyframe, KeyframeSet, OPACITY, SCALE, TRANSLATE_X,
    TRANSLATE_Y, Z_INDEX,
};
use crate::error::{GlideError, Result};

/// Travel of the covered screen in a slide, in percent of its box.
const PARALLAX_PERCENT: f64 = 30.0;
const ZOOM_NEAR: f64 = 1.15;
const ZOOM_FAR: f64 = 0.85;

/// Which half of the transition a descriptor animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationRole {
    Enter,
    Exit,
}

impl AnimationRole {
    fn suffix(self) -> &'static str {
        match self {
            Self::Enter => "in",
            Self::Exit => "out",
        }
    }
}

/// Family of a kind/direction animation config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Slide,
    Zoom,
    Fade,
    #[default]
    None,
}

/// Direction of a slide or zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationDirection {
    Left,
    Right,
    Up,
    Down,
    In,
    Out,
}

impl AnimationDirection {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::In => "in",
            Self::Out => "out",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "left" => Self::Left,
            "right" => Self::Right,
            "up" => Self::Up,
            "down" => Self::Down,
            "in" => Self::In,
            "out" => Self::Out,
            _ => return None,
        })
    }

    /// Unit motion vector of a slide.
    fn vector(self) -> (f64, f64) {
        match self {
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::In | Self::Out => (0.0, 0.0),
        }
    }
}

/// Kind/direction animation config, mapped onto a preset name.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default)]
    pub kind: AnimationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<AnimationDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
}

impl AnimationConfig {
    pub fn new(kind: AnimationKind) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn direction(mut self, direction: AnimationDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Preset name for this config. Backward navigation flips slide and zoom
    /// directions; slides also switch to their `back-` variant.
    pub fn preset_name(&self, role: AnimationRole, back_navigating: bool) -> String {
        let suffix = role.suffix();
        let mut direction = self.direction;
        let mut prefix = "";
        if back_navigating && matches!(self.kind, AnimationKind::Slide | AnimationKind::Zoom) {
            if let Some(d) = direction {
                direction = Some(d.opposite());
                prefix = "back-";
            }
        }

        match self.kind {
            AnimationKind::Slide => {
                let direction = match direction {
                    None | Some(AnimationDirection::In) | Some(AnimationDirection::Out) => {
                        AnimationDirection::Left
                    }
                    Some(d) => d,
                };
                format!("slide-{prefix}{}-{suffix}", direction.as_str())
            }
            AnimationKind::Zoom => {
                let direction = match direction {
                    Some(d @ (AnimationDirection::In | AnimationDirection::Out)) => d,
                    _ => AnimationDirection::In,
                };
                format!("zoom-{}-{suffix}", direction.as_str())
            }
            AnimationKind::Fade => format!("fade-{suffix}"),
            AnimationKind::None => "none".to_string(),
        }
    }
}

/// Timing overrides of a custom descriptor. Omitted fields fall back to the
/// engine duration, the playback default easing and fill `both`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillMode>,
}

/// How one half of a screen transition is animated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationDescriptor {
    Preset {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        easing: Option<EasingFunction>,
    },
    Config(AnimationConfig),
    Custom {
        keyframes: KeyframeSet,
        #[serde(default)]
        options: CustomOptions,
    },
}

impl Default for AnimationDescriptor {
    fn default() -> Self {
        Self::preset("none")
    }
}

impl From<AnimationConfig> for AnimationDescriptor {
    fn from(config: AnimationConfig) -> Self {
        Self::Config(config)
    }
}

/// Engine-side defaults applied while resolving a descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveContext {
    pub role: AnimationRole,
    pub back_navigating: bool,
    pub duration_ms: f64,
    /// `ease-out` for programmatic playback, `linear` while gesture driven.
    pub easing: EasingFunction,
}

/// Keyframes and timing ready for the host primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnimation {
    pub keyframes: KeyframeSet,
    pub options: AnimationOptions,
}

impl AnimationDescriptor {
    pub fn preset(name: impl Into<String>) -> Self {
        Self::Preset { name: name.into(), duration_ms: None, easing: None }
    }

    pub fn custom(keyframes: impl Into<KeyframeSet>, options: CustomOptions) -> Self {
        Self::Custom { keyframes: keyframes.into(), options }
    }

    /// Explicit duration carried by the descriptor, if any.
    pub fn duration_ms(&self) -> Option<f64> {
        match self {
            Self::Preset { duration_ms, .. } => *duration_ms,
            Self::Config(config) => config.duration_ms,
            Self::Custom { options, .. } => options.duration_ms,
        }
    }

    pub fn resolve(&self, ctx: &ResolveContext) -> Result<ResolvedAnimation> {
        match self {
            Self::Preset { name, easing, .. } => resolve_preset(name, *easing, ctx),
            Self::Config(config) => {
                let name = config.preset_name(ctx.role, ctx.back_navigating);
                let easing = match config.kind {
                    AnimationKind::None => None,
                    _ => config.easing,
                };
                resolve_preset(&name, easing, ctx)
            }
            Self::Custom { keyframes, options } => {
                let duration = options.duration_ms.filter(|d| *d > 0.0).unwrap_or(ctx.duration_ms);
                Ok(ResolvedAnimation {
                    keyframes: keyframes.clone(),
                    options: AnimationOptions::new(duration)
                        .with_delay(options.delay_ms.unwrap_or(0.0))
                        .with_easing(options.easing.unwrap_or(ctx.easing))
                        .with_fill(options.fill.unwrap_or(FillMode::Both)),
                })
            }
        }
    }
}

fn resolve_preset(
    name: &str,
    easing: Option<EasingFunction>,
    ctx: &ResolveContext,
) -> Result<ResolvedAnimation> {
    Ok(ResolvedAnimation {
        keyframes: preset_keyframes(name)?,
        options: AnimationOptions::new(ctx.duration_ms)
            .with_easing(easing.unwrap_or(ctx.easing))
            .with_fill(FillMode::Both),
    })
}

/// Enter and exit descriptors of one screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationPair {
    #[serde(rename = "in")]
    pub enter: AnimationDescriptor,
    #[serde(rename = "out")]
    pub exit: AnimationDescriptor,
}

impl AnimationPair {
    pub fn new(enter: impl Into<AnimationDescriptor>, exit: impl Into<AnimationDescriptor>) -> Self {
        Self { enter: enter.into(), exit: exit.into() }
    }

    /// The same descriptor for both halves.
    pub fn symmetric(descriptor: impl Into<AnimationDescriptor>) -> Self {
        let descriptor = descriptor.into();
        Self { enter: descriptor.clone(), exit: descriptor }
    }

    pub fn get(&self, role: AnimationRole) -> &AnimationDescriptor {
        match role {
            AnimationRole::Enter => &self.enter,
            AnimationRole::Exit => &self.exit,
        }
    }
}

/// Keyframes of a named preset.
pub fn preset_keyframes(name: &str) -> Result<KeyframeSet> {
    let unknown = || GlideError::UnknownPreset(name.to_string());
    if name == "none" {
        return Ok(KeyframeSet::default());
    }

    let parts: Vec<&str> = name.split('-').collect();
    let frames = match parts.as_slice() {
        ["fade", "in"] => vec![Keyframe::new().opacity(0.0), Keyframe::new().opacity(1.0)],
        ["fade", "out"] => vec![Keyframe::new().opacity(1.0), Keyframe::new().opacity(0.0)],
        ["slide", rest @ ..] => {
            let (back, rest) = match rest {
                ["back", rest @ ..] => (true, rest),
                _ => (false, rest),
            };
            let [direction, role] = rest else {
                return Err(unknown());
            };
            let direction = AnimationDirection::parse(direction)
                .filter(|d| d.vector() != (0.0, 0.0))
                .ok_or_else(unknown)?;
            slide_frames(direction, role, back).ok_or_else(unknown)?
        }
        ["zoom", direction, role] => {
            let (from, to) = match (*direction, *role) {
                ("in", "in") => ((ZOOM_FAR, 0.0), (1.0, 1.0)),
                ("in", "out") => ((1.0, 1.0), (ZOOM_NEAR, 0.0)),
                ("out", "in") => ((ZOOM_NEAR, 0.0), (1.0, 1.0)),
                ("out", "out") => ((1.0, 1.0), (ZOOM_FAR, 0.0)),
                _ => return Err(unknown()),
            };
            vec![
                Keyframe::new().set(SCALE, AnimatedValue::number(from.0)).opacity(from.1),
                Keyframe::new().set(SCALE, AnimatedValue::number(to.0)).opacity(to.1),
            ]
        }
        _ => return Err(unknown()),
    };
    Ok(KeyframeSet::new(frames))
}

/// Forward slides cover the old screen; backward slides uncover the one
/// underneath. The covered screen travels a short parallax distance.
fn slide_frames(direction: AnimationDirection, role: &str, back: bool) -> Option<Vec<Keyframe>> {
    let (dx, dy) = direction.vector();
    let offset = |scale: f64| {
        Keyframe::new()
            .set(TRANSLATE_X, AnimatedValue::percent(dx * scale))
            .set(TRANSLATE_Y, AnimatedValue::percent(dy * scale))
    };
    let rest = || offset(0.0);
    let (from, to, z) = match (role, back) {
        ("in", false) => (offset(-100.0), rest(), 1.0),
        ("out", false) => (rest(), offset(PARALLAX_PERCENT), 0.0),
        ("in", true) => (offset(-PARALLAX_PERCENT), rest(), 0.0),
        ("out", true) => (rest(), offset(100.0), 1.0),
        _ => return None,
    };
    let z = AnimatedValue::number(z);
    Some(vec![from.set(Z_INDEX, z.clone()), to.set(Z_INDEX, z)])
}
