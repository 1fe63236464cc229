//! Keyframes and timing options handed to the host animation primitive.
//!
//! A [`Keyframe`] is an optional offset plus a map of property name to
//! [`AnimatedValue`]. Property names follow the host's style vocabulary
//! (`opacity`, `width`, ...) plus the engine's own transform channels
//! [`TRANSLATE_X`], [`TRANSLATE_Y`] and [`SCALE`].
//!
//! Sampling follows the usual keyframe-effect rules: keyframes without an
//! offset are spaced evenly between their neighbours, the effect easing is
//! applied to the iteration progress and the easing of the *from* keyframe is
//! applied to the local segment progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::easing::EasingFunction;

/// Horizontal translation channel.
pub const TRANSLATE_X: &str = "translate-x";
/// Vertical translation channel.
pub const TRANSLATE_Y: &str = "translate-y";
/// Uniform scale channel.
pub const SCALE: &str = "scale";
/// Opacity channel.
pub const OPACITY: &str = "opacity";
/// Stacking order channel.
pub const Z_INDEX: &str = "z-index";

/// Unit of a [`AnimatedValue::Length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Px,
    /// Percent of the animated element's own box.
    Percent,
}

/// A single animatable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatedValue {
    Number { value: f64 },
    Length { value: f64, unit: LengthUnit },
    /// Anything that cannot be interpolated; flips at the halfway point.
    Keyword { value: String },
}

impl AnimatedValue {
    pub fn number(value: f64) -> Self {
        Self::Number { value }
    }

    pub fn px(value: f64) -> Self {
        Self::Length { value, unit: LengthUnit::Px }
    }

    pub fn percent(value: f64) -> Self {
        Self::Length { value, unit: LengthUnit::Percent }
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        Self::Keyword { value: value.into() }
    }

    /// Parse a computed-style string: `12px` and `50%` become lengths, bare
    /// numbers become numbers, everything else is kept as a keyword.
    pub fn parse_css(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(v) = raw.strip_suffix("px").and_then(|v| v.trim().parse().ok()) {
            return Self::px(v);
        }
        if let Some(v) = raw.strip_suffix('%').and_then(|v| v.trim().parse().ok()) {
            return Self::percent(v);
        }
        if let Ok(v) = raw.parse() {
            return Self::number(v);
        }
        Self::keyword(raw)
    }

    /// Numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number { value } | Self::Length { value, .. } => Some(*value),
            Self::Keyword { .. } => None,
        }
    }

    /// Whether [`interpolate`](Self::interpolate) blends continuously
    /// toward `to` rather than flipping.
    pub fn blends_with(&self, to: &Self) -> bool {
        match (self, to) {
            (Self::Number { .. }, Self::Number { .. }) => true,
            (Self::Length { unit: a, .. }, Self::Length { unit: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Interpolate toward `to` at `t`. Mismatched kinds and keywords are
    /// discrete.
    pub fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::Number { value: a }, Self::Number { value: b }) => Self::number(a + (b - a) * t),
            (Self::Length { value: a, unit: ua }, Self::Length { value: b, unit: ub })
                if ua == ub =>
            {
                Self::Length { value: a + (b - a) * t, unit: *ua }
            }
            _ => {
                if t < 0.5 {
                    self.clone()
                } else {
                    to.clone()
                }
            }
        }
    }
}

/// What an effect shows outside its active interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    None,
    Forwards,
    Backwards,
    /// Page transitions always fill both ways so a paused timeline at 0 or
    /// 100 still shows the edge keyframe.
    #[default]
    Both,
}

impl FillMode {
    pub fn applies_backwards(self) -> bool {
        matches!(self, Self::Backwards | Self::Both)
    }

    pub fn applies_forwards(self) -> bool {
        matches!(self, Self::Forwards | Self::Both)
    }
}

/// One keyframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position in [0, 1]; `None` means "space evenly".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    /// Easing for the segment starting at this keyframe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
    #[serde(default)]
    pub values: BTreeMap<String, AnimatedValue>,
}

impl Keyframe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(offset: f64) -> Self {
        Self { offset: Some(offset.clamp(0.0, 1.0)), ..Self::default() }
    }

    pub fn set(mut self, property: impl Into<String>, value: AnimatedValue) -> Self {
        self.values.insert(property.into(), value);
        self
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Horizontal and vertical translation in pixels.
    pub fn translate(self, x: f64, y: f64) -> Self {
        self.set(TRANSLATE_X, AnimatedValue::px(x)).set(TRANSLATE_Y, AnimatedValue::px(y))
    }

    pub fn opacity(self, opacity: f64) -> Self {
        self.set(OPACITY, AnimatedValue::number(opacity))
    }

    pub fn get(&self, property: &str) -> Option<&AnimatedValue> {
        self.values.get(property)
    }
}

/// Timing of one effect, mirroring the options of the host primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationOptions {
    pub duration_ms: f64,
    #[serde(default)]
    pub delay_ms: f64,
    #[serde(default)]
    pub easing: EasingFunction,
    #[serde(default)]
    pub fill: FillMode,
}

impl AnimationOptions {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            delay_ms: 0.0,
            easing: EasingFunction::Linear,
            fill: FillMode::Both,
        }
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    /// Delay plus active duration.
    pub fn end_time(&self) -> f64 {
        self.delay_ms + self.duration_ms
    }
}

/// An ordered keyframe list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyframeSet {
    pub frames: Vec<Keyframe>,
}

impl KeyframeSet {
    pub fn new(frames: Vec<Keyframe>) -> Self {
        Self { frames }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Offsets with the gaps filled in. Missing first/last offsets become 0
    /// and 1; interior gaps are distributed evenly between known offsets.
    pub fn computed_offsets(&self) -> Vec<f64> {
        let n = self.frames.len();
        let mut offsets: Vec<Option<f64>> = self.frames.iter().map(|k| k.offset).collect();
        match n {
            0 => return Vec::new(),
            1 => return vec![offsets[0].unwrap_or(1.0)],
            _ => {}
        }
        if offsets[0].is_none() {
            offsets[0] = Some(0.0);
        }
        if offsets[n - 1].is_none() {
            offsets[n - 1] = Some(1.0);
        }

        let mut i = 0;
        while i < n {
            if offsets[i].is_some() {
                i += 1;
                continue;
            }
            let prev = i - 1;
            let next = (i..n).find(|&j| offsets[j].is_some()).unwrap_or(n - 1);
            let (a, b) = (offsets[prev].unwrap_or(0.0), offsets[next].unwrap_or(1.0));
            let span = (next - prev) as f64;
            for j in i..next {
                offsets[j] = Some(a + (b - a) * (j - prev) as f64 / span);
            }
            i = next;
        }

        offsets.into_iter().map(|o| o.unwrap_or(0.0)).collect()
    }

    /// All properties touched by any keyframe.
    pub fn properties(&self) -> Vec<&str> {
        let mut props: Vec<&str> = self
            .frames
            .iter()
            .flat_map(|k| k.values.keys().map(String::as_str))
            .collect();
        props.sort_unstable();
        props.dedup();
        props
    }

    /// Sample every property at iteration progress `progress` in [0, 1]
    /// (already eased by the effect timing).
    pub fn sample(&self, progress: f64) -> BTreeMap<String, AnimatedValue> {
        let offsets = self.computed_offsets();
        let mut out = BTreeMap::new();
        for property in self.properties() {
            if let Some(value) = self.sample_property(property, progress, &offsets) {
                out.insert(property.to_string(), value);
            }
        }
        out
    }

    fn sample_property(&self, property: &str, progress: f64, offsets: &[f64]) -> Option<AnimatedValue> {
        // Only keyframes that specify the property take part.
        let stops: Vec<(f64, &Keyframe, &AnimatedValue)> = self
            .frames
            .iter()
            .zip(offsets)
            .filter_map(|(k, o)| k.get(property).map(|v| (*o, k, v)))
            .collect();

        let (first, last) = (stops.first()?, stops.last()?);
        if progress <= first.0 {
            return Some(first.2.clone());
        }
        if progress >= last.0 {
            return Some(last.2.clone());
        }

        let idx = stops.windows(2).position(|w| progress >= w[0].0 && progress <= w[1].0)?;
        let (from_offset, from_kf, from) = stops[idx];
        let (to_offset, _, to) = stops[idx + 1];
        let span = to_offset - from_offset;
        let local = if span > 0.0 { (progress - from_offset) / span } else { 1.0 };
        let eased = from_kf.easing.unwrap_or(EasingFunction::Linear).evaluate(local);
        Some(from.interpolate(to, eased))
    }
}

impl From<Vec<Keyframe>> for KeyframeSet {
    fn from(frames: Vec<Keyframe>) -> Self {
        Self::new(frames)
    }
}
