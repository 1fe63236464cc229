//! Animation primitives shared by the timeline and the ghost compositor.
//!
//! - `easing`: timing functions in the host's syntax
//! - `keyframes`: keyframes, animated values and effect timing
//! - `host`: the animation capability consumed from the host
//! - `presets`: screen animation descriptors and the preset library
//! - `software`: a clock-driven implementation of the host capability

pub mod easing;
pub mod host;
pub mod keyframes;
pub mod presets;
pub mod software;

pub use easing::{EasingFunction, StepPosition};
pub use host::{Animatable, AnimationHandle, BoxedAnimation, Completion, PlayState};
pub use keyframes::{
    AnimatedValue, AnimationOptions, FillMode, Keyframe, KeyframeSet, LengthUnit, OPACITY, SCALE,
    TRANSLATE_X, TRANSLATE_Y, Z_INDEX,
};
pub use presets::{
    AnimationConfig, AnimationDescriptor, AnimationDirection, AnimationKind, AnimationPair,
    AnimationRole, CustomOptions, ResolveContext, ResolvedAnimation, preset_keyframes,
};
pub use software::{
    AnimationId, RenderedStyle, SoftwareAnimation, SoftwareClock, SoftwareTarget, StyleCell,
};
