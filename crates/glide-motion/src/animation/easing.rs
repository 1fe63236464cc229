//! Timing functions for page and shared element animations.
//!
//! Transitions name their easing the way the host animation primitive does
//! (`"ease-out"`, `"cubic-bezier(0.4, 0, 0.2, 1)"`, `"steps(4, end)"`), so
//! [`EasingFunction`] parses from and prints back to that syntax.
//!
//! ```
//! use glide_motion::animation::EasingFunction;
//!
//! let ease: EasingFunction = "ease-out".parse().unwrap();
//! assert!(ease.evaluate(0.5) > 0.5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GlideError;

/// Where the jump happens in a stepped timing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Jump at the start of each interval.
    Start,
    /// Jump at the end of each interval.
    #[default]
    End,
}

/// A timing function mapping linear progress to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing. Used while a gesture scrubs the timeline.
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    #[default]
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`. Default for programmatic playback.
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// Custom curve; x control points lie in [0, 1].
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Discrete jumps.
    Steps { count: u32, position: StepPosition },
}

impl EasingFunction {
    /// Evaluate at `t` (clamped to [0, 1]).
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::Ease => bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => bezier(x1, y1, x2, y2, t),
            Self::Steps { count, position } => steps(count.max(1), position, t),
        }
    }

    /// Build a cubic bezier curve, rejecting x control points outside [0, 1].
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, GlideError> {
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(GlideError::InvalidEasing(format!(
                "cubic-bezier({x1}, {y1}, {x2}, {y2})"
            )));
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            Self::Steps { count, position } => {
                let position = match position {
                    StepPosition::Start => "start",
                    StepPosition::End => "end",
                };
                write!(f, "steps({count}, {position})")
            }
        }
    }
}

impl FromStr for EasingFunction {
    type Err = GlideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || GlideError::InvalidEasing(trimmed.to_string());

        match trimmed {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            "step-start" => {
                return Ok(Self::Steps { count: 1, position: StepPosition::Start });
            }
            "step-end" => return Ok(Self::Steps { count: 1, position: StepPosition::End }),
            _ => {}
        }

        let (name, args) = trimmed
            .strip_suffix(')')
            .and_then(|rest| rest.split_once('('))
            .ok_or_else(invalid)?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();

        match name.trim() {
            "cubic-bezier" => {
                let values = args
                    .iter()
                    .map(|a| a.parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                match values.as_slice() {
                    [x1, y1, x2, y2] => Self::cubic_bezier(*x1, *y1, *x2, *y2),
                    _ => Err(invalid()),
                }
            }
            "steps" => {
                let count: u32 = args.first().and_then(|c| c.parse().ok()).ok_or_else(invalid)?;
                if count == 0 {
                    return Err(invalid());
                }
                let position = match args.get(1).copied() {
                    None | Some("end") | Some("jump-end") => StepPosition::End,
                    Some("start") | Some("jump-start") => StepPosition::Start,
                    Some(_) => return Err(invalid()),
                };
                Ok(Self::Steps { count, position })
            }
            _ => Err(invalid()),
        }
    }
}

/// Evaluate the y value of a unit cubic bezier at the parameter whose x is
/// `progress`. The parameter is found with Newton-Raphson, falling back to
/// bisection when the slope flattens out.
fn bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let curve = |a: f64, b: f64, t: f64| {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * a + 3.0 * mt * t * t * b + t * t * t
    };
    let slope = |a: f64, b: f64, t: f64| {
        let mt = 1.0 - t;
        3.0 * mt * mt * a + 6.0 * mt * t * (b - a) + 3.0 * t * t * (1.0 - b)
    };

    let mut t = progress;
    for _ in 0..8 {
        let err = curve(x1, x2, t) - progress;
        if err.abs() < 1e-7 {
            return curve(y1, y2, t);
        }
        let d = slope(x1, x2, t);
        if d.abs() < 1e-7 {
            break;
        }
        t = (t - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    t = progress;
    for _ in 0..40 {
        let x = curve(x1, x2, t);
        if (x - progress).abs() < 1e-7 {
            break;
        }
        if x < progress {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    curve(y1, y2, t)
}

fn steps(count: u32, position: StepPosition, t: f64) -> f64 {
    let n = f64::from(count);
    let value = match position {
        StepPosition::Start => (t * n).ceil() / n,
        StepPosition::End => (t * n).floor() / n,
    };
    value.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_linear_is_identity() {
        for t in [0.0, 0.2, 0.5, 0.8, 1.0] {
            assert!(close(EasingFunction::Linear.evaluate(t), t));
        }
    }

    #[test]
    fn test_standard_curves_hit_endpoints() {
        for ease in [
            EasingFunction::Ease,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
        ] {
            assert!(close(ease.evaluate(0.0), 0.0), "{ease} at 0");
            assert!(close(ease.evaluate(1.0), 1.0), "{ease} at 1");
        }
    }

    #[test]
    fn test_ease_out_runs_ahead_of_linear() {
        let ease = EasingFunction::EaseOut;
        assert!(ease.evaluate(0.25) > 0.25);
        assert!(ease.evaluate(0.5) > 0.5);
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let ease = EasingFunction::EaseInOut;
        assert!(close(ease.evaluate(0.5), 0.5));
        assert!(close(ease.evaluate(0.25) + ease.evaluate(0.75), 1.0));
    }

    #[test]
    fn test_input_is_clamped() {
        assert!(close(EasingFunction::Ease.evaluate(-1.0), 0.0));
        assert!(close(EasingFunction::Ease.evaluate(2.0), 1.0));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!("ease-out".parse::<EasingFunction>(), Ok(EasingFunction::EaseOut));
        assert_eq!(" linear ".parse::<EasingFunction>(), Ok(EasingFunction::Linear));
        assert_eq!(
            "step-start".parse::<EasingFunction>(),
            Ok(EasingFunction::Steps { count: 1, position: StepPosition::Start })
        );
    }

    #[test]
    fn test_parse_functions() {
        let bezier: EasingFunction = "cubic-bezier(0.4, 0, 0.2, 1)".parse().unwrap();
        assert_eq!(bezier, EasingFunction::CubicBezier { x1: 0.4, y1: 0.0, x2: 0.2, y2: 1.0 });

        let stepped: EasingFunction = "steps(4, end)".parse().unwrap();
        assert!(close(stepped.evaluate(0.3), 0.25));
        assert!(close(stepped.evaluate(1.0), 1.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("bouncy".parse::<EasingFunction>().is_err());
        assert!("cubic-bezier(1.5, 0, 0.2, 1)".parse::<EasingFunction>().is_err());
        assert!("steps(0)".parse::<EasingFunction>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for ease in [
            EasingFunction::Linear,
            EasingFunction::EaseInOut,
            EasingFunction::Steps { count: 3, position: StepPosition::Start },
        ] {
            assert_eq!(ease.to_string().parse::<EasingFunction>(), Ok(ease));
        }
    }
}
