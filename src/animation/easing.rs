use keyframe::functions::{EaseOutCubic, EaseOutQuad};
use keyframe::EasingFunction;

use super::bezier::CubicBezier;

/// Easing function in the classic `(t, b, c, d)` form.
///
/// Given elapsed time `t` in `0..=d`, start value `b`, total change `c` and duration `d`, returns
/// the value at time `t`.
pub type EaseFn = fn(f64, f64, f64, f64) -> f64;

/// Overshoot amount used by [`ease_out_back`].
pub const BACK_OVERSHOOT: f64 = 1.70158;

#[derive(Debug, Default, Clone, Copy)]
pub enum Curve {
    Linear,
    #[default]
    EaseOutQuad,
    EaseOutCubic,
    EaseOutExpo,
    /// Overshoots the target, then settles back onto it.
    EaseOutBack,
    CubicBezier(CubicBezier),
    Custom(EaseFn),
}

impl Curve {
    /// Returns the normalized progress for normalized time `x` in `0..=1`.
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::Linear => x,
            Curve::EaseOutQuad => EaseOutQuad.y(x),
            Curve::EaseOutCubic => EaseOutCubic.y(x),
            Curve::EaseOutExpo => ease_out_expo(x, 0., 1., 1.),
            Curve::EaseOutBack => ease_out_back(x, 0., 1., 1.),
            Curve::CubicBezier(bezier) => bezier.progress(x),
            Curve::Custom(f) => f(x, 0., 1., 1.),
        }
    }

    /// Evaluates the curve in the `(t, b, c, d)` form.
    ///
    /// The endpoints are exact: `t <= 0` gives `b` and `t >= d` gives `b + c`. The latter also
    /// covers a zero duration.
    pub fn ease(self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        if t >= d {
            return b + c;
        }
        if t <= 0. {
            return b;
        }

        match self {
            Curve::EaseOutExpo => ease_out_expo(t, b, c, d),
            Curve::EaseOutBack => ease_out_back(t, b, c, d),
            Curve::CubicBezier(bezier) => bezier.ease(t, b, c, d),
            Curve::Custom(f) => f(t, b, c, d),
            _ => self.y(t / d) * c + b,
        }
    }
}

impl From<elastic_pane_config::Curve> for Curve {
    fn from(value: elastic_pane_config::Curve) -> Self {
        match value {
            elastic_pane_config::Curve::Linear => Curve::Linear,
            elastic_pane_config::Curve::EaseOutQuad => Curve::EaseOutQuad,
            elastic_pane_config::Curve::EaseOutCubic => Curve::EaseOutCubic,
            elastic_pane_config::Curve::EaseOutExpo => Curve::EaseOutExpo,
            elastic_pane_config::Curve::EaseOutBack => Curve::EaseOutBack,
            elastic_pane_config::Curve::CubicBezier(x1, y1, x2, y2) => {
                Curve::CubicBezier(CubicBezier::new(x1, y1, x2, y2))
            }
        }
    }
}

pub fn linear(t: f64, b: f64, c: f64, d: f64) -> f64 {
    c * t / d + b
}

pub fn ease_out_expo(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == d {
        b + c
    } else {
        c * (-(2f64.powf(-10. * t / d)) + 1.) + b
    }
}

pub fn ease_out_back(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let s = BACK_OVERSHOOT;
    let t = t / d - 1.;
    c * (t * t * ((s + 1.) * t + s) + 1.) + b
}
