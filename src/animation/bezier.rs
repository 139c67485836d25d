//! Cubic Bézier timing curves, as in CSS `cubic-bezier()`.

/// Error allowed when solving for the curve parameter.
const EPSILON: f64 = 1e-7;
const NEWTON_ITERATIONS: usize = 8;

/// Timing curve from `(0, 0)` to `(1, 1)` shaped by two control points.
///
/// X is time and Y is progress. Both axes are kept as polynomials in the curve parameter, so
/// evaluation is a few multiplications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x: Cubic,
    y: Cubic,
}

/// `((a * t + b) * t + c) * t`, one coordinate of a Bézier curve with fixed end points `0` and
/// `1`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cubic {
    a: f64,
    b: f64,
    c: f64,
}

impl Cubic {
    fn from_control_points(p1: f64, p2: f64) -> Self {
        let c = 3. * p1;
        let b = 3. * (p2 - p1) - c;
        let a = 1. - c - b;
        Self { a, b, c }
    }

    fn at(self, t: f64) -> f64 {
        ((self.a * t + self.b) * t + self.c) * t
    }

    fn slope(self, t: f64) -> f64 {
        (3. * self.a * t + 2. * self.b) * t + self.c
    }
}

impl CubicBezier {
    /// Creates the curve with control points `(x1, y1)` and `(x2, y2)`.
    ///
    /// The X coordinates are clamped into `0..=1` so that time never runs backwards. Y is free,
    /// which allows overshoot.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: Cubic::from_control_points(x1.clamp(0., 1.), x2.clamp(0., 1.)),
            y: Cubic::from_control_points(y1, y2),
        }
    }

    /// Returns the progress at normalized time `x`, clamped to `0..=1`.
    pub fn progress(&self, x: f64) -> f64 {
        let x = x.clamp(0., 1.);
        if x <= 0. {
            0.
        } else if x >= 1. {
            1.
        } else {
            self.y.at(self.solve(x))
        }
    }

    /// Evaluates the curve in the `(t, b, c, d)` form.
    pub fn ease(&self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        if d <= 0. {
            return b + c;
        }
        b + c * self.progress(t / d)
    }

    /// Finds the curve parameter at which the X coordinate equals `x`.
    fn solve(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = self.x.at(t) - x;
            if err.abs() < EPSILON {
                return t.clamp(0., 1.);
            }

            let slope = self.x.slope(t);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= err / slope;
        }

        // Newton stalls on flat stretches, bisect instead. X is monotonic in `t` on `0..=1`.
        let (mut lo, mut hi) = (0., 1.);
        t = x;
        while hi - lo > EPSILON {
            let err = self.x.at(t) - x;
            if err.abs() < EPSILON {
                break;
            }
            if err > 0. {
                hi = t;
            } else {
                lo = t;
            }
            t = (lo + hi) / 2.;
        }
        t
    }
}
