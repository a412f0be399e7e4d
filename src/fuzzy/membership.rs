//! Membership functions: crisp value -> degree in `[0, 1]`.
//!
//! Two shapes are supported:
//!
//! - `line(v, min, max) = clamp01((v - min) / (max - min))`
//! - `triangle(v, min, middle, max)`: rising branch `(v - min) / (middle - min)` below
//!   `middle`, falling branch `(v - max) / (middle - max)` at or above it
//!
//! `line` with `max < min` is a falling ramp. That is how "low X" categories are
//! expressed, so the sign of a negative denominator must be kept as is.
//!
//! Shape parameters must be distinct wherever they form a denominator. `Shape::validate`
//! checks this when a policy table is loaded; the free functions do not.

use crate::domain::FuzzyVar;
use crate::error::EngineError;

/// Clamp to the unit interval.
pub fn clamp01(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

/// Linear ramp: 0 at `min`, 1 at `max`, clamped outside.
pub fn line(value: f64, min: f64, max: f64) -> f64 {
    clamp01((value - min) / (max - min))
}

/// Triangle peaking at `middle` with feet at `min` and `max`.
pub fn triangle(value: f64, min: f64, middle: f64, max: f64) -> f64 {
    if value < middle {
        clamp01((value - min) / (middle - min))
    } else {
        clamp01((value - max) / (middle - max))
    }
}

/// A membership shape with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Line { min: f64, max: f64 },
    Triangle { min: f64, middle: f64, max: f64 },
}

impl Shape {
    pub fn evaluate(&self, value: f64) -> f64 {
        match *self {
            Shape::Line { min, max } => line(value, min, max),
            Shape::Triangle { min, middle, max } => triangle(value, min, middle, max),
        }
    }

    /// Reject parameters that would divide by zero or are not finite.
    pub fn validate(&self, var: FuzzyVar) -> Result<(), EngineError> {
        let invalid = |reason: String| EngineError::InvalidShape { var, reason };
        match *self {
            Shape::Line { min, max } => {
                if !(min.is_finite() && max.is_finite()) {
                    return Err(invalid(format!("non-finite line bounds min={min}, max={max}")));
                }
                if min == max {
                    return Err(invalid(format!("line bounds must differ (min = max = {min})")));
                }
            }
            Shape::Triangle { min, middle, max } => {
                if !(min.is_finite() && middle.is_finite() && max.is_finite()) {
                    return Err(invalid(format!(
                        "non-finite triangle parameters min={min}, middle={middle}, max={max}"
                    )));
                }
                if middle == min || middle == max {
                    return Err(invalid(format!(
                        "triangle middle must differ from both feet (min={min}, middle={middle}, max={max})"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn line_rising_is_linear_between_bounds() {
        let (min, max) = (2.0, 10.0);
        assert_eq!(line(2.0, min, max), 0.0);
        assert_eq!(line(10.0, min, max), 1.0);
        assert_eq!(line(-100.0, min, max), 0.0);
        assert_eq!(line(100.0, min, max), 1.0);

        // Three interior samples must be collinear.
        let xs = [3.0, 5.0, 9.0];
        let ys: Vec<f64> = xs.iter().map(|&x| line(x, min, max)).collect();
        let slope_a = (ys[1] - ys[0]) / (xs[1] - xs[0]);
        let slope_b = (ys[2] - ys[1]) / (xs[2] - xs[1]);
        assert!((slope_a - slope_b).abs() < EPS);
        assert!((slope_a - 1.0 / 8.0).abs() < EPS);
    }

    #[test]
    fn line_falling_when_max_below_min() {
        // "low rate": 0 at 2%, 1 at -2%.
        assert_eq!(line(2.0, 2.0, -2.0), 0.0);
        assert_eq!(line(-2.0, 2.0, -2.0), 1.0);
        assert!((line(0.25, 2.0, -2.0) - 0.4375).abs() < EPS);
        assert_eq!(line(5.0, 2.0, -2.0), 0.0);
        assert_eq!(line(-7.0, 2.0, -2.0), 1.0);
    }

    #[test]
    fn triangle_peak_and_feet() {
        let (min, middle, max) = (0.0, 3.0, 7.0);
        assert_eq!(triangle(middle, min, middle, max), 1.0);
        assert_eq!(triangle(min, min, middle, max), 0.0);
        assert_eq!(triangle(max, min, middle, max), 0.0);
        assert!((triangle(1.5, min, middle, max) - 0.5).abs() < EPS);
        assert!((triangle(5.0, min, middle, max) - 0.5).abs() < EPS);
        assert_eq!(triangle(-1.0, min, middle, max), 0.0);
        assert_eq!(triangle(9.0, min, middle, max), 0.0);
    }

    #[test]
    fn triangle_with_min_above_middle_follows_branch_rule() {
        // Feet given in descending order: min=0, middle=-3, max=-10. Both branches
        // then have a negative denominator and saturate, so the degree is 1 everywhere.
        let (min, middle, max) = (0.0, -3.0, -10.0);
        assert_eq!(triangle(middle, min, middle, max), 1.0);
        // Below middle: (v - min)/(middle - min) = (-10 - 0)/(-3) > 1.
        assert_eq!(triangle(max, min, middle, max), 1.0);
        assert_eq!(triangle(-20.0, min, middle, max), 1.0);
        // At or above middle: (v - max)/(middle - max) = (0 + 10)/7 > 1.
        assert_eq!(triangle(min, min, middle, max), 1.0);
        assert_eq!(triangle(1.0, min, middle, max), 1.0);

        // Ascending feet around the same peak behave as a proper triangle.
        let (min, middle, max) = (-10.0, -3.0, 0.0);
        assert_eq!(triangle(middle, min, middle, max), 1.0);
        assert_eq!(triangle(min, min, middle, max), 0.0);
        assert_eq!(triangle(max, min, middle, max), 0.0);
        assert_eq!(triangle(1.0, min, middle, max), 0.0);
        assert!((triangle(-1.5, min, middle, max) - 0.5).abs() < EPS);

        // A middle outside [min, max] still uses the two-branch rule: with
        // min=0, max=7, middle=10, v=8 takes the rising branch 8/10.
        assert!((triangle(8.0, 0.0, 10.0, 7.0) - 0.8).abs() < EPS);
        // v=12 takes the falling branch (12 - 7)/(10 - 7) > 1, clamped.
        assert_eq!(triangle(12.0, 0.0, 10.0, 7.0), 1.0);
    }

    #[test]
    fn outputs_always_in_unit_interval() {
        let shapes = [
            Shape::Line { min: 16.85, max: 10.0 },
            Shape::Line { min: 5.0, max: 15.0 },
            Shape::Triangle { min: 0.0, middle: 3.0, max: 7.0 },
            Shape::Triangle { min: 0.0, middle: -3.0, max: -10.0 },
        ];
        let mut v = -50.0;
        while v <= 50.0 {
            for s in &shapes {
                let d = s.evaluate(v);
                assert!((0.0..=1.0).contains(&d), "{s:?} at {v} gave {d}");
            }
            v += 0.37;
        }
    }

    #[test]
    fn validate_rejects_degenerate_parameters() {
        let var = FuzzyVar::LowInflation;
        assert!(Shape::Line { min: 1.0, max: 1.0 }.validate(var).is_err());
        assert!(Shape::Line { min: f64::NAN, max: 1.0 }.validate(var).is_err());
        assert!(Shape::Triangle { min: 0.0, middle: 0.0, max: 7.0 }.validate(var).is_err());
        assert!(Shape::Triangle { min: 0.0, middle: 7.0, max: 7.0 }.validate(var).is_err());
        assert!(Shape::Triangle { min: 0.0, middle: 3.0, max: 7.0 }.validate(var).is_ok());

        let err = Shape::Line { min: 2.0, max: 2.0 }.validate(FuzzyVar::HighRate).unwrap_err();
        assert!(matches!(err, EngineError::InvalidShape { var: FuzzyVar::HighRate, .. }));
    }
}
