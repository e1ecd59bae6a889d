//! Fuzzy-set primitives: membership functions and ordered fuzzy sets
//!
//! A membership function maps a scalar to a degree of membership in `[0, 1]`.
//! Fuzzy approximation composes these into one [`FuzzySet`] per state
//! variable; the grade vectors they produce weight the learning updates of
//! the fuzzy algorithm family.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A membership function over a scalar input
///
/// Both shapes evaluate piecewise-linearly. Degenerate zero-width segments
/// (`a == b` or `c == d`) contribute grade 0 instead of dividing by zero,
/// which is what makes the open-ended functions produced by
/// [`crate::approximator::FuzzyApproximator::svr2mfr`] well defined at their
/// split points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MembershipFunction {
    /// Triangular function: linear ramp up on `[a, b]`, down on `[b, c]`
    Triangular { a: f64, b: f64, c: f64 },
    /// Trapezoidal function: ramp up on `[a, b]`, plateau 1 on `[b, c]`,
    /// ramp down on `[c, d]`
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
}

impl MembershipFunction {
    /// Create a triangular membership function
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderedMembershipPoints`] unless `a <= b <= c`.
    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self> {
        if !(a <= b && b <= c) {
            return Err(Error::UnorderedMembershipPoints {
                points: vec![a, b, c],
            });
        }
        Ok(MembershipFunction::Triangular { a, b, c })
    }

    /// Create a trapezoidal membership function
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderedMembershipPoints`] unless `a <= b <= c <= d`.
    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        if !(a <= b && b <= c && c <= d) {
            return Err(Error::UnorderedMembershipPoints {
                points: vec![a, b, c, d],
            });
        }
        Ok(MembershipFunction::Trapezoidal { a, b, c, d })
    }

    /// Build a membership function from a slice of breakpoints
    ///
    /// Three points build a triangular function, four a trapezoidal one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MembershipFunctionArity`] for any other number of
    /// points, or [`Error::UnorderedMembershipPoints`] if they are not
    /// non-decreasing.
    pub fn from_points(points: &[f64]) -> Result<Self> {
        match *points {
            [a, b, c] => Self::triangular(a, b, c),
            [a, b, c, d] => Self::trapezoidal(a, b, c, d),
            _ => Err(Error::MembershipFunctionArity { got: points.len() }),
        }
    }

    /// Degree of membership of `x`, in `[0, 1]`
    pub fn membership_grade(&self, x: f64) -> f64 {
        match *self {
            MembershipFunction::Triangular { a, b, c } => {
                if a <= x && x <= b {
                    if b == a { 0.0 } else { (x - a) / (b - a) }
                } else if b <= x && x <= c {
                    if c == b { 0.0 } else { (c - x) / (c - b) }
                } else {
                    0.0
                }
            }
            MembershipFunction::Trapezoidal { a, b, c, d } => {
                if a <= x && x <= b {
                    if b == a { 0.0 } else { (x - a) / (b - a) }
                } else if b <= x && x <= c {
                    1.0
                } else if c <= x && x <= d {
                    if d == c { 0.0 } else { (d - x) / (d - c) }
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for MembershipFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MembershipFunction::Triangular { a, b, c } => {
                write!(f, "Triangular({a}, {b}, {c})")
            }
            MembershipFunction::Trapezoidal { a, b, c, d } => {
                write!(f, "Trapezoidal({a}, {b}, {c}, {d})")
            }
        }
    }
}

/// An ordered collection of membership functions covering one state variable
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FuzzySet {
    membership_functions: Vec<MembershipFunction>,
}

impl FuzzySet {
    /// Create a fuzzy set from an ordered list of membership functions
    pub fn new(membership_functions: Vec<MembershipFunction>) -> Self {
        Self {
            membership_functions,
        }
    }

    /// Build a fuzzy set from rows of membership-function breakpoints
    ///
    /// Each row is passed to [`MembershipFunction::from_points`].
    ///
    /// # Errors
    ///
    /// Propagates the first arity or ordering error encountered.
    pub fn from_membership_points(points: &[Vec<f64>]) -> Result<Self> {
        let membership_functions = points
            .iter()
            .map(|row| MembershipFunction::from_points(row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(membership_functions))
    }

    /// The member functions, in construction order
    pub fn membership_functions(&self) -> &[MembershipFunction] {
        &self.membership_functions
    }

    /// Number of member functions
    pub fn len(&self) -> usize {
        self.membership_functions.len()
    }

    /// Whether this set has no member functions
    pub fn is_empty(&self) -> bool {
        self.membership_functions.is_empty()
    }

    /// Evaluate every member function at `x`, order-preserving
    pub fn membership_grades(&self, x: f64) -> Vec<f64> {
        self.membership_functions
            .iter()
            .map(|mf| mf.membership_grade(x))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangular_rejects_unordered_points() {
        for points in [(0.0, -1.0, 1.0), (0.0, 0.0, -1.0), (0.0, 1.0, 0.0)] {
            assert!(MembershipFunction::triangular(points.0, points.1, points.2).is_err());
        }
    }

    #[test]
    fn trapezoidal_rejects_unordered_points() {
        for points in [
            (0.0, -1.0, 1.0, 2.0),
            (0.0, 0.0, -1.0, 2.0),
            (0.0, 0.0, 0.0, -1.0),
        ] {
            assert!(
                MembershipFunction::trapezoidal(points.0, points.1, points.2, points.3).is_err()
            );
        }
    }

    #[test]
    fn triangular_grades() {
        let cases = [
            ((-1.0, 0.0, 1.0), -1.0, 0.0),
            ((-1.0, 0.0, 1.0), 1.0, 0.0),
            ((-1.0, 0.0, 1.0), 0.0, 1.0),
            ((-1.0, 0.0, 1.0), -0.5, 0.5),
            ((-1.0, 0.0, 1.0), 0.5, 0.5),
            ((-5.0, -2.0, 1.0), -3.5, 0.5),
            ((-3.0, 1.0, 2.0), 1.5, 0.5),
        ];
        for ((a, b, c), x, expected) in cases {
            let mf = MembershipFunction::triangular(a, b, c).unwrap();
            assert!(
                (mf.membership_grade(x) - expected).abs() < 1e-12,
                "grade of {x} under {mf}"
            );
        }
    }

    #[test]
    fn trapezoidal_grades() {
        let mf = MembershipFunction::trapezoidal(-5.0, -2.0, 1.0, 9.0).unwrap();
        assert_eq!(mf.membership_grade(-5.0), 0.0);
        assert_eq!(mf.membership_grade(-3.5), 0.5);
        assert_eq!(mf.membership_grade(-2.0), 1.0);
        assert_eq!(mf.membership_grade(-1.0), 1.0);
        assert_eq!(mf.membership_grade(1.0), 1.0);
        assert_eq!(mf.membership_grade(5.0), 0.5);
    }

    #[test]
    fn degenerate_segments_grade_zero() {
        let mf = MembershipFunction::triangular(0.0, 0.0, 1.0).unwrap();
        assert_eq!(mf.membership_grade(0.0), 0.0);
        let open = MembershipFunction::trapezoidal(1.0, 1.0, f64::INFINITY, f64::INFINITY).unwrap();
        assert_eq!(open.membership_grade(1.0), 0.0);
        assert_eq!(open.membership_grade(2.0), 1.0);
    }

    #[test]
    fn from_points_arity() {
        assert!(MembershipFunction::from_points(&[]).is_err());
        assert!(MembershipFunction::from_points(&[1.0]).is_err());
        assert!(MembershipFunction::from_points(&[1.0, 2.0]).is_err());
        assert!(MembershipFunction::from_points(&[3.0, 4.0, 5.0, 6.0, 7.0]).is_err());
        assert!(matches!(
            MembershipFunction::from_points(&[0.0, 1.0, 2.0]).unwrap(),
            MembershipFunction::Triangular { .. }
        ));
        assert!(matches!(
            MembershipFunction::from_points(&[0.0, 1.0, 2.0, 3.0]).unwrap(),
            MembershipFunction::Trapezoidal { .. }
        ));
    }

    #[test]
    fn membership_grades_preserve_order() {
        let mf1 = MembershipFunction::trapezoidal(0.0, 2.0, 4.0, 6.0).unwrap();
        let mf2 = MembershipFunction::triangular(-2.0, 0.0, 2.0).unwrap();
        let mf3 = MembershipFunction::triangular(4.0, 10.0, 12.0).unwrap();
        let set = FuzzySet::new(vec![mf1, mf2, mf3]);
        for x in [-1.5, 0.0, 1.0, 3.0, 5.0, 11.0] {
            assert_eq!(
                set.membership_grades(x),
                vec![
                    mf1.membership_grade(x),
                    mf2.membership_grade(x),
                    mf3.membership_grade(x)
                ]
            );
        }
    }
}
