//! Fuzzy approximation: membership-grade vectors per state variable

use super::{Approximator, round_to, validate_ranges};
use crate::error::{Error, Result};
use crate::fuzzy::FuzzySet;

/// Approximates observations as per-variable membership-grade vectors
///
/// One [`FuzzySet`] covers each state variable. When no explicit fuzzy sets
/// are supplied they are derived from the variable's cut-point range via
/// [`svr2mfr`](Self::svr2mfr): open-ended functions at both extremes and
/// overlapping triangles on the interior midpoints.
///
/// The fuzzy state space is continuous-weighted rather than enumerable, so
/// this variant has no `possible_states`; callers size their tables from
/// [`state_shape`](Self::state_shape) instead.
#[derive(Debug, Clone)]
pub struct FuzzyApproximator {
    n_state_variables: usize,
    fuzzy_sets: Vec<FuzzySet>,
    state_shape: Vec<usize>,
}

impl FuzzyApproximator {
    /// Create a fuzzy approximator with auto-derived fuzzy sets
    ///
    /// # Errors
    ///
    /// Returns the common range-count validation errors, or a membership
    /// ordering error if a supplied range is not ascending.
    pub fn new(n_state_variables: usize, state_variables_ranges: Vec<Vec<f64>>) -> Result<Self> {
        validate_ranges(n_state_variables, &state_variables_ranges)?;
        let fuzzy_sets = state_variables_ranges
            .iter()
            .map(|range| FuzzySet::from_membership_points(&Self::svr2mfr(range)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(n_state_variables, fuzzy_sets))
    }

    /// Create a fuzzy approximator with explicitly supplied fuzzy sets
    ///
    /// # Errors
    ///
    /// Returns [`Error::FuzzySetCountMismatch`] unless exactly one fuzzy set
    /// is supplied per state variable, plus the common range-count
    /// validation errors.
    pub fn with_fuzzy_sets(
        n_state_variables: usize,
        state_variables_ranges: Vec<Vec<f64>>,
        fuzzy_sets: Vec<FuzzySet>,
    ) -> Result<Self> {
        validate_ranges(n_state_variables, &state_variables_ranges)?;
        if fuzzy_sets.len() != n_state_variables {
            return Err(Error::FuzzySetCountMismatch {
                expected: n_state_variables,
                got: fuzzy_sets.len(),
            });
        }
        Ok(Self::from_parts(n_state_variables, fuzzy_sets))
    }

    fn from_parts(n_state_variables: usize, fuzzy_sets: Vec<FuzzySet>) -> Self {
        let state_shape = fuzzy_sets.iter().map(FuzzySet::len).collect();
        Self {
            n_state_variables,
            fuzzy_sets,
            state_shape,
        }
    }

    /// Number of state variables this approximator expects
    pub fn n_state_variables(&self) -> usize {
        self.n_state_variables
    }

    /// The fuzzy set covering each state variable
    pub fn fuzzy_sets(&self) -> &[FuzzySet] {
        &self.fuzzy_sets
    }

    /// Membership-function count per state variable
    pub fn state_shape(&self) -> &[usize] {
        &self.state_shape
    }

    /// Derive membership-function breakpoints from a cut-point range
    ///
    /// - An empty range produces no functions.
    /// - A single cut-point `v` produces two open half-functions split at `v`.
    /// - `N >= 2` ordered cut-points produce `N + 1` overlapping functions:
    ///   an open-ended function up to the first shifted midpoint, `N - 1`
    ///   interior triangles centered on successive midpoints with width equal
    ///   to the local spacing, and a final open-ended function from the last
    ///   midpoint upward.
    ///
    /// Boundary combination terms are rounded to 3 decimal places to keep the
    /// derived breakpoints deterministic and comparable.
    pub fn svr2mfr(state_variable_range: &[f64]) -> Vec<Vec<f64>> {
        const INF: f64 = f64::INFINITY;
        let svr = state_variable_range;
        let mut mfr = Vec::new();
        match svr.len() {
            0 => {}
            1 => {
                mfr.push(vec![-INF, -INF, svr[0], svr[0]]);
                mfr.push(vec![svr[0], svr[0], INF, INF]);
            }
            n => {
                for (i, pair) in svr.windows(2).enumerate() {
                    let delta = (pair[1] - pair[0]) / 2.0;
                    if i == 0 {
                        mfr.push(vec![
                            -INF,
                            -INF,
                            round_to(pair[0] - delta, 3),
                            round_to(pair[1] - delta, 3),
                        ]);
                    }
                    mfr.push(vec![
                        round_to(pair[0] - delta, 3),
                        round_to(pair[0] + delta, 3),
                        round_to(pair[1] + delta, 3),
                    ]);
                    if i == n - 2 {
                        mfr.push(vec![
                            round_to(pair[0] + delta, 3),
                            round_to(pair[1] + delta, 3),
                            INF,
                            INF,
                        ]);
                    }
                }
            }
        }
        mfr
    }
}

impl Approximator for FuzzyApproximator {
    type State = Vec<Vec<f64>>;

    fn approximate_state(&self, observation: &[f64]) -> Vec<Vec<f64>> {
        observation
            .iter()
            .zip(&self.fuzzy_sets)
            .map(|(&value, fuzzy_set)| fuzzy_set.membership_grades(value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn svr2mfr_single_point_splits_open_halves() {
        assert_eq!(
            FuzzyApproximator::svr2mfr(&[1.0]),
            vec![vec![-INF, -INF, 1.0, 1.0], vec![1.0, 1.0, INF, INF]]
        );
    }

    #[test]
    fn svr2mfr_two_points() {
        assert_eq!(
            FuzzyApproximator::svr2mfr(&[-0.2, 0.2]),
            vec![
                vec![-INF, -INF, -0.4, 0.0],
                vec![-0.4, 0.0, 0.4],
                vec![0.0, 0.4, INF, INF]
            ]
        );
    }

    #[test]
    fn svr2mfr_interior_triangles_on_midpoints() {
        assert_eq!(
            FuzzyApproximator::svr2mfr(&[0.0, 2.0, 5.0]),
            vec![
                vec![-INF, -INF, -1.0, 1.0],
                vec![-1.0, 1.0, 3.0],
                vec![0.5, 3.5, 6.5],
                vec![3.5, 6.5, INF, INF]
            ]
        );
        assert_eq!(
            FuzzyApproximator::svr2mfr(&[-0.86, -0.52, -0.18, 0.16]),
            vec![
                vec![-INF, -INF, -1.03, -0.69],
                vec![-1.03, -0.69, -0.35],
                vec![-0.69, -0.35, -0.01],
                vec![-0.35, -0.01, 0.33],
                vec![-0.01, 0.33, INF, INF]
            ]
        );
    }

    #[test]
    fn auto_derived_state_shape() {
        let cases: [(usize, Vec<Vec<f64>>, Vec<usize>); 4] = [
            (1, vec![vec![1.0]], vec![2]),
            (2, vec![vec![0.0], vec![1.0, 2.0]], vec![2, 3]),
            (
                3,
                vec![
                    vec![0.0, 1.0],
                    vec![3.0, 4.0, 5.0],
                    vec![6.0, 7.0, 8.0, 8.0],
                ],
                vec![3, 4, 5],
            ),
            (4, vec![vec![0.0], vec![1.0], vec![], vec![2.0]], vec![2, 2, 0, 2]),
        ];
        for (n, ranges, expected_shape) in cases {
            let approximator = FuzzyApproximator::new(n, ranges.clone()).unwrap();
            assert_eq!(approximator.fuzzy_sets().len(), n);
            for (fuzzy_set, range) in approximator.fuzzy_sets().iter().zip(&ranges) {
                let expected = match range.len() {
                    0 => 0,
                    1 => 2,
                    len => len + 1,
                };
                assert_eq!(fuzzy_set.len(), expected);
            }
            assert_eq!(approximator.state_shape(), expected_shape.as_slice());
        }
    }

    #[test]
    fn explicit_fuzzy_sets_must_match_variable_count() {
        assert!(matches!(
            FuzzyApproximator::with_fuzzy_sets(
                2,
                vec![vec![], vec![]],
                vec![FuzzySet::default()]
            ),
            Err(Error::FuzzySetCountMismatch { .. })
        ));
        assert!(matches!(
            FuzzyApproximator::with_fuzzy_sets(
                2,
                vec![vec![], vec![]],
                vec![FuzzySet::default(), FuzzySet::default(), FuzzySet::default()]
            ),
            Err(Error::FuzzySetCountMismatch { .. })
        ));
    }

    #[test]
    fn approximate_state_evaluates_each_variable() {
        let approximator =
            FuzzyApproximator::new(4, vec![vec![0.0], vec![1.0], vec![], vec![2.0]]).unwrap();
        let observation = [0.0, 1.0, 2.0, 3.0];
        let state = approximator.approximate_state(&observation);
        for (i, grades) in state.iter().enumerate() {
            assert_eq!(
                grades,
                &approximator.fuzzy_sets()[i].membership_grades(observation[i])
            );
        }
        assert_eq!(state, approximator.approximate_state(&observation));
    }
}
