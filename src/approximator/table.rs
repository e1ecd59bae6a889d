//! Table approximation: one flat discrete index per observation

use super::{Approximator, validate_ranges};
use crate::error::{Error, Result};

/// Discretizes observations into a single flat state index
///
/// Each state variable is bucketed against its ascending cut-point range
/// (`len + 1` buckets, an empty range collapsing the variable into one
/// bucket), then the per-variable bucket indices are flattened row-major
/// into one index over the full state space.
#[derive(Debug, Clone)]
pub struct TableApproximator {
    n_state_variables: usize,
    state_variables_ranges: Vec<Vec<f64>>,
    state_shape: Vec<usize>,
}

impl TableApproximator {
    /// Create a table approximator
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoStateVariables`] when `n_state_variables` is zero
    /// and [`Error::RangeCountMismatch`] unless exactly one (possibly empty)
    /// range is supplied per state variable.
    pub fn new(n_state_variables: usize, state_variables_ranges: Vec<Vec<f64>>) -> Result<Self> {
        validate_ranges(n_state_variables, &state_variables_ranges)?;
        let state_shape = state_variables_ranges
            .iter()
            .map(|ranges| ranges.len() + 1)
            .collect();
        Ok(Self {
            n_state_variables,
            state_variables_ranges,
            state_shape,
        })
    }

    /// Number of state variables this approximator expects
    pub fn n_state_variables(&self) -> usize {
        self.n_state_variables
    }

    /// The configured cut-point ranges
    pub fn state_variables_ranges(&self) -> &[Vec<f64>] {
        &self.state_variables_ranges
    }

    /// Bucket count per state variable
    pub fn state_shape(&self) -> &[usize] {
        &self.state_shape
    }

    /// Total number of discrete states
    pub fn n_states(&self) -> usize {
        self.state_shape.iter().product()
    }

    /// Every reachable flat state index
    pub fn possible_states(&self) -> Vec<usize> {
        (0..self.n_states()).collect()
    }

    /// Bucket index of `value` against ascending cut-points
    ///
    /// Returns the count of cut-points less than or equal to `value`
    /// (a right-open bucket index).
    pub fn approximate_state_variable(value: f64, ranges: &[f64]) -> usize {
        ranges.iter().filter(|&&cut| value >= cut).count()
    }

    /// Flatten per-variable bucket indices into one state index
    ///
    /// Mixed-radix, row-major: each index is weighted by the product of all
    /// shape dimensions strictly to its right.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateShapeLengthMismatch`] when `indices` and
    /// `shape` differ in length, and [`Error::StateExceedsShape`] when any
    /// index reaches its shape bound.
    pub fn encode_state(indices: &[usize], shape: &[usize]) -> Result<usize> {
        if indices.len() != shape.len() {
            return Err(Error::StateShapeLengthMismatch {
                variables: indices.len(),
                shape: shape.len(),
            });
        }
        for (i, (&index, &bound)) in indices.iter().zip(shape).enumerate() {
            if index >= bound {
                return Err(Error::StateExceedsShape {
                    index: i,
                    value: index,
                    bound,
                });
            }
        }
        Ok(indices
            .iter()
            .enumerate()
            .map(|(i, &index)| index * shape[i + 1..].iter().product::<usize>())
            .sum())
    }
}

impl Approximator for TableApproximator {
    type State = usize;

    fn approximate_state(&self, observation: &[f64]) -> usize {
        let indices: Vec<usize> = observation
            .iter()
            .zip(&self.state_variables_ranges)
            .map(|(&value, ranges)| Self::approximate_state_variable(value, ranges))
            .collect();
        Self::encode_state(&indices, &self.state_shape)
            .expect("observation must supply a value for every state variable")
    }
}
