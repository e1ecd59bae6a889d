//! CMAC (tile coding) approximation: overlapping offset tilings

use super::{Approximator, TableApproximator, round_to, validate_ranges};
use crate::error::{Error, Result};

/// Discretizes observations through several parallel offset tilings
///
/// Each layer is a [`TableApproximator`] over the base cut-point ranges
/// shifted by a fractional offset of the original spacing, so that every
/// observation falls into a slightly different bucket per layer. Algorithms
/// sum the per-layer table values to approximate a continuous function.
#[derive(Debug, Clone)]
pub struct CmacApproximator {
    n_state_variables: usize,
    n_layers: usize,
    layers: Vec<TableApproximator>,
}

impl CmacApproximator {
    /// Create a CMAC approximator with `n_layers` offset tilings
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooFewLayers`] when `n_layers < 2`,
    /// [`Error::UnequalRangeIntervals`] when a range's consecutive gaps are
    /// not all equal, plus the common range-count validation errors.
    pub fn new(
        n_state_variables: usize,
        state_variables_ranges: Vec<Vec<f64>>,
        n_layers: usize,
    ) -> Result<Self> {
        validate_ranges(n_state_variables, &state_variables_ranges)?;
        if n_layers < 2 {
            return Err(Error::TooFewLayers { n_layers });
        }
        let layers_ranges = Self::generate_layers_ranges(&state_variables_ranges, n_layers)?;
        let layers = layers_ranges
            .into_iter()
            .map(|ranges| TableApproximator::new(n_state_variables, ranges))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            n_state_variables,
            n_layers,
            layers,
        })
    }

    /// Number of state variables this approximator expects
    pub fn n_state_variables(&self) -> usize {
        self.n_state_variables
    }

    /// Number of tiling layers
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    /// The per-layer table approximators
    pub fn layers(&self) -> &[TableApproximator] {
        &self.layers
    }

    /// Reachable flat state indices, per layer
    pub fn possible_states(&self) -> Vec<Vec<usize>> {
        self.layers
            .iter()
            .map(TableApproximator::possible_states)
            .collect()
    }

    /// Discrete state count per layer
    pub fn layer_state_counts(&self) -> Vec<usize> {
        self.layers.iter().map(TableApproximator::n_states).collect()
    }

    /// Split one cut-point range into `n_layers` parallel offset ranges
    ///
    /// Layer 0 is the base range. Layer `k` is the base range extended by
    /// one extra cut-point and shifted left by `k * gap / n_layers` relative
    /// to a virtual left border one full gap before the first cut-point.
    /// Ranges with fewer than two points cannot be offset meaningfully and
    /// are replicated unmodified. Cut-point values are rounded to 7 decimal
    /// places.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooFewLayers`] when `n_layers < 2` and
    /// [`Error::UnequalRangeIntervals`] when the consecutive gaps (compared
    /// after rounding to 3 decimal places) are not all equal.
    pub fn divide_variable_range_by_layers(
        range: &[f64],
        n_layers: usize,
    ) -> Result<Vec<Vec<f64>>> {
        if n_layers < 2 {
            return Err(Error::TooFewLayers { n_layers });
        }
        if range.len() < 2 {
            return Ok(vec![range.to_vec(); n_layers]);
        }
        let distances: Vec<f64> = range
            .windows(2)
            .map(|pair| round_to(pair[1] - pair[0], 3))
            .collect();
        if distances.iter().any(|&distance| distance != distances[0]) {
            return Err(Error::UnequalRangeIntervals {
                range: range.to_vec(),
            });
        }
        let distance = distances[0];
        let left_border = range[0] - distance;
        let range_step = distance / n_layers as f64;
        let mut layers_ranges = vec![range.to_vec()];
        for i in 1..n_layers {
            layers_ranges.push(
                (0..=range.len())
                    .map(|j| {
                        round_to(left_border + i as f64 * range_step + j as f64 * distance, 7)
                    })
                    .collect(),
            );
        }
        Ok(layers_ranges)
    }

    /// Apply the per-variable layer split and transpose into one full
    /// range-set per layer
    pub fn generate_layers_ranges(
        state_variables_ranges: &[Vec<f64>],
        n_layers: usize,
    ) -> Result<Vec<Vec<Vec<f64>>>> {
        let divided = state_variables_ranges
            .iter()
            .map(|range| Self::divide_variable_range_by_layers(range, n_layers))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..n_layers)
            .map(|layer| divided.iter().map(|ranges| ranges[layer].clone()).collect())
            .collect())
    }
}

impl Approximator for CmacApproximator {
    type State = Vec<usize>;

    fn approximate_state(&self, observation: &[f64]) -> Vec<usize> {
        self.layers
            .iter()
            .map(|layer| layer.approximate_state(observation))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_errors() {
        assert!(CmacApproximator::new(0, vec![], 2).is_err());
        assert!(CmacApproximator::new(2, vec![], 2).is_err());
        assert!(CmacApproximator::new(2, vec![vec![]], 2).is_err());
        assert!(CmacApproximator::new(2, vec![vec![], vec![], vec![]], 2).is_err());
        assert!(matches!(
            CmacApproximator::new(2, vec![vec![], vec![]], 1),
            Err(Error::TooFewLayers { n_layers: 1 })
        ));
    }

    #[test]
    fn divide_replicates_short_ranges() {
        assert_eq!(
            CmacApproximator::divide_variable_range_by_layers(&[], 2).unwrap(),
            vec![Vec::<f64>::new(), Vec::new()]
        );
        assert_eq!(
            CmacApproximator::divide_variable_range_by_layers(&[0.0], 3).unwrap(),
            vec![vec![0.0], vec![0.0], vec![0.0]]
        );
    }

    #[test]
    fn divide_offsets_layers() {
        assert_eq!(
            CmacApproximator::divide_variable_range_by_layers(&[1.0, 2.0, 3.0], 2).unwrap(),
            vec![vec![1.0, 2.0, 3.0], vec![0.5, 1.5, 2.5, 3.5]]
        );
        assert_eq!(
            CmacApproximator::divide_variable_range_by_layers(&[-0.9, 0.0, 0.9], 3).unwrap(),
            vec![
                vec![-0.9, 0.0, 0.9],
                vec![-1.5, -0.6, 0.3, 1.2],
                vec![-1.2, -0.3, 0.6, 1.5]
            ]
        );
    }

    #[test]
    fn divide_rejects_unequal_gaps() {
        assert!(matches!(
            CmacApproximator::divide_variable_range_by_layers(&[0.0, 1.0, 3.0], 2),
            Err(Error::UnequalRangeIntervals { .. })
        ));
    }

    #[test]
    fn layer_ranges_transpose_per_variable_splits() {
        let approximator = CmacApproximator::new(
            2,
            vec![vec![-1.0, 5.0], vec![1.0, 4.0, 7.0]],
            3,
        )
        .unwrap();
        let expected: Vec<Vec<Vec<f64>>> = vec![
            vec![vec![-1.0, 5.0], vec![1.0, 4.0, 7.0]],
            vec![vec![-5.0, 1.0, 7.0], vec![-1.0, 2.0, 5.0, 8.0]],
            vec![vec![-3.0, 3.0, 9.0], vec![0.0, 3.0, 6.0, 9.0]],
        ];
        for (layer, ranges) in approximator.layers().iter().zip(&expected) {
            assert_eq!(layer.state_variables_ranges(), ranges.as_slice());
        }
        assert_eq!(
            approximator.possible_states(),
            vec![
                (0..12).collect::<Vec<_>>(),
                (0..20).collect::<Vec<_>>(),
                (0..20).collect::<Vec<_>>()
            ]
        );
    }

    #[test]
    fn approximate_state_indexes_every_layer() {
        let cases: [(usize, Vec<Vec<f64>>, usize, Vec<f64>, Vec<usize>); 5] = [
            (2, vec![vec![0.0], vec![]], 3, vec![1.0, 5.0], vec![1, 1, 1]),
            (2, vec![vec![0.0], vec![0.0]], 3, vec![1.0, 1.0], vec![3, 3, 3]),
            (1, vec![vec![1.0, 2.0, 3.0]], 2, vec![2.4], vec![2, 2]),
            (
                2,
                vec![vec![0.0], vec![1.0, 2.0, 3.0]],
                2,
                vec![0.5, 2.6],
                vec![6, 8],
            ),
            (
                2,
                vec![vec![-1.0, 5.0], vec![1.0, 4.0, 7.0]],
                3,
                vec![2.0, 3.7],
                vec![5, 12, 7],
            ),
        ];
        for (n, ranges, n_layers, observation, expected) in cases {
            let approximator = CmacApproximator::new(n, ranges, n_layers).unwrap();
            assert_eq!(approximator.approximate_state(&observation), expected);
        }
    }
}
