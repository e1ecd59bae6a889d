//! Statistical aggregation of learning histories
//!
//! Experiments typically repeat a learning run several times and look at
//! the per-episode spread of the step counts. This module condenses a set
//! of `steps_per_episode` histories into median/min/max series; plotting
//! them is left to external consumers.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Max, Min, OrderStatistics};

/// Step-count spread of one episode index across repeated runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStatistics {
    /// Episode index
    pub episode: usize,
    /// Median step count across runs
    pub median: f64,
    /// Minimum step count across runs
    pub min: f64,
    /// Maximum step count across runs
    pub max: f64,
}

/// Summarize repeated learning histories episode by episode
///
/// Ragged histories are clipped to the shortest run. Returns an empty
/// summary when no histories are given.
pub fn summarize_histories(histories: &[Vec<usize>]) -> Vec<EpisodeStatistics> {
    let episodes = histories.iter().map(Vec::len).min().unwrap_or(0);
    (0..episodes)
        .map(|episode| {
            let values: Vec<f64> = histories
                .iter()
                .map(|history| history[episode] as f64)
                .collect();
            let mut data = Data::new(values);
            EpisodeStatistics {
                episode,
                median: data.median(),
                min: data.min(),
                max: data.max(),
            }
        })
        .collect()
}
