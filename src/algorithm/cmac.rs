//! CMAC algorithms: the classic update rules replicated across tiling layers
//!
//! These variants require a CMAC-approximated environment
//! ([`LayeredStates`]). Every layer keeps its own tables and TD error; the
//! per-layer learning-rate contribution is scaled by `1 / n_layers`, and
//! greedy selection aggregates action values by summing them across layers.
//! Eligibility bookkeeping is row-scoped: each step accumulates, applies and
//! decays the trace row of the visited layer state.

use ndarray::{Array1, Array2};

use super::{AhcConfig, Algorithm, AlgorithmCore, QConfig, RConfig, greedy_action_set};
use crate::environment::LayeredStates;
use crate::error::Result;

/// Sum per-layer action-value rows into one aggregate row
fn layer_sum(tables: &[Array2<f64>], state: &[usize], n_actions: usize) -> Array1<f64> {
    let mut sum = Array1::zeros(n_actions);
    for (table, &layer_state) in tables.iter().zip(state) {
        sum += &table.row(layer_state);
    }
    sum
}

fn max_row(table: &Array2<f64>, state: usize) -> f64 {
    table
        .row(state)
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Adaptive Heuristic Critic over CMAC tilings
///
/// One critic and one preference table per layer; the critic update bypasses
/// the traces, the preference update flows through the per-layer eligibility
/// matrix.
#[derive(Debug)]
pub struct CmacAhc<E: LayeredStates> {
    core: AlgorithmCore<E>,
    beta: f64,
    v: Vec<Array1<f64>>,
    preferences: Vec<Array2<f64>>,
}

impl<E: LayeredStates> CmacAhc<E> {
    /// Create a CMAC-AHC learner over the environment's tiling layers
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: AhcConfig) -> Result<Self> {
        let layer_state_counts = environment.layer_state_counts();
        let core = AlgorithmCore::new(
            environment,
            config.lambd,
            config.epsilon,
            config.gamma,
            config.alpha,
        )?;
        let n_actions = core.n_actions();
        let v = layer_state_counts
            .iter()
            .map(|&states| Array1::ones(states))
            .collect();
        let preferences = layer_state_counts
            .iter()
            .map(|&states| Array2::zeros((states, n_actions)))
            .collect();
        Ok(Self {
            core,
            beta: config.beta,
            v,
            preferences,
        })
    }

    /// Seed the action-selection RNG for a reproducible run
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.core.seed(seed);
        self
    }

    pub fn environment(&self) -> &E {
        &self.core.environment
    }

    /// The per-layer state-value critics
    pub fn v(&self) -> &[Array1<f64>] {
        &self.v
    }

    /// The per-layer action-preference tables
    pub fn preferences(&self) -> &[Array2<f64>] {
        &self.preferences
    }

    /// All actions tied for the maximum layer-summed preference at `state`
    pub fn greedy_actions(&self, state: &[usize]) -> Vec<usize> {
        greedy_action_set(layer_sum(&self.preferences, state, self.core.n_actions()))
    }
}

impl<E: LayeredStates> Algorithm for CmacAhc<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let n_layers = self.v.len();
        let mut traces = (self.core.lambd > 0.0).then(|| {
            self.preferences
                .iter()
                .map(|table| Array2::<f64>::zeros(table.dim()))
                .collect::<Vec<_>>()
        });

        loop {
            if render {
                self.core.environment.render();
            }

            let state = self.core.environment.state();
            let greedy = self.greedy_actions(&state);
            let action = self.core.select_action(&greedy);
            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let deltas: Vec<f64> = (0..n_layers)
                .map(|layer| {
                    reward + self.core.gamma * self.v[layer][next_state[layer]]
                        - self.v[layer][state[layer]]
                })
                .collect();

            for layer in 0..n_layers {
                self.v[layer][state[layer]] +=
                    self.core.alpha / n_layers as f64 * deltas[layer];
                if let Some(e) = traces.as_mut() {
                    e[layer][[state[layer], action]] += 1.0;
                    self.preferences[layer].scaled_add(self.beta * deltas[layer], &e[layer]);
                    let decay = self.core.gamma * self.core.lambd;
                    e[layer]
                        .row_mut(state[layer])
                        .mapv_inplace(|value| value * decay);
                } else {
                    self.preferences[layer][[state[layer], action]] +=
                        self.beta * deltas[layer];
                }
            }

            if self.core.environment.done() {
                return Ok(self.core.finish_episode());
            }
        }
    }

    fn clear_environment(&mut self) {
        self.core.environment.clear();
    }

    fn steps_per_episode(&self) -> &[usize] {
        &self.core.steps_per_episode
    }

    fn name(&self) -> String {
        self.core.variant_name("CMAC-AHC")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// Q-learning over CMAC tilings
#[derive(Debug)]
pub struct CmacQ<E: LayeredStates> {
    core: AlgorithmCore<E>,
    q: Vec<Array2<f64>>,
}

impl<E: LayeredStates> CmacQ<E> {
    /// Create a CMAC-Q learner over the environment's tiling layers
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: QConfig) -> Result<Self> {
        let layer_state_counts = environment.layer_state_counts();
        let core = AlgorithmCore::new(
            environment,
            config.lambd,
            config.epsilon,
            config.gamma,
            config.alpha,
        )?;
        let n_actions = core.n_actions();
        let q = layer_state_counts
            .iter()
            .map(|&states| Array2::zeros((states, n_actions)))
            .collect();
        Ok(Self { core, q })
    }

    /// Seed the action-selection RNG for a reproducible run
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.core.seed(seed);
        self
    }

    pub fn environment(&self) -> &E {
        &self.core.environment
    }

    /// The per-layer action-value tables
    pub fn q(&self) -> &[Array2<f64>] {
        &self.q
    }

    /// All actions tied for the maximum layer-summed Q-value at `state`
    pub fn greedy_actions(&self, state: &[usize]) -> Vec<usize> {
        greedy_action_set(layer_sum(&self.q, state, self.core.n_actions()))
    }

}

impl<E: LayeredStates> Algorithm for CmacQ<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let n_layers = self.q.len();
        let mut traces = (self.core.lambd > 0.0).then(|| {
            self.q
                .iter()
                .map(|table| Array2::<f64>::zeros(table.dim()))
                .collect::<Vec<_>>()
        });

        loop {
            if render {
                self.core.environment.render();
            }

            let state = self.core.environment.state();
            let greedy = self.greedy_actions(&state);
            let action = self.core.select_action(&greedy);
            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let deltas: Vec<f64> = (0..n_layers)
                .map(|layer| {
                    reward + self.core.gamma * max_row(&self.q[layer], next_state[layer])
                        - self.q[layer][[state[layer], action]]
                })
                .collect();

            for layer in 0..n_layers {
                let scale = self.core.alpha / n_layers as f64 * deltas[layer];
                if let Some(e) = traces.as_mut() {
                    e[layer][[state[layer], action]] += 1.0;
                    let trace_row = e[layer].row(state[layer]).to_owned();
                    self.q[layer]
                        .row_mut(state[layer])
                        .scaled_add(scale, &trace_row);
                    let decay = self.core.gamma * self.core.lambd;
                    e[layer]
                        .row_mut(state[layer])
                        .mapv_inplace(|value| value * decay);
                } else {
                    self.q[layer][[state[layer], action]] += scale;
                }
            }

            if self.core.environment.done() {
                return Ok(self.core.finish_episode());
            }
        }
    }

    fn clear_environment(&mut self) {
        self.core.environment.clear();
    }

    fn steps_per_episode(&self) -> &[usize] {
        &self.core.steps_per_episode
    }

    fn name(&self) -> String {
        self.core.variant_name("CMAC-Q")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// SARSA over CMAC tilings
///
/// Unlike the classic on-policy variant, the CMAC rendition keeps ε-greedy
/// selection for both the taken and the bootstrapped action.
#[derive(Debug)]
pub struct CmacSarsa<E: LayeredStates> {
    core: AlgorithmCore<E>,
    q: Vec<Array2<f64>>,
}

impl<E: LayeredStates> CmacSarsa<E> {
    /// Create a CMAC-SARSA learner over the environment's tiling layers
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: QConfig) -> Result<Self> {
        let layer_state_counts = environment.layer_state_counts();
        let core = AlgorithmCore::new(
            environment,
            config.lambd,
            config.epsilon,
            config.gamma,
            config.alpha,
        )?;
        let n_actions = core.n_actions();
        let q = layer_state_counts
            .iter()
            .map(|&states| Array2::zeros((states, n_actions)))
            .collect();
        Ok(Self { core, q })
    }

    /// Seed the action-selection RNG for a reproducible run
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.core.seed(seed);
        self
    }

    pub fn environment(&self) -> &E {
        &self.core.environment
    }

    /// The per-layer action-value tables
    pub fn q(&self) -> &[Array2<f64>] {
        &self.q
    }

    /// All actions tied for the maximum layer-summed Q-value at `state`
    pub fn greedy_actions(&self, state: &[usize]) -> Vec<usize> {
        greedy_action_set(layer_sum(&self.q, state, self.core.n_actions()))
    }
}

impl<E: LayeredStates> Algorithm for CmacSarsa<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let n_layers = self.q.len();
        let mut traces = (self.core.lambd > 0.0).then(|| {
            self.q
                .iter()
                .map(|table| Array2::<f64>::zeros(table.dim()))
                .collect::<Vec<_>>()
        });
        let mut state = self.core.environment.state();
        let greedy = self.greedy_actions(&state);
        let mut action = self.core.select_action(&greedy);

        loop {
            if render {
                self.core.environment.render();
            }

            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let greedy = self.greedy_actions(&next_state);
            let next_action = self.core.select_action(&greedy);
            let deltas: Vec<f64> = (0..n_layers)
                .map(|layer| {
                    reward
                        + self.core.gamma * self.q[layer][[next_state[layer], next_action]]
                        - self.q[layer][[state[layer], action]]
                })
                .collect();

            for layer in 0..n_layers {
                let scale = self.core.alpha / n_layers as f64 * deltas[layer];
                if let Some(e) = traces.as_mut() {
                    e[layer][[state[layer], action]] += 1.0;
                    let trace_row = e[layer].row(state[layer]).to_owned();
                    self.q[layer]
                        .row_mut(state[layer])
                        .scaled_add(scale, &trace_row);
                    let decay = self.core.gamma * self.core.lambd;
                    e[layer]
                        .row_mut(state[layer])
                        .mapv_inplace(|value| value * decay);
                } else {
                    self.q[layer][[state[layer], action]] += scale;
                }
            }

            if self.core.environment.done() {
                return Ok(self.core.finish_episode());
            }
            state = next_state;
            action = next_action;
        }
    }

    fn clear_environment(&mut self) {
        self.core.environment.clear();
    }

    fn steps_per_episode(&self) -> &[usize] {
        &self.core.steps_per_episode
    }

    fn name(&self) -> String {
        self.core.variant_name("CMAC-SARSA")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// R-learning over CMAC tilings
///
/// Keeps one running average reward per layer; traces decay by λ alone.
#[derive(Debug)]
pub struct CmacR<E: LayeredStates> {
    core: AlgorithmCore<E>,
    beta: f64,
    q: Vec<Array2<f64>>,
}

impl<E: LayeredStates> CmacR<E> {
    /// Create a CMAC-R learner over the environment's tiling layers
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: RConfig) -> Result<Self> {
        let layer_state_counts = environment.layer_state_counts();
        let core =
            AlgorithmCore::new(environment, config.lambd, config.epsilon, 0.0, config.alpha)?;
        let n_actions = core.n_actions();
        let q = layer_state_counts
            .iter()
            .map(|&states| Array2::zeros((states, n_actions)))
            .collect();
        Ok(Self {
            core,
            beta: config.beta,
            q,
        })
    }

    /// Seed the action-selection RNG for a reproducible run
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.core.seed(seed);
        self
    }

    pub fn environment(&self) -> &E {
        &self.core.environment
    }

    /// The per-layer action-value tables
    pub fn q(&self) -> &[Array2<f64>] {
        &self.q
    }

    /// All actions tied for the maximum layer-summed Q-value at `state`
    pub fn greedy_actions(&self, state: &[usize]) -> Vec<usize> {
        greedy_action_set(layer_sum(&self.q, state, self.core.n_actions()))
    }
}

impl<E: LayeredStates> Algorithm for CmacR<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let n_layers = self.q.len();
        let mut traces = (self.core.lambd > 0.0).then(|| {
            self.q
                .iter()
                .map(|table| Array2::<f64>::zeros(table.dim()))
                .collect::<Vec<_>>()
        });
        let mut rho = vec![0.0; n_layers];

        loop {
            if render {
                self.core.environment.render();
            }

            let state = self.core.environment.state();
            let greedy = self.greedy_actions(&state);
            let action = self.core.select_action(&greedy);
            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let deltas: Vec<f64> = (0..n_layers)
                .map(|layer| {
                    reward - rho[layer] + max_row(&self.q[layer], next_state[layer])
                        - self.q[layer][[state[layer], action]]
                })
                .collect();

            for layer in 0..n_layers {
                let scale = self.core.alpha / n_layers as f64 * deltas[layer];
                if let Some(e) = traces.as_mut() {
                    e[layer][[state[layer], action]] += 1.0;
                    let trace_row = e[layer].row(state[layer]).to_owned();
                    self.q[layer]
                        .row_mut(state[layer])
                        .scaled_add(scale, &trace_row);
                    let decay = self.core.lambd;
                    e[layer]
                        .row_mut(state[layer])
                        .mapv_inplace(|value| value * decay);
                } else {
                    self.q[layer][[state[layer], action]] += scale;
                }
            }

            // ρ follows only greedy experience, judged against the updated tables
            if self.greedy_actions(&state).contains(&action) {
                for layer in 0..n_layers {
                    rho[layer] += self.beta
                        * (reward - rho[layer] + max_row(&self.q[layer], next_state[layer])
                            - max_row(&self.q[layer], state[layer]));
                }
            }

            if self.core.environment.done() {
                return Ok(self.core.finish_episode());
            }
        }
    }

    fn clear_environment(&mut self) {
        self.core.environment.clear();
    }

    fn steps_per_episode(&self) -> &[usize] {
        &self.core.steps_per_episode
    }

    fn name(&self) -> String {
        self.core.variant_name("CMAC-R")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}
