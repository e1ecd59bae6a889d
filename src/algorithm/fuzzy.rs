//! Fuzzy algorithms: TD updates weighted by membership grades
//!
//! These variants require a fuzzy-approximated environment
//! ([`FuzzyStates`]). Discrete state indexing is replaced by the
//! membership-weight tensor [`phi`]: one action-value tensor per action,
//! updated by `q[a] += α·δ·phi(s)` and read back as the
//! phi-weighted mean. There is no fuzzy AHC variant.

use ndarray::{ArrayD, IxDyn};

use super::{Algorithm, AlgorithmCore, QConfig, RConfig, SarsaConfig, greedy_action_set};
use crate::environment::FuzzyStates;
use crate::error::Result;

/// Membership-weight tensor of a fuzzy state
///
/// The outer product of the per-variable grade vectors, laid out row-major
/// with the first variable as the most significant axis:
/// `phi[i0, i1, ..] = grades0[i0] * grades1[i1] * ..`.
pub fn phi(state: &[Vec<f64>]) -> ArrayD<f64> {
    let shape: Vec<usize> = state.iter().map(Vec::len).collect();
    let mut values = vec![1.0];
    for grades in state {
        let mut product = Vec::with_capacity(values.len() * grades.len());
        for &value in &values {
            for &grade in grades {
                product.push(value * grade);
            }
        }
        values = product;
    }
    ArrayD::from_shape_vec(IxDyn(&shape), values)
        .expect("outer product length matches the grade vector shape")
}

/// Per-action q tensors shaped like the environment's membership counts
fn action_tensors(state_shape: &[usize], n_actions: usize) -> Vec<ArrayD<f64>> {
    (0..n_actions)
        .map(|_| ArrayD::zeros(IxDyn(state_shape)))
        .collect()
}

/// Phi-weighted action values of a fuzzy state
///
/// Returns all zeros when the total membership mass is zero, keeping the
/// value defined without dividing by zero.
fn action_values(q: &[ArrayD<f64>], state: &[Vec<f64>]) -> Vec<f64> {
    let phi_s = phi(state);
    let mass = phi_s.sum();
    if mass == 0.0 {
        return vec![0.0; q.len()];
    }
    q.iter()
        .map(|tensor| (tensor * &phi_s).sum() / mass)
        .collect()
}

fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Fuzzy Q-learning
#[derive(Debug)]
pub struct FuzzyQ<E: FuzzyStates> {
    core: AlgorithmCore<E>,
    q: Vec<ArrayD<f64>>,
}

impl<E: FuzzyStates> FuzzyQ<E> {
    /// Create a fuzzy Q-learner shaped by the environment's membership
    /// counts
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: QConfig) -> Result<Self> {
        let state_shape = environment.state_shape();
        let core = AlgorithmCore::new(
            environment,
            config.lambd,
            config.epsilon,
            config.gamma,
            config.alpha,
        )?;
        let q = action_tensors(&state_shape, core.n_actions());
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

    /// The per-action value tensors
    pub fn q(&self) -> &[ArrayD<f64>] {
        &self.q
    }

    /// Phi-weighted action values at `state`
    pub fn action_values(&self, state: &[Vec<f64>]) -> Vec<f64> {
        action_values(&self.q, state)
    }

    /// All actions tied for the maximum phi-weighted value at `state`
    pub fn greedy_actions(&self, state: &[Vec<f64>]) -> Vec<usize> {
        greedy_action_set(self.action_values(state))
    }
}

impl<E: FuzzyStates> Algorithm for FuzzyQ<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let mut traces = (self.core.lambd > 0.0).then(|| {
            self.q
                .iter()
                .map(|tensor| ArrayD::<f64>::zeros(tensor.raw_dim()))
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
            let delta = reward + self.core.gamma * max_value(&self.action_values(&next_state))
                - self.action_values(&state)[action];

            let phi_s = phi(&state);
            if let Some(e) = traces.as_mut() {
                e[action] += &phi_s;
                for (tensor, trace) in self.q.iter_mut().zip(e.iter()) {
                    tensor.scaled_add(self.core.alpha * delta, trace);
                }
                let decay = self.core.gamma * self.core.lambd;
                for trace in e.iter_mut() {
                    trace.mapv_inplace(|value| value * decay);
                }
            } else {
                self.q[action].scaled_add(self.core.alpha * delta, &phi_s);
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
        self.core.variant_name("FQ")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// Fuzzy SARSA: on-policy, greedy selection without an exploration rate
#[derive(Debug)]
pub struct FuzzySarsa<E: FuzzyStates> {
    core: AlgorithmCore<E>,
    q: Vec<ArrayD<f64>>,
}

impl<E: FuzzyStates> FuzzySarsa<E> {
    /// Create a fuzzy SARSA learner shaped by the environment's membership
    /// counts
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: SarsaConfig) -> Result<Self> {
        let state_shape = environment.state_shape();
        let core =
            AlgorithmCore::new(environment, config.lambd, 0.0, config.gamma, config.alpha)?;
        let q = action_tensors(&state_shape, core.n_actions());
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

    /// The per-action value tensors
    pub fn q(&self) -> &[ArrayD<f64>] {
        &self.q
    }

    /// Phi-weighted action values at `state`
    pub fn action_values(&self, state: &[Vec<f64>]) -> Vec<f64> {
        action_values(&self.q, state)
    }

    /// All actions tied for the maximum phi-weighted value at `state`
    pub fn greedy_actions(&self, state: &[Vec<f64>]) -> Vec<usize> {
        greedy_action_set(self.action_values(state))
    }
}

impl<E: FuzzyStates> Algorithm for FuzzySarsa<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let mut traces = (self.core.lambd > 0.0).then(|| {
            self.q
                .iter()
                .map(|tensor| ArrayD::<f64>::zeros(tensor.raw_dim()))
                .collect::<Vec<_>>()
        });
        let mut state = self.core.environment.state();
        let greedy = self.greedy_actions(&state);
        let mut action = self.core.select_greedy(&greedy);

        loop {
            if render {
                self.core.environment.render();
            }

            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let greedy = self.greedy_actions(&next_state);
            let next_action = self.core.select_greedy(&greedy);
            let delta = reward
                + self.core.gamma * self.action_values(&next_state)[next_action]
                - self.action_values(&state)[action];

            let phi_s = phi(&state);
            if let Some(e) = traces.as_mut() {
                e[action] += &phi_s;
                for (tensor, trace) in self.q.iter_mut().zip(e.iter()) {
                    tensor.scaled_add(self.core.alpha * delta, trace);
                }
                let decay = self.core.gamma * self.core.lambd;
                for trace in e.iter_mut() {
                    trace.mapv_inplace(|value| value * decay);
                }
            } else {
                self.q[action].scaled_add(self.core.alpha * delta, &phi_s);
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
        self.core.variant_name("FSARSA")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// Fuzzy R-learning: undiscounted average-reward control
#[derive(Debug)]
pub struct FuzzyR<E: FuzzyStates> {
    core: AlgorithmCore<E>,
    beta: f64,
    q: Vec<ArrayD<f64>>,
}

impl<E: FuzzyStates> FuzzyR<E> {
    /// Create a fuzzy R-learner shaped by the environment's membership
    /// counts
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: RConfig) -> Result<Self> {
        let state_shape = environment.state_shape();
        let core =
            AlgorithmCore::new(environment, config.lambd, config.epsilon, 0.0, config.alpha)?;
        let q = action_tensors(&state_shape, core.n_actions());
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

    /// The per-action value tensors
    pub fn q(&self) -> &[ArrayD<f64>] {
        &self.q
    }

    /// Phi-weighted action values at `state`
    pub fn action_values(&self, state: &[Vec<f64>]) -> Vec<f64> {
        action_values(&self.q, state)
    }

    /// All actions tied for the maximum phi-weighted value at `state`
    pub fn greedy_actions(&self, state: &[Vec<f64>]) -> Vec<usize> {
        greedy_action_set(self.action_values(state))
    }
}

impl<E: FuzzyStates> Algorithm for FuzzyR<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let mut traces = (self.core.lambd > 0.0).then(|| {
            self.q
                .iter()
                .map(|tensor| ArrayD::<f64>::zeros(tensor.raw_dim()))
                .collect::<Vec<_>>()
        });
        let mut rho = 0.0;

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
            let delta = reward - rho + max_value(&self.action_values(&next_state))
                - self.action_values(&state)[action];

            let phi_s = phi(&state);
            if let Some(e) = traces.as_mut() {
                e[action] += &phi_s;
                for (tensor, trace) in self.q.iter_mut().zip(e.iter()) {
                    tensor.scaled_add(self.core.alpha * delta, trace);
                }
                let decay = self.core.lambd;
                for trace in e.iter_mut() {
                    trace.mapv_inplace(|value| value * decay);
                }
            } else {
                self.q[action].scaled_add(self.core.alpha * delta, &phi_s);
            }

            // ρ follows only greedy experience, judged against the updated tensors
            if self.greedy_actions(&state).contains(&action) {
                rho += self.beta
                    * (reward - rho + max_value(&self.action_values(&next_state))
                        - max_value(&self.action_values(&state)));
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
        self.core.variant_name("FR")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}
