//! Classic tabular algorithms over a flat discrete state space
//!
//! These variants require an environment with an enumerable state space:
//! a grid world or a table-approximated continuous environment
//! ([`DiscreteStates`]).

use ndarray::{Array1, Array2};

use super::{AhcConfig, Algorithm, AlgorithmCore, QConfig, RConfig, SarsaConfig, greedy_action_set};
use crate::environment::DiscreteStates;
use crate::error::Result;

/// Adaptive Heuristic Critic: a learned state-value critic plus an action
/// preference actor
///
/// δ = r + γV(s') - V(s); V(s) += αδ and mi(s,a) += βδ, trace-accumulated
/// when λ > 0.
#[derive(Debug)]
pub struct Ahc<E: DiscreteStates> {
    core: AlgorithmCore<E>,
    beta: f64,
    v: Array1<f64>,
    preferences: Array2<f64>,
}

impl<E: DiscreteStates> Ahc<E> {
    /// Create an AHC learner over the environment's state space
    ///
    /// The critic V starts at 1 for every state, the preferences at 0.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: AhcConfig) -> Result<Self> {
        let n_states = environment.n_states();
        let core = AlgorithmCore::new(
            environment,
            config.lambd,
            config.epsilon,
            config.gamma,
            config.alpha,
        )?;
        let n_actions = core.n_actions();
        Ok(Self {
            core,
            beta: config.beta,
            v: Array1::ones(n_states),
            preferences: Array2::zeros((n_states, n_actions)),
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

    /// The state-value critic
    pub fn v(&self) -> &Array1<f64> {
        &self.v
    }

    /// The action-preference table
    pub fn preferences(&self) -> &Array2<f64> {
        &self.preferences
    }

    /// All actions tied for the maximum preference at `state`
    pub fn greedy_actions(&self, state: usize) -> Vec<usize> {
        greedy_action_set(self.preferences.row(state).iter().copied())
    }
}

impl<E: DiscreteStates> Algorithm for Ahc<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let mut traces = (self.core.lambd > 0.0).then(|| {
            (
                Array1::<f64>::zeros(self.v.dim()),
                Array2::<f64>::zeros(self.preferences.dim()),
            )
        });

        loop {
            if render {
                self.core.environment.render();
            }

            let state = self.core.environment.state();
            let greedy = self.greedy_actions(state);
            let action = self.core.select_action(&greedy);
            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let delta = reward + self.core.gamma * self.v[next_state] - self.v[state];

            if let Some((e_s, e_sa)) = traces.as_mut() {
                e_s[state] += 1.0;
                e_sa[[state, action]] += 1.0;
                self.v.scaled_add(self.core.alpha * delta, e_s);
                self.preferences.scaled_add(self.beta * delta, e_sa);
                let decay = self.core.gamma * self.core.lambd;
                e_s.mapv_inplace(|value| value * decay);
                e_sa.mapv_inplace(|value| value * decay);
            } else {
                self.v[state] += self.core.alpha * delta;
                self.preferences[[state, action]] += self.beta * delta;
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
        self.core.variant_name("AHC")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// Q-learning: off-policy TD control
///
/// Q(s,a) += α[r + γ max Q(s',·) - Q(s,a)], trace-accumulated when λ > 0.
#[derive(Debug)]
pub struct QLearning<E: DiscreteStates> {
    core: AlgorithmCore<E>,
    q: Array2<f64>,
}

impl<E: DiscreteStates> QLearning<E> {
    /// Create a Q-learning learner over the environment's state space
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: QConfig) -> Result<Self> {
        let n_states = environment.n_states();
        let core = AlgorithmCore::new(
            environment,
            config.lambd,
            config.epsilon,
            config.gamma,
            config.alpha,
        )?;
        let n_actions = core.n_actions();
        Ok(Self {
            core,
            q: Array2::zeros((n_states, n_actions)),
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

    /// The action-value table
    pub fn q(&self) -> &Array2<f64> {
        &self.q
    }

    /// All actions tied for the maximum Q-value at `state`
    pub fn greedy_actions(&self, state: usize) -> Vec<usize> {
        greedy_action_set(self.q.row(state).iter().copied())
    }

    fn max_q(&self, state: usize) -> f64 {
        self.q
            .row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl<E: DiscreteStates> Algorithm for QLearning<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let mut traces = (self.core.lambd > 0.0).then(|| Array2::<f64>::zeros(self.q.dim()));

        loop {
            if render {
                self.core.environment.render();
            }

            let state = self.core.environment.state();
            let greedy = self.greedy_actions(state);
            let action = self.core.select_action(&greedy);
            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let delta =
                reward + self.core.gamma * self.max_q(next_state) - self.q[[state, action]];

            if let Some(e) = traces.as_mut() {
                e[[state, action]] += 1.0;
                self.q.scaled_add(self.core.alpha * delta, e);
                let decay = self.core.gamma * self.core.lambd;
                e.mapv_inplace(|value| value * decay);
            } else {
                self.q[[state, action]] += self.core.alpha * delta;
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
        self.core.variant_name("Q")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// SARSA: on-policy TD control
///
/// Q(s,a) += α[r + γQ(s',a') - Q(s,a)] where a' is the action actually
/// selected next. Selection is greedy with random tie-breaking and no
/// exploration rate.
#[derive(Debug)]
pub struct Sarsa<E: DiscreteStates> {
    core: AlgorithmCore<E>,
    q: Array2<f64>,
}

impl<E: DiscreteStates> Sarsa<E> {
    /// Create a SARSA learner over the environment's state space
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: SarsaConfig) -> Result<Self> {
        let n_states = environment.n_states();
        let core =
            AlgorithmCore::new(environment, config.lambd, 0.0, config.gamma, config.alpha)?;
        let n_actions = core.n_actions();
        Ok(Self {
            core,
            q: Array2::zeros((n_states, n_actions)),
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

    /// The action-value table
    pub fn q(&self) -> &Array2<f64> {
        &self.q
    }

    /// All actions tied for the maximum Q-value at `state`
    pub fn greedy_actions(&self, state: usize) -> Vec<usize> {
        greedy_action_set(self.q.row(state).iter().copied())
    }
}

impl<E: DiscreteStates> Algorithm for Sarsa<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let mut traces = (self.core.lambd > 0.0).then(|| Array2::<f64>::zeros(self.q.dim()));
        let mut state = self.core.environment.state();
        let greedy = self.greedy_actions(state);
        let mut action = self.core.select_greedy(&greedy);

        loop {
            if render {
                self.core.environment.render();
            }

            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let greedy = self.greedy_actions(next_state);
            let next_action = self.core.select_greedy(&greedy);
            let delta = reward + self.core.gamma * self.q[[next_state, next_action]]
                - self.q[[state, action]];

            if let Some(e) = traces.as_mut() {
                e[[state, action]] += 1.0;
                self.q.scaled_add(self.core.alpha * delta, e);
                let decay = self.core.gamma * self.core.lambd;
                e.mapv_inplace(|value| value * decay);
            } else {
                self.q[[state, action]] += self.core.alpha * delta;
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
        self.core.variant_name("SARSA")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}

/// R-learning: undiscounted average-reward TD control
///
/// δ = r - ρ + max Q(s',·) - Q(s,a); the running average reward ρ moves by
/// β(r - ρ + max Q(s',·) - max Q(s,·)) only when the taken action was
/// greedy. Traces decay by λ alone (no discount).
#[derive(Debug)]
pub struct RLearning<E: DiscreteStates> {
    core: AlgorithmCore<E>,
    beta: f64,
    q: Array2<f64>,
}

impl<E: DiscreteStates> RLearning<E> {
    /// Create an R-learning learner over the environment's state space
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHyperparameter`] for an invalid
    /// configuration.
    pub fn new(environment: E, config: RConfig) -> Result<Self> {
        let n_states = environment.n_states();
        let core =
            AlgorithmCore::new(environment, config.lambd, config.epsilon, 0.0, config.alpha)?;
        let n_actions = core.n_actions();
        Ok(Self {
            core,
            beta: config.beta,
            q: Array2::zeros((n_states, n_actions)),
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

    /// The action-value table
    pub fn q(&self) -> &Array2<f64> {
        &self.q
    }

    /// All actions tied for the maximum Q-value at `state`
    pub fn greedy_actions(&self, state: usize) -> Vec<usize> {
        greedy_action_set(self.q.row(state).iter().copied())
    }

    fn max_q(&self, state: usize) -> f64 {
        self.q
            .row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl<E: DiscreteStates> Algorithm for RLearning<E> {
    fn run_learning_episode(&mut self, render: bool) -> Result<usize> {
        let mut traces = (self.core.lambd > 0.0).then(|| Array2::<f64>::zeros(self.q.dim()));
        let mut rho = 0.0;

        loop {
            if render {
                self.core.environment.render();
            }

            let state = self.core.environment.state();
            let greedy = self.greedy_actions(state);
            let action = self.core.select_action(&greedy);
            self.core.environment.do_action(action);
            let reward = self.core.environment.reward();
            let next_state = self.core.environment.state();
            let delta = reward - rho + self.max_q(next_state) - self.q[[state, action]];

            if let Some(e) = traces.as_mut() {
                e[[state, action]] += 1.0;
                self.q.scaled_add(self.core.alpha * delta, e);
                let decay = self.core.lambd;
                e.mapv_inplace(|value| value * decay);
            } else {
                self.q[[state, action]] += self.core.alpha * delta;
            }

            // ρ follows only greedy experience, judged against the updated table
            if self.greedy_actions(state).contains(&action) {
                rho += self.beta * (reward - rho + self.max_q(next_state) - self.max_q(state));
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
        self.core.variant_name("R")
    }

    fn environment_name(&self) -> &'static str {
        self.core.environment.name()
    }
}
