//! Temporal-difference learning algorithms
//!
//! Three families, one per state representation:
//!
//! - [`classic`] - AHC, Q-learning, SARSA and R-learning over a flat
//!   discrete state space (grid worlds or table-approximated environments)
//! - [`cmac`] - the same update rules replicated across parallel CMAC
//!   tiling layers
//! - [`fuzzy`] - Q, SARSA and R-learning weighted by fuzzy membership
//!   grades
//!
//! Which environments an algorithm accepts is a compile-time constraint:
//! the classic family requires [`DiscreteStates`](crate::environment::DiscreteStates),
//! the CMAC family [`LayeredStates`](crate::environment::LayeredStates) and
//! the fuzzy family [`FuzzyStates`](crate::environment::FuzzyStates), so an
//! incompatible pairing does not build.

pub mod classic;
pub mod cmac;
pub mod fuzzy;

pub use classic::{Ahc, QLearning, RLearning, Sarsa};
pub use cmac::{CmacAhc, CmacQ, CmacR, CmacSarsa};
pub use fuzzy::{FuzzyQ, FuzzyR, FuzzySarsa};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::session::{LearningSession, SessionConfig, SessionResult};

/// A learning algorithm driving its own environment
///
/// The learning-episode state machine is shared by every variant: select an
/// action, apply it, observe reward and next state, update the tables,
/// decay the traces, until the environment reports `done`. The driver
/// ([`learn`](Algorithm::learn) or a [`LearningSession`]) clears the
/// environment before each episode.
pub trait Algorithm {
    /// Run one learning episode to completion and return its step count
    ///
    /// The episode's step count is also appended to
    /// [`steps_per_episode`](Algorithm::steps_per_episode).
    fn run_learning_episode(&mut self, render: bool) -> Result<usize>;

    /// Reset the environment for a fresh episode
    fn clear_environment(&mut self);

    /// Step counts of every episode run so far
    fn steps_per_episode(&self) -> &[usize];

    /// Algorithm name, `Variant(lambda)` when traces are enabled else
    /// `Variant(0)`
    fn name(&self) -> String;

    /// Name of the driven environment, for session reporting
    fn environment_name(&self) -> &'static str;

    /// Number of episodes run so far
    fn episodes(&self) -> usize {
        self.steps_per_episode().len()
    }

    /// Whether the trailing episode window has converged
    fn is_learned(&self, steps_lte: usize, steps_gte: usize, window: usize) -> bool {
        is_learned(self.steps_per_episode(), steps_lte, steps_gte, window)
    }

    /// Run a learning session without observers
    fn learn(&mut self, config: &SessionConfig) -> Result<SessionResult>
    where
        Self: Sized,
    {
        LearningSession::new(config.clone()).run(self)
    }
}

/// Convergence check over the trailing episode window
///
/// True when at least `window` episodes were run and each of the last
/// `window` step counts is `<= steps_lte` or `>= steps_gte` - converged to
/// short or to long but stable episodes.
///
/// # Examples
///
/// ```
/// use rltoolbox::algorithm::is_learned;
///
/// let history = [40, 35, 30, 33, 25, 20, 19, 20, 18, 17, 19, 20];
/// assert!(is_learned(&history, 20, 10_000, 4));
/// assert!(!is_learned(&history, 19, 10_000, 5));
/// ```
pub fn is_learned(
    steps_per_episode: &[usize],
    steps_lte: usize,
    steps_gte: usize,
    window: usize,
) -> bool {
    if steps_per_episode.len() < window {
        return false;
    }
    steps_per_episode[steps_per_episode.len() - window..]
        .iter()
        .all(|&steps| steps >= steps_gte || steps <= steps_lte)
}

/// Hyperparameters of the AHC variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AhcConfig {
    /// Eligibility-trace decay; 0 disables traces
    pub lambd: f64,
    /// Exploration rate
    pub epsilon: f64,
    /// Discount factor
    pub gamma: f64,
    /// Critic learning rate
    pub alpha: f64,
    /// Actor (preference) learning rate
    pub beta: f64,
}

impl Default for AhcConfig {
    fn default() -> Self {
        Self {
            lambd: 0.0,
            epsilon: 0.005,
            gamma: 0.95,
            alpha: 0.1,
            beta: 0.01,
        }
    }
}

/// Hyperparameters of the Q-learning variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QConfig {
    /// Eligibility-trace decay; 0 disables traces
    pub lambd: f64,
    /// Exploration rate
    pub epsilon: f64,
    /// Discount factor
    pub gamma: f64,
    /// Learning rate
    pub alpha: f64,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            lambd: 0.0,
            epsilon: 0.005,
            gamma: 0.95,
            alpha: 0.1,
        }
    }
}

/// Hyperparameters of the SARSA variants (on-policy, no exploration rate)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarsaConfig {
    /// Eligibility-trace decay; 0 disables traces
    pub lambd: f64,
    /// Discount factor
    pub gamma: f64,
    /// Learning rate
    pub alpha: f64,
}

impl Default for SarsaConfig {
    fn default() -> Self {
        Self {
            lambd: 0.0,
            gamma: 0.95,
            alpha: 0.1,
        }
    }
}

/// Hyperparameters of the average-reward R-learning variants (undiscounted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RConfig {
    /// Eligibility-trace decay; 0 disables traces
    pub lambd: f64,
    /// Exploration rate
    pub epsilon: f64,
    /// Learning rate
    pub alpha: f64,
    /// Average-reward learning rate
    pub beta: f64,
}

impl Default for RConfig {
    fn default() -> Self {
        Self {
            lambd: 0.0,
            epsilon: 0.005,
            alpha: 0.1,
            beta: 0.01,
        }
    }
}

/// Build a random number generator, seeded or from entropy
pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// All indices holding the maximum value, compared exactly
pub(crate) fn greedy_action_set<I>(values: I) -> Vec<usize>
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = values.into_iter().collect();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value == max)
        .map(|(index, _)| index)
        .collect()
}

/// State shared by every algorithm variant: the driven environment, the
/// hyperparameters, the episode history and the action-selection RNG
#[derive(Debug)]
pub(crate) struct AlgorithmCore<E: Environment> {
    pub environment: E,
    pub actions: Vec<usize>,
    pub lambd: f64,
    pub epsilon: f64,
    pub gamma: f64,
    pub alpha: f64,
    pub steps_per_episode: Vec<usize>,
    pub rng: StdRng,
}

impl<E: Environment> AlgorithmCore<E> {
    pub fn new(
        environment: E,
        lambd: f64,
        epsilon: f64,
        gamma: f64,
        alpha: f64,
    ) -> Result<Self> {
        if lambd < 0.0 {
            return Err(Error::InvalidHyperparameter {
                name: "lambda",
                value: lambd,
            });
        }
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::InvalidHyperparameter {
                name: "epsilon",
                value: epsilon,
            });
        }
        let actions = (0..environment.n_actions()).collect();
        Ok(Self {
            environment,
            actions,
            lambd,
            epsilon,
            gamma,
            alpha,
            steps_per_episode: Vec::new(),
            rng: build_rng(None),
        })
    }

    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }

    /// ε-greedy selection: explore uniformly with probability ε, otherwise
    /// pick uniformly among the greedy-tied actions
    pub fn select_action(&mut self, greedy_actions: &[usize]) -> usize {
        if self.rng.random::<f64>() < self.epsilon {
            *self
                .actions
                .choose(&mut self.rng)
                .expect("environment exposes at least one action")
        } else {
            self.select_greedy(greedy_actions)
        }
    }

    /// Greedy selection with uniform random tie-breaking, no exploration
    pub fn select_greedy(&mut self, greedy_actions: &[usize]) -> usize {
        *greedy_actions
            .choose(&mut self.rng)
            .expect("greedy action set is never empty")
    }

    /// Close out a finished episode: log its step count and release the
    /// environment's rendering resources
    pub fn finish_episode(&mut self) -> usize {
        let steps = self.environment.episode_steps();
        self.steps_per_episode.push(steps);
        self.environment.close();
        steps
    }

    pub fn variant_name(&self, variant: &str) -> String {
        if self.lambd > 0.0 {
            format!("{variant}(lambda)")
        } else {
            format!("{variant}(0)")
        }
    }
}
