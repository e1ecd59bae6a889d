//! Ready-to-use learning environments
//!
//! An environment composes a simulation [`Model`](models::Model) with an
//! optional state approximator and exposes the discretized (or raw) state,
//! the reward, the termination condition, and action application. Algorithms
//! drive environments exclusively through the [`Environment`] trait.

pub mod continuous;
pub mod grid;
pub mod models;

pub use continuous::{BallBeamEnvironment, CartPoleEnvironment, MountainCarEnvironment};
pub use grid::{GridConfig, GridEnvironment};
pub use models::{BallBeam, CartPole, GridAction, GridModel, Model, MountainCar};

/// A learning environment
///
/// One episode runs from [`clear`](Environment::clear) until
/// [`done`](Environment::done): the model hits an absorbing state or the
/// episode step log reaches `max_steps`. `clear` must be called at the start
/// of every episode.
pub trait Environment {
    /// The (approximated) state representation this environment exposes
    type State: Clone + PartialEq + std::fmt::Debug;

    /// Environment name, for session reporting
    fn name(&self) -> &'static str;

    /// Number of available actions
    fn n_actions(&self) -> usize;

    /// Current state
    fn state(&self) -> Self::State;

    /// Apply the action with the given index, recompute and log the state,
    /// and return it
    fn do_action(&mut self, action_index: usize) -> Self::State;

    /// Reward of the current state
    fn reward(&self) -> f64;

    /// Whether the current state ends the episode regardless of the step
    /// ceiling
    fn is_state_absorbing(&self) -> bool;

    /// Episode step ceiling
    fn max_steps(&self) -> usize;

    /// Number of states visited this episode
    fn episode_steps(&self) -> usize;

    /// Whether the episode is over
    fn done(&self) -> bool {
        self.is_state_absorbing() || self.episode_steps() >= self.max_steps()
    }

    /// Reset the model and the episode bookkeeping
    fn clear(&mut self);

    /// Draw the current model state
    fn render(&self);

    /// Release any rendering resource
    fn close(&mut self);
}

/// Environments with an enumerable flat state space
///
/// Implemented by grid worlds and table-approximated environments; the
/// classic algorithm family sizes its tables from it.
pub trait DiscreteStates: Environment<State = usize> {
    /// Total number of discrete states
    fn n_states(&self) -> usize;
}

/// Environments approximated through parallel CMAC tilings
///
/// The CMAC algorithm family keeps one table per layer, sized from the
/// per-layer state counts.
pub trait LayeredStates: Environment<State = Vec<usize>> {
    /// Discrete state count per tiling layer
    fn layer_state_counts(&self) -> Vec<usize>;
}

/// Environments approximated through fuzzy membership grades
///
/// The fuzzy algorithm family shapes one action-value tensor per action
/// from the membership-function counts.
pub trait FuzzyStates: Environment<State = Vec<Vec<f64>>> {
    /// Membership-function count per state variable
    fn state_shape(&self) -> Vec<usize>;
}
