//! Continuous-state environments over the physical models
//!
//! These environments are generic over their state approximator. They start
//! out with the [`Passthrough`] identity approximator (the raw observation
//! is the state) and [`approximate_with`](BallBeamEnvironment::approximate_with)
//! is the one-time configuration step that attaches a real approximator,
//! changing the exposed state type and forcing a state recomputation.

use std::f64::consts::PI;

use super::models::{BallBeam, CartPole, Model, MountainCar};
use super::{DiscreteStates, Environment, FuzzyStates, LayeredStates};
use crate::approximator::{
    Approximator, CmacApproximator, FuzzyApproximator, Passthrough, TableApproximator,
};
use crate::error::Result;

/// Default episode step ceiling for continuous environments
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Shared model/approximator composition behind the continuous environments
#[derive(Debug, Clone)]
struct ContinuousCore<M: Model<Control = f64>, A: Approximator> {
    model: M,
    approximator: A,
    actions: Vec<f64>,
    state_variables_ranges: Vec<Vec<f64>>,
    max_steps: usize,
    state: A::State,
    steps: Vec<A::State>,
}

impl<M: Model<Control = f64> + Default> ContinuousCore<M, Passthrough> {
    fn new(actions: Vec<f64>, state_variables_ranges: Vec<Vec<f64>>) -> Self {
        let model = M::default();
        let state = Passthrough.approximate_state(&model.observation());
        Self {
            model,
            approximator: Passthrough,
            actions,
            state_variables_ranges,
            max_steps: DEFAULT_MAX_STEPS,
            state,
            steps: Vec::new(),
        }
    }
}

impl<M: Model<Control = f64>, A: Approximator> ContinuousCore<M, A> {
    fn get_state(&self) -> A::State {
        self.approximator
            .approximate_state(&self.model.observation())
    }

    fn do_action(&mut self, action_index: usize) -> A::State {
        let control = self.actions[action_index];
        self.model.step(Some(control));
        self.state = self.get_state();
        self.steps.push(self.state.clone());
        self.state.clone()
    }

    fn clear(&mut self) {
        self.model.reset();
        self.state = self.get_state();
        self.steps.clear();
    }

    fn with_approximator<A2: Approximator>(self, approximator: A2) -> ContinuousCore<M, A2> {
        let state = approximator.approximate_state(&self.model.observation());
        ContinuousCore {
            model: self.model,
            approximator,
            actions: self.actions,
            state_variables_ranges: self.state_variables_ranges,
            max_steps: self.max_steps,
            state,
            steps: Vec::new(),
        }
    }
}

macro_rules! continuous_environment_impl {
    ($environment:ident, $model:ty) => {
        impl $environment<Passthrough> {
            /// Override the episode step ceiling
            pub fn with_max_steps(mut self, max_steps: usize) -> Self {
                self.core.max_steps = max_steps;
                self
            }

            /// Override the default discretization cut-points
            ///
            /// Takes effect when an approximator is attached; must be called
            /// before [`approximate_with`](Self::approximate_with).
            pub fn with_state_variables_ranges(mut self, ranges: Vec<Vec<f64>>) -> Self {
                self.core.state_variables_ranges = ranges;
                self
            }

            /// Attach a state approximator built from this environment's
            /// variable count and configured cut-point ranges
            ///
            /// # Errors
            ///
            /// Propagates the approximator's construction error.
            pub fn approximate_with<A2, F>(self, build: F) -> Result<$environment<A2>>
            where
                A2: Approximator,
                F: FnOnce(usize, Vec<Vec<f64>>) -> Result<A2>,
            {
                let n_state_variables = self.core.model.observation().len();
                let approximator =
                    build(n_state_variables, self.core.state_variables_ranges.clone())?;
                Ok($environment {
                    core: self.core.with_approximator(approximator),
                })
            }
        }

        impl Default for $environment<Passthrough> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<A: Approximator> $environment<A> {
            /// The underlying model
            pub fn model(&self) -> &$model {
                &self.core.model
            }

            /// The attached approximator
            pub fn approximator(&self) -> &A {
                &self.core.approximator
            }

            /// The configured discretization cut-points
            pub fn state_variables_ranges(&self) -> &[Vec<f64>] {
                &self.core.state_variables_ranges
            }

            /// The control values the action indices map to
            pub fn actions(&self) -> &[f64] {
                &self.core.actions
            }
        }

        impl DiscreteStates for $environment<TableApproximator> {
            fn n_states(&self) -> usize {
                self.core.approximator.n_states()
            }
        }

        impl LayeredStates for $environment<CmacApproximator> {
            fn layer_state_counts(&self) -> Vec<usize> {
                self.core.approximator.layer_state_counts()
            }
        }

        impl FuzzyStates for $environment<FuzzyApproximator> {
            fn state_shape(&self) -> Vec<usize> {
                self.core.approximator.state_shape().to_vec()
            }
        }
    };
}

macro_rules! environment_trait_impl {
    ($name:literal) => {
        fn name(&self) -> &'static str {
            $name
        }

        fn n_actions(&self) -> usize {
            self.core.actions.len()
        }

        fn state(&self) -> Self::State {
            self.core.state.clone()
        }

        fn do_action(&mut self, action_index: usize) -> Self::State {
            self.core.do_action(action_index)
        }

        fn max_steps(&self) -> usize {
            self.core.max_steps
        }

        fn episode_steps(&self) -> usize {
            self.core.steps.len()
        }

        fn clear(&mut self) {
            self.core.clear();
        }

        fn render(&self) {
            self.core.model.render();
        }

        fn close(&mut self) {
            self.core.model.close();
        }
    };
}

/// Ball balancing on a tilting beam
///
/// Actions tilt the beam; the episode ends with reward -1 when the ball
/// rolls off either end.
#[derive(Debug, Clone)]
pub struct BallBeamEnvironment<A: Approximator = Passthrough> {
    core: ContinuousCore<BallBeam, A>,
}

impl BallBeamEnvironment<Passthrough> {
    pub fn new() -> Self {
        Self {
            core: ContinuousCore::new(
                vec![-PI / 4.0, -PI / 8.0, PI / 8.0, PI / 4.0],
                vec![vec![-0.2, 0.2], vec![-0.2, 0.2]],
            ),
        }
    }
}

continuous_environment_impl!(BallBeamEnvironment, BallBeam);

impl<A: Approximator> Environment for BallBeamEnvironment<A> {
    type State = A::State;

    environment_trait_impl!("BallBeam");

    fn reward(&self) -> f64 {
        if self.is_state_absorbing() { -1.0 } else { 0.0 }
    }

    fn is_state_absorbing(&self) -> bool {
        self.core.model.ball_position().abs() >= BallBeam::BEAM_LENGTH / 2.0
    }
}

/// Car climbing a hill
///
/// Actions accelerate the car; the episode ends with reward 1 when it
/// reaches the rightmost position.
#[derive(Debug, Clone)]
pub struct MountainCarEnvironment<A: Approximator = Passthrough> {
    core: ContinuousCore<MountainCar, A>,
}

impl MountainCarEnvironment<Passthrough> {
    pub fn new() -> Self {
        Self {
            core: ContinuousCore::new(
                vec![-1.0, 0.0, 1.0],
                vec![
                    vec![-0.86, -0.52, -0.18, 0.16],
                    vec![-0.042, -0.014, 0.014, 0.042],
                ],
            ),
        }
    }
}

continuous_environment_impl!(MountainCarEnvironment, MountainCar);

impl<A: Approximator> Environment for MountainCarEnvironment<A> {
    type State = A::State;

    environment_trait_impl!("MountainCar");

    fn reward(&self) -> f64 {
        if self.is_state_absorbing() { 1.0 } else { 0.0 }
    }

    fn is_state_absorbing(&self) -> bool {
        self.core.model.car_position() == MountainCar::MAX_POSITION
    }
}

/// Pole balancing on a force-driven cart
///
/// Actions push the cart left or right; the episode ends with reward -1
/// when the pole leans more than 12 degrees.
#[derive(Debug, Clone)]
pub struct CartPoleEnvironment<A: Approximator = Passthrough> {
    core: ContinuousCore<CartPole, A>,
}

impl CartPoleEnvironment<Passthrough> {
    pub fn new() -> Self {
        Self {
            core: ContinuousCore::new(
                vec![-10.0, 10.0],
                vec![
                    vec![-1.44, -0.48, 0.48, 1.44],
                    vec![-2.0 / 3.0, 2.0 / 3.0],
                    vec![
                        (-7.2f64).to_radians(),
                        (-2.4f64).to_radians(),
                        2.4f64.to_radians(),
                        7.2f64.to_radians(),
                    ],
                    vec![(-400.0f64 / 3.0).to_radians(), (400.0f64 / 3.0).to_radians()],
                ],
            ),
        }
    }
}

continuous_environment_impl!(CartPoleEnvironment, CartPole);

impl<A: Approximator> Environment for CartPoleEnvironment<A> {
    type State = A::State;

    environment_trait_impl!("CartPole");

    fn reward(&self) -> f64 {
        if self.is_state_absorbing() { -1.0 } else { 0.0 }
    }

    fn is_state_absorbing(&self) -> bool {
        self.core.model.pole_angle().abs() > 12.0f64.to_radians()
    }
}
