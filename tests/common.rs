//! Common test fixtures: fake models, environments and grids
//!
//! The fake continuous environment never absorbs and pays a constant reward
//! of 1, so every episode runs to the step ceiling and every TD update sees
//! a nonzero error. The fake grids end episodes quickly on their absorbing
//! border/goal cells.

#![allow(dead_code)]

use ndarray::Array2;
use rltoolbox::approximator::{
    Approximator, CmacApproximator, FuzzyApproximator, TableApproximator,
};
use rltoolbox::environment::{
    DiscreteStates, Environment, FuzzyStates, GridConfig, GridEnvironment, LayeredStates, Model,
};

/// Two observed variables with simple additive dynamics
pub struct FakeModel {
    var1: f64,
    var2: f64,
    var3: f64,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            var1: 0.0,
            var2: 1.0,
            var3: 2.0,
        }
    }
}

impl Model for FakeModel {
    type Control = f64;

    fn observation(&self) -> Vec<f64> {
        vec![self.var1, self.var2]
    }

    fn reset(&mut self) {
        self.var1 = 0.0;
        self.var2 = 1.0;
        self.var3 = 2.0;
    }

    fn step(&mut self, control: Option<f64>) -> Vec<f64> {
        if let Some(control) = control {
            self.var3 = control;
        }
        self.var1 += self.var2;
        self.var2 += self.var3;
        self.observation()
    }
}

pub const FAKE_MAX_STEPS: usize = 100;

pub fn fake_ranges() -> Vec<Vec<f64>> {
    vec![vec![-1.0, 0.0, 1.0], vec![-1.0, 1.0]]
}

/// Continuous environment over [`FakeModel`], generic over the approximator
pub struct FakeContinuousEnvironment<A: Approximator> {
    model: FakeModel,
    approximator: A,
    state: A::State,
    steps: Vec<A::State>,
}

impl<A: Approximator> FakeContinuousEnvironment<A> {
    pub fn new(approximator: A) -> Self {
        let model = FakeModel::new();
        let state = approximator.approximate_state(&model.observation());
        Self {
            model,
            approximator,
            state,
            steps: Vec::new(),
        }
    }
}

impl<A: Approximator> Environment for FakeContinuousEnvironment<A> {
    type State = A::State;

    fn name(&self) -> &'static str {
        "FakeContinuousEnvironment"
    }

    fn n_actions(&self) -> usize {
        3
    }

    fn state(&self) -> A::State {
        self.state.clone()
    }

    fn do_action(&mut self, action_index: usize) -> A::State {
        let control = [-1.0, 0.0, 1.0][action_index];
        self.model.step(Some(control));
        self.state = self.approximator.approximate_state(&self.model.observation());
        self.steps.push(self.state.clone());
        self.state.clone()
    }

    fn reward(&self) -> f64 {
        1.0
    }

    fn is_state_absorbing(&self) -> bool {
        false
    }

    fn max_steps(&self) -> usize {
        FAKE_MAX_STEPS
    }

    fn episode_steps(&self) -> usize {
        self.steps.len()
    }

    fn clear(&mut self) {
        self.model.reset();
        self.state = self.approximator.approximate_state(&self.model.observation());
        self.steps.clear();
    }

    fn render(&self) {}

    fn close(&mut self) {}
}

impl DiscreteStates for FakeContinuousEnvironment<TableApproximator> {
    fn n_states(&self) -> usize {
        self.approximator.n_states()
    }
}

impl LayeredStates for FakeContinuousEnvironment<CmacApproximator> {
    fn layer_state_counts(&self) -> Vec<usize> {
        self.approximator.layer_state_counts()
    }
}

impl FuzzyStates for FakeContinuousEnvironment<FuzzyApproximator> {
    fn state_shape(&self) -> Vec<usize> {
        self.approximator.state_shape().to_vec()
    }
}

pub fn fake_table_environment() -> FakeContinuousEnvironment<TableApproximator> {
    FakeContinuousEnvironment::new(TableApproximator::new(2, fake_ranges()).unwrap())
}

pub fn fake_cmac_environment(n_layers: usize) -> FakeContinuousEnvironment<CmacApproximator> {
    FakeContinuousEnvironment::new(CmacApproximator::new(2, fake_ranges(), n_layers).unwrap())
}

pub fn fake_fuzzy_environment() -> FakeContinuousEnvironment<FuzzyApproximator> {
    FakeContinuousEnvironment::new(FuzzyApproximator::new(2, fake_ranges()).unwrap())
}

/// 5x5 grid whose border cells are absorbing penalty cells (no walls mark);
/// a random walk from the center ends within a handful of steps
pub fn fake_grid_no_walls() -> GridEnvironment {
    let mut grid = Array2::zeros((5, 5));
    grid.column_mut(0).fill(-1.0);
    grid.column_mut(4).fill(-1.0);
    grid.row_mut(0).fill(-1.0);
    grid.row_mut(4).fill(-1.0);
    GridEnvironment::new(GridConfig {
        grid,
        walls_mark: None,
        starting_position: (2, 2),
        max_steps: 1000,
    })
    .unwrap()
}

/// 4x4 grid with two walls and a goal cell
pub fn fake_grid_with_walls() -> GridEnvironment {
    let mut grid = Array2::zeros((4, 4));
    grid[[1, 2]] = -1.0;
    grid[[2, 3]] = -1.0;
    grid[[0, 3]] = 1.0;
    GridEnvironment::new(GridConfig {
        grid,
        walls_mark: Some(-1.0),
        starting_position: (0, 0),
        max_steps: 1000,
    })
    .unwrap()
}
