//! Grid-world environments
//!
//! Grid worlds are inherently discrete: the state is the flattened cell
//! index `row * n_cols + col` and no approximator is involved. Cell values
//! double as rewards; any nonzero-reward cell is absorbing. The preset
//! layouts below mirror the classic benchmark grids this toolkit ships with.

use ndarray::{Array2, s};

use super::models::{GridAction, GridModel, Model};
use super::{DiscreteStates, Environment};
use crate::error::Result;

/// Per-instance grid-world configuration
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Cell values; nonzero cells are rewards and absorbing states
    pub grid: Array2<f64>,
    /// Cell value marking impassable walls, if any
    pub walls_mark: Option<f64>,
    /// Agent starting position as (row, column)
    pub starting_position: (usize, usize),
    /// Episode step ceiling
    pub max_steps: usize,
}

impl GridConfig {
    /// Default episode step ceiling for grid worlds
    pub const DEFAULT_MAX_STEPS: usize = 1000;
}

/// A grid-world learning environment
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    model: GridModel,
    max_steps: usize,
    state: usize,
    steps: Vec<usize>,
}

impl GridEnvironment {
    /// Create a grid environment from a configuration
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidGridPosition`] when the starting
    /// position is outside the grid or on a wall cell.
    pub fn new(config: GridConfig) -> Result<Self> {
        let model = GridModel::new(config.grid, config.walls_mark, config.starting_position)?;
        let mut environment = Self {
            model,
            max_steps: config.max_steps,
            state: 0,
            steps: Vec::new(),
        };
        environment.clear();
        Ok(environment)
    }

    /// 6x6 grid with two reward cells and interior walls
    pub fn grid66() -> Self {
        let mut grid = Array2::zeros((6, 6));
        grid.slice_mut(s![1..5, 1]).fill(-1.0);
        grid.slice_mut(s![1..5, 4]).fill(-1.0);
        grid[[1, 2]] = -1.0;
        grid[[4, 3]] = -1.0;
        grid[[0, 5]] = 1.0;
        grid[[5, 5]] = 0.5;
        Self::preset(grid, Some(-1.0), (1, 3))
    }

    /// 6x9 grid with a single goal cell in the corner
    pub fn grid69() -> Self {
        let mut grid = Array2::zeros((6, 9));
        grid.slice_mut(s![1..4, 2]).fill(-1.0);
        grid.slice_mut(s![0..3, 7]).fill(-1.0);
        grid[[4, 5]] = -1.0;
        grid[[0, 8]] = 1.0;
        Self::preset(grid, Some(-1.0), (5, 0))
    }

    /// 24x36 grid with large wall blocks and a single corner goal
    pub fn grid2436() -> Self {
        let mut grid = Array2::zeros((24, 36));
        grid.slice_mut(s![5..17, 8..12]).fill(-1.0);
        grid.slice_mut(s![17..21, 20..24]).fill(-1.0);
        grid.slice_mut(s![0..12, 18..32]).fill(-1.0);
        grid[[0, 35]] = 1.0;
        Self::preset(grid, Some(-1.0), (1, 3))
    }

    /// 10x10 grid bordered with absorbing penalty cells
    pub fn grid1010() -> Self {
        Self::preset(Self::bordered(10), None, (5, 5))
    }

    /// 25x25 grid bordered with absorbing penalty cells
    pub fn grid2525() -> Self {
        Self::preset(Self::bordered(25), None, (12, 12))
    }

    fn bordered(size: usize) -> Array2<f64> {
        let mut grid = Array2::zeros((size, size));
        grid.slice_mut(s![0..size, 0]).fill(-1.0);
        grid.slice_mut(s![0..size, size - 1]).fill(-1.0);
        grid.slice_mut(s![0, 0..size]).fill(-1.0);
        grid.slice_mut(s![size - 1, 0..size]).fill(-1.0);
        grid
    }

    fn preset(
        grid: Array2<f64>,
        walls_mark: Option<f64>,
        starting_position: (usize, usize),
    ) -> Self {
        Self::new(GridConfig {
            grid,
            walls_mark,
            starting_position,
            max_steps: GridConfig::DEFAULT_MAX_STEPS,
        })
        .expect("preset grid configuration is valid")
    }

    /// Override the episode step ceiling
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// The underlying grid model
    pub fn model(&self) -> &GridModel {
        &self.model
    }

    fn get_state(&self) -> usize {
        let (row, column) = self.model.position();
        row * self.model.grid().ncols() + column
    }
}

impl Environment for GridEnvironment {
    type State = usize;

    fn name(&self) -> &'static str {
        "GridEnvironment"
    }

    fn n_actions(&self) -> usize {
        GridAction::ALL.len()
    }

    fn state(&self) -> usize {
        self.state
    }

    fn do_action(&mut self, action_index: usize) -> usize {
        let action = GridAction::ALL[action_index];
        self.model.step(Some(action));
        self.state = self.get_state();
        self.steps.push(self.state);
        self.state
    }

    fn reward(&self) -> f64 {
        let (row, column) = self.model.position();
        self.model.grid()[[row, column]]
    }

    fn is_state_absorbing(&self) -> bool {
        self.reward() != 0.0
    }

    fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn episode_steps(&self) -> usize {
        self.steps.len()
    }

    fn clear(&mut self) {
        self.model.reset();
        self.state = self.get_state();
        self.steps.clear();
    }

    fn render(&self) {
        self.model.render();
    }

    fn close(&mut self) {}
}

impl DiscreteStates for GridEnvironment {
    fn n_states(&self) -> usize {
        self.model.grid().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_shapes_and_marks() {
        let cases = [
            (GridEnvironment::grid66(), (6, 6), Some(-1.0), (1, 3)),
            (GridEnvironment::grid69(), (6, 9), Some(-1.0), (5, 0)),
            (GridEnvironment::grid2436(), (24, 36), Some(-1.0), (1, 3)),
            (GridEnvironment::grid1010(), (10, 10), None, (5, 5)),
            (GridEnvironment::grid2525(), (25, 25), None, (12, 12)),
        ];
        for (environment, shape, walls_mark, start) in cases {
            assert_eq!(environment.model().grid().dim(), shape);
            assert_eq!(environment.model().walls_mark(), walls_mark);
            assert_eq!(environment.model().position(), start);
        }
    }

    #[test]
    fn state_is_flattened_position() {
        let environment = GridEnvironment::grid69();
        assert_eq!(environment.state(), 5 * 9);
        assert_eq!(environment.n_states(), 54);
    }

    #[test]
    fn do_action_logs_states() {
        let mut environment = GridEnvironment::grid69();
        let state = environment.do_action(1);
        assert_eq!(state, 5 * 9 + 1);
        assert_eq!(environment.episode_steps(), 1);
        environment.clear();
        assert_eq!(environment.episode_steps(), 0);
        assert_eq!(environment.state(), 5 * 9);
    }

    #[test]
    fn nonzero_reward_is_absorbing() {
        let mut grid = Array2::zeros((2, 2));
        grid[[0, 1]] = 1.0;
        let mut environment = GridEnvironment::new(GridConfig {
            grid,
            walls_mark: None,
            starting_position: (0, 0),
            max_steps: 100,
        })
        .unwrap();
        assert!(!environment.done());
        environment.do_action(1);
        assert_eq!(environment.reward(), 1.0);
        assert!(environment.is_state_absorbing());
        assert!(environment.done());
    }

    #[test]
    fn max_steps_ends_the_episode() {
        let grid = Array2::zeros((2, 2));
        let mut environment = GridEnvironment::new(GridConfig {
            grid,
            walls_mark: None,
            starting_position: (0, 0),
            max_steps: 3,
        })
        .unwrap();
        for _ in 0..3 {
            assert!(!environment.done());
            environment.do_action(0);
        }
        assert!(environment.done());
    }
}
