//! Physical and grid-world models driven by the environments
//!
//! A model owns the mutable simulation state (positions, speeds) and steps
//! it forward under a control input. Environments only depend on the
//! observation shape/order and the step semantics; graphical rendering is a
//! permissible no-op.

use ndarray::Array2;

use crate::error::{Error, Result};

/// Gravitational acceleration shared by the physical models
const G: f64 = 9.81;

/// Simulation model contract
///
/// `step` advances the dynamics by one timestep; passing `None` keeps the
/// previous control input.
pub trait Model {
    /// Control input accepted by this model
    type Control;

    /// Current raw observation, one float per state variable
    fn observation(&self) -> Vec<f64>;

    /// Restore the initial state
    fn reset(&mut self);

    /// Advance one timestep under `control` and return the new observation
    fn step(&mut self, control: Option<Self::Control>) -> Vec<f64>;

    /// Draw the current state; no-op by default
    fn render(&self) {}

    /// Release any rendering resource; no-op by default
    fn close(&mut self) {}
}

/// A move on the grid model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAction {
    Up,
    Right,
    Down,
    Left,
}

impl GridAction {
    /// All moves, in action-index order
    pub const ALL: [GridAction; 4] = [
        GridAction::Up,
        GridAction::Right,
        GridAction::Down,
        GridAction::Left,
    ];
}

/// Agent walking on a rectangular grid of cell values
///
/// Moves that would leave the grid or enter a wall cell (a cell holding the
/// configured walls mark) are ignored and the agent stays in place.
#[derive(Debug, Clone)]
pub struct GridModel {
    grid: Array2<f64>,
    walls_mark: Option<f64>,
    init_position: (usize, usize),
    position: (usize, usize),
}

impl GridModel {
    /// Create a grid model with the agent at `init_position`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGridPosition`] when the initial position is
    /// outside the grid or on a wall cell.
    pub fn new(
        grid: Array2<f64>,
        walls_mark: Option<f64>,
        init_position: (usize, usize),
    ) -> Result<Self> {
        let mut model = Self {
            grid,
            walls_mark,
            init_position,
            position: init_position,
        };
        if !model.is_move_possible(init_position.0 as isize, init_position.1 as isize) {
            return Err(Error::InvalidGridPosition {
                row: init_position.0,
                column: init_position.1,
            });
        }
        model.reset();
        Ok(model)
    }

    /// The grid of cell values
    pub fn grid(&self) -> &Array2<f64> {
        &self.grid
    }

    /// The configured wall-cell mark, if any
    pub fn walls_mark(&self) -> Option<f64> {
        self.walls_mark
    }

    /// Current agent position as (row, column)
    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    /// Whether the agent may occupy (row, column)
    pub fn is_move_possible(&self, row: isize, column: isize) -> bool {
        let (n_rows, n_cols) = self.grid.dim();
        if row < 0 || row >= n_rows as isize || column < 0 || column >= n_cols as isize {
            return false;
        }
        match self.walls_mark {
            Some(mark) => self.grid[[row as usize, column as usize]] != mark,
            None => true,
        }
    }
}

impl Model for GridModel {
    type Control = GridAction;

    fn observation(&self) -> Vec<f64> {
        vec![self.position.0 as f64, self.position.1 as f64]
    }

    fn reset(&mut self) {
        self.position = self.init_position;
    }

    fn step(&mut self, control: Option<GridAction>) -> Vec<f64> {
        if let Some(action) = control {
            let (row, column) = (self.position.0 as isize, self.position.1 as isize);
            let (row, column) = match action {
                GridAction::Up => (row - 1, column),
                GridAction::Right => (row, column + 1),
                GridAction::Down => (row + 1, column),
                GridAction::Left => (row, column - 1),
            };
            if self.is_move_possible(row, column) {
                self.position = (row as usize, column as usize);
            }
        }
        self.observation()
    }

    fn render(&self) {
        let (agent_row, agent_col) = self.position;
        let mut board = String::new();
        for (row, line) in self.grid.rows().into_iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if (row, col) == (agent_row, agent_col) {
                    board.push_str("   A ");
                } else {
                    board.push_str(&format!("{value:4.1} "));
                }
            }
            board.push('\n');
        }
        println!("{board}");
    }
}

/// Ball balancing on a tilting beam
#[derive(Debug, Clone)]
pub struct BallBeam {
    init_ball_position: f64,
    init_ball_speed: f64,
    init_beam_theta: f64,
    timestep: f64,
    beam_theta: f64,
    ball_position: f64,
    ball_speed: f64,
}

impl BallBeam {
    /// Beam length; the ball falls off at half of it from the center
    pub const BEAM_LENGTH: f64 = 2.0;

    pub fn new(
        init_ball_position: f64,
        init_ball_speed: f64,
        init_beam_theta: f64,
        timestep: f64,
    ) -> Self {
        let mut model = Self {
            init_ball_position,
            init_ball_speed,
            init_beam_theta,
            timestep,
            beam_theta: init_beam_theta,
            ball_position: init_ball_position,
            ball_speed: init_ball_speed,
        };
        model.reset();
        model
    }

    pub fn ball_position(&self) -> f64 {
        self.ball_position
    }

    pub fn ball_speed(&self) -> f64 {
        self.ball_speed
    }

    pub fn beam_theta(&self) -> f64 {
        self.beam_theta
    }
}

impl Default for BallBeam {
    fn default() -> Self {
        Self::new(0.0, 0.0, std::f64::consts::PI / 8.0, 0.02)
    }
}

impl Model for BallBeam {
    type Control = f64;

    fn observation(&self) -> Vec<f64> {
        vec![self.ball_position, self.ball_speed]
    }

    fn reset(&mut self) {
        self.beam_theta = self.init_beam_theta;
        self.ball_position = self.init_ball_position;
        self.ball_speed = self.init_ball_speed;
    }

    fn step(&mut self, control: Option<f64>) -> Vec<f64> {
        if let Some(theta) = control {
            self.beam_theta = theta;
        }
        self.ball_position += self.timestep * self.ball_speed;
        self.ball_speed += self.timestep * G * self.beam_theta.sin();
        self.observation()
    }
}

/// Car climbing a hill (Moore, 1990)
///
/// Position is clamped to `[-1.2, 0.5]` (speed zeroed at the clamps) and
/// speed to `[-0.07, 0.07]`; the right clamp doubles as the goal position.
#[derive(Debug, Clone)]
pub struct MountainCar {
    init_car_position: f64,
    init_car_speed: f64,
    init_car_acceleration: f64,
    car_position: f64,
    car_speed: f64,
    car_acceleration: f64,
}

impl MountainCar {
    pub const MIN_POSITION: f64 = -1.2;
    pub const MAX_POSITION: f64 = 0.5;
    pub const MAX_SPEED: f64 = 0.07;

    pub fn new(init_car_position: f64, init_car_speed: f64, init_car_acceleration: f64) -> Self {
        let mut model = Self {
            init_car_position,
            init_car_speed,
            init_car_acceleration,
            car_position: init_car_position,
            car_speed: init_car_speed,
            car_acceleration: init_car_acceleration,
        };
        model.reset();
        model
    }

    pub fn car_position(&self) -> f64 {
        self.car_position
    }

    pub fn car_speed(&self) -> f64 {
        self.car_speed
    }

    fn set_car_speed(&mut self, value: f64) {
        self.car_speed = value.clamp(-Self::MAX_SPEED, Self::MAX_SPEED);
    }

    fn set_car_position(&mut self, value: f64) {
        if value < Self::MIN_POSITION {
            self.car_position = Self::MIN_POSITION;
            self.car_speed = 0.0;
        } else if value > Self::MAX_POSITION {
            self.car_position = Self::MAX_POSITION;
            self.car_speed = 0.0;
        } else {
            self.car_position = value;
        }
    }
}

impl Default for MountainCar {
    fn default() -> Self {
        Self::new(-0.5, 0.0, 0.0)
    }
}

impl Model for MountainCar {
    type Control = f64;

    fn observation(&self) -> Vec<f64> {
        vec![self.car_position, self.car_speed]
    }

    fn reset(&mut self) {
        self.car_acceleration = self.init_car_acceleration;
        self.set_car_position(self.init_car_position);
        self.set_car_speed(self.init_car_speed);
    }

    fn step(&mut self, control: Option<f64>) -> Vec<f64> {
        if let Some(acceleration) = control {
            self.car_acceleration = acceleration;
        }
        let speed = self.car_speed + 0.001 * self.car_acceleration
            - 0.0025 * (3.0 * self.car_position).cos();
        self.set_car_speed(speed);
        let position = self.car_position + self.car_speed;
        self.set_car_position(position);
        self.observation()
    }
}

/// Pole balancing on a force-driven cart
#[derive(Debug, Clone)]
pub struct CartPole {
    init_cart_position: f64,
    init_cart_speed: f64,
    init_pole_angle: f64,
    init_pole_speed: f64,
    init_force: f64,
    timestep: f64,
    cart_position: f64,
    cart_speed: f64,
    pole_angle: f64,
    pole_speed: f64,
    force: f64,
}

impl CartPole {
    /// Cart mass
    const CART_MASS: f64 = 1.0;
    /// Pole mass
    const POLE_MASS: f64 = 0.1;
    /// Combined mass
    const TOTAL_MASS: f64 = Self::CART_MASS + Self::POLE_MASS;
    /// Half pole length
    const POLE_LENGTH: f64 = 0.5;
    /// Track length; the cart stops at half of it from the center
    pub const TRACK_LENGTH: f64 = 2.4;

    pub fn new(
        init_cart_position: f64,
        init_cart_speed: f64,
        init_pole_angle: f64,
        init_pole_speed: f64,
        init_force: f64,
        timestep: f64,
    ) -> Self {
        let mut model = Self {
            init_cart_position,
            init_cart_speed,
            init_pole_angle,
            init_pole_speed,
            init_force,
            timestep,
            cart_position: init_cart_position,
            cart_speed: init_cart_speed,
            pole_angle: init_pole_angle,
            pole_speed: init_pole_speed,
            force: init_force,
        };
        model.reset();
        model
    }

    pub fn cart_position(&self) -> f64 {
        self.cart_position
    }

    pub fn pole_angle(&self) -> f64 {
        self.pole_angle
    }

    fn set_cart_position(&mut self, value: f64) {
        let bound = Self::TRACK_LENGTH / 2.0;
        if value <= -bound {
            self.cart_position = -bound;
            self.cart_speed = 0.0;
        } else if value >= bound {
            self.cart_position = bound;
            self.cart_speed = 0.0;
        } else {
            self.cart_position = value;
        }
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 10.0, 0.02)
    }
}

impl Model for CartPole {
    type Control = f64;

    fn observation(&self) -> Vec<f64> {
        vec![
            self.cart_position,
            self.cart_speed,
            self.pole_angle,
            self.pole_speed,
        ]
    }

    fn reset(&mut self) {
        self.set_cart_position(self.init_cart_position);
        self.cart_speed = self.init_cart_speed;
        self.pole_angle = self.init_pole_angle;
        self.pole_speed = self.init_pole_speed;
        self.force = self.init_force;
    }

    fn step(&mut self, control: Option<f64>) -> Vec<f64> {
        if let Some(force) = control {
            self.force = force;
        }
        let sin_theta = self.pole_angle.sin();
        let cos_theta = self.pole_angle.cos();

        let pole_acceleration_nominator = G * sin_theta
            + cos_theta
                * (-self.force
                    - Self::POLE_MASS * Self::POLE_LENGTH * self.pole_speed.powi(2) * sin_theta)
                / Self::TOTAL_MASS;
        let pole_acceleration_denominator = Self::POLE_LENGTH
            * (4.0 / 3.0 - (Self::POLE_MASS * cos_theta.powi(2)) / Self::TOTAL_MASS);
        let pole_acceleration = pole_acceleration_nominator / pole_acceleration_denominator;

        let cart_acceleration = (self.force
            + Self::POLE_MASS
                * Self::POLE_LENGTH
                * (self.pole_speed.powi(2) * sin_theta - pole_acceleration * cos_theta))
            / Self::TOTAL_MASS;

        self.pole_angle += self.pole_speed * self.timestep;
        self.pole_speed += pole_acceleration * self.timestep;
        self.set_cart_position(self.cart_position + self.cart_speed * self.timestep);
        self.cart_speed += cart_acceleration * self.timestep;
        self.observation()
    }
}
