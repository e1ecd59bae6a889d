//! Tabular, tile-coded and fuzzy reinforcement-learning research toolkit
//!
//! This crate provides:
//! - State approximators turning continuous observations into discrete
//!   indices (table), per-layer indices (CMAC tile coding) or membership
//!   grades (fuzzy sets)
//! - Temporal-difference algorithms (AHC, Q-learning, SARSA, R-learning)
//!   with optional eligibility traces, in classic, CMAC and fuzzy variants
//! - Grid-world and physical simulation environments (ball-and-beam,
//!   mountain car, cart-pole)
//! - A learning-session driver with composable observers, learning-history
//!   statistics and CSV/JSON export
//!
//! Which environments an algorithm accepts is a compile-time constraint:
//! classic algorithms require a grid or table-approximated environment,
//! CMAC algorithms a CMAC-approximated one, fuzzy algorithms a
//! fuzzy-approximated one.
//!
//! # Examples
//!
//! ```
//! use rltoolbox::{
//!     algorithm::{Algorithm, QConfig, QLearning},
//!     environment::GridEnvironment,
//!     session::SessionConfig,
//! };
//!
//! # fn main() -> rltoolbox::Result<()> {
//! let environment = GridEnvironment::grid69();
//! let mut algorithm = QLearning::new(environment, QConfig::default())?.with_seed(7);
//! let result = algorithm.learn(&SessionConfig {
//!     episodes: 3,
//!     ..SessionConfig::default()
//! })?;
//! assert_eq!(result.steps_per_episode.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod algorithm;
pub mod analysis;
pub mod approximator;
pub mod cli;
pub mod environment;
pub mod error;
pub mod export;
pub mod fuzzy;
pub mod session;

pub use algorithm::{
    Ahc, AhcConfig, Algorithm, CmacAhc, CmacQ, CmacR, CmacSarsa, FuzzyQ, FuzzyR, FuzzySarsa,
    QConfig, QLearning, RConfig, RLearning, Sarsa, SarsaConfig, is_learned,
};
pub use approximator::{Approximator, CmacApproximator, FuzzyApproximator, TableApproximator};
pub use environment::{
    BallBeamEnvironment, CartPoleEnvironment, DiscreteStates, Environment, FuzzyStates,
    GridConfig, GridEnvironment, LayeredStates, MountainCarEnvironment,
};
pub use error::{Error, Result};
pub use fuzzy::{FuzzySet, MembershipFunction};
pub use session::{LearningSession, SessionConfig, SessionResult};
