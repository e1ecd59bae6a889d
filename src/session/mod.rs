//! Learning-session driver
//!
//! A session runs an [`Algorithm`] for a number of episodes, clearing the
//! environment before each one and optionally stopping early once the
//! trailing episode window has converged. Observers collect progress and
//! episode data without coupling the driver to any output format.

mod observer;

pub use observer::{JsonlObserver, Observer, ProgressObserver};

use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::Result;

/// Learning-session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of episodes to run
    pub episodes: usize,

    /// Stop as soon as [`Algorithm::is_learned`] holds
    pub stop_when_learned: bool,

    /// Convergence: episode step count at or below this counts as learned
    pub steps_lte: usize,

    /// Convergence: episode step count at or above this counts as learned
    pub steps_gte: usize,

    /// Convergence window size
    pub window: usize,

    /// Render the environment every step
    pub render: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            episodes: 1,
            stop_when_learned: false,
            steps_lte: 0,
            steps_gte: usize::MAX,
            window: 1,
            render: false,
        }
    }
}

/// Result of a learning session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// Algorithm name
    pub algorithm: String,

    /// Environment name
    pub environment: String,

    /// Episodes run in this session
    pub episodes: usize,

    /// Step counts of every episode the algorithm has run, including
    /// episodes from earlier sessions on the same algorithm
    pub steps_per_episode: Vec<usize>,

    /// Whether the session stopped on the convergence criterion
    pub learned: bool,
}

impl SessionResult {
    /// Save the result to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be created or serialized.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a result from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or parsed.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Drives learning episodes and notifies observers
pub struct LearningSession {
    config: SessionConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl LearningSession {
    /// Create a session with the given configuration
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the session
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run the configured number of episodes on `algorithm`
    ///
    /// # Errors
    ///
    /// Propagates episode and observer errors.
    pub fn run(&mut self, algorithm: &mut dyn Algorithm) -> Result<SessionResult> {
        let algorithm_name = algorithm.name();
        let environment_name = algorithm.environment_name();

        for observer in &mut self.observers {
            observer.on_session_start(&algorithm_name, environment_name, self.config.episodes)?;
        }

        let mut learned = false;
        let mut episodes_run = 0;
        for episode in 0..self.config.episodes {
            algorithm.clear_environment();
            let steps = algorithm.run_learning_episode(self.config.render)?;
            episodes_run += 1;

            for observer in &mut self.observers {
                observer.on_episode_end(episode, steps)?;
            }

            if self.config.stop_when_learned
                && algorithm.is_learned(
                    self.config.steps_lte,
                    self.config.steps_gte,
                    self.config.window,
                )
            {
                learned = true;
                break;
            }
        }

        for observer in &mut self.observers {
            observer.on_session_end()?;
        }

        Ok(SessionResult {
            algorithm: algorithm_name,
            environment: environment_name.to_string(),
            episodes: episodes_run,
            steps_per_episode: algorithm.steps_per_episode().to_vec(),
            learned,
        })
    }
}
