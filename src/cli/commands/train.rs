//! Train command - run a learning session on an environment/algorithm pair

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use crate::{
    algorithm::{
        Ahc, AhcConfig, Algorithm, CmacAhc, CmacQ, CmacR, CmacSarsa, FuzzyQ, FuzzyR, FuzzySarsa,
        QConfig, QLearning, RConfig, RLearning, Sarsa, SarsaConfig,
    },
    approximator::{CmacApproximator, FuzzyApproximator, TableApproximator},
    environment::{
        BallBeamEnvironment, CartPoleEnvironment, DiscreteStates, FuzzyStates, GridEnvironment,
        LayeredStates, MountainCarEnvironment,
    },
    export,
    session::{LearningSession, ProgressObserver, SessionConfig, SessionResult},
};

#[derive(Parser, Debug)]
#[command(
    about = "Train a learning algorithm on a simulation environment",
    allow_negative_numbers = true
)]
pub struct TrainArgs {
    /// Algorithm to train
    #[arg(value_enum)]
    pub algorithm: AlgorithmKind,

    /// Environment to train against
    #[arg(long, short = 'e', value_enum, default_value = "grid69")]
    pub environment: EnvironmentKind,

    /// State approximator for continuous environments (default: table)
    #[arg(long, short = 'a', value_enum)]
    pub approximator: Option<ApproximatorKind>,

    /// Number of CMAC tiling layers
    #[arg(long, default_value_t = 2)]
    pub n_layers: usize,

    /// Number of learning episodes
    #[arg(long, short = 'n', default_value_t = 100)]
    pub episodes: usize,

    /// Eligibility-trace decay (0 disables traces)
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Exploration rate (ignored by SARSA variants that select greedily)
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Discount factor (ignored by the undiscounted R variants)
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Learning rate
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Secondary learning rate of the AHC and R variants
    #[arg(long)]
    pub beta: Option<f64>,

    /// Episode step ceiling override
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop as soon as the trailing episode window has converged
    #[arg(long)]
    pub stop_when_learned: bool,

    /// Convergence: step count at or below this counts as learned
    #[arg(long, default_value_t = 0)]
    pub steps_lte: usize,

    /// Convergence: step count at or above this counts as learned
    #[arg(long, default_value_t = usize::MAX)]
    pub steps_gte: usize,

    /// Convergence window size
    #[arg(long, default_value_t = 1)]
    pub window: usize,

    /// Write a JSON session summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Write the steps-per-episode history as CSV to this path
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmKind {
    Ahc,
    Q,
    Sarsa,
    R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvironmentKind {
    Grid66,
    Grid69,
    Grid2436,
    Grid1010,
    Grid2525,
    BallBeam,
    MountainCar,
    CartPole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApproximatorKind {
    Table,
    Cmac,
    Fuzzy,
}

fn ahc_config(args: &TrainArgs) -> AhcConfig {
    let defaults = AhcConfig::default();
    AhcConfig {
        lambd: args.lambda.unwrap_or(defaults.lambd),
        epsilon: args.epsilon.unwrap_or(defaults.epsilon),
        gamma: args.gamma.unwrap_or(defaults.gamma),
        alpha: args.alpha.unwrap_or(defaults.alpha),
        beta: args.beta.unwrap_or(defaults.beta),
    }
}

fn q_config(args: &TrainArgs) -> QConfig {
    let defaults = QConfig::default();
    QConfig {
        lambd: args.lambda.unwrap_or(defaults.lambd),
        epsilon: args.epsilon.unwrap_or(defaults.epsilon),
        gamma: args.gamma.unwrap_or(defaults.gamma),
        alpha: args.alpha.unwrap_or(defaults.alpha),
    }
}

fn sarsa_config(args: &TrainArgs) -> SarsaConfig {
    let defaults = SarsaConfig::default();
    SarsaConfig {
        lambd: args.lambda.unwrap_or(defaults.lambd),
        gamma: args.gamma.unwrap_or(defaults.gamma),
        alpha: args.alpha.unwrap_or(defaults.alpha),
    }
}

fn r_config(args: &TrainArgs) -> RConfig {
    let defaults = RConfig::default();
    RConfig {
        lambd: args.lambda.unwrap_or(defaults.lambd),
        epsilon: args.epsilon.unwrap_or(defaults.epsilon),
        alpha: args.alpha.unwrap_or(defaults.alpha),
        beta: args.beta.unwrap_or(defaults.beta),
    }
}

fn session_config(args: &TrainArgs) -> SessionConfig {
    SessionConfig {
        episodes: args.episodes,
        stop_when_learned: args.stop_when_learned,
        steps_lte: args.steps_lte,
        steps_gte: args.steps_gte,
        window: args.window,
        render: false,
    }
}

fn run_session(algorithm: &mut dyn Algorithm, args: &TrainArgs) -> Result<SessionResult> {
    let mut session = LearningSession::new(session_config(args));
    if !args.quiet {
        session = session.with_observer(Box::new(ProgressObserver::new()));
    }
    Ok(session.run(algorithm)?)
}

fn run_classic<E: DiscreteStates>(environment: E, args: &TrainArgs) -> Result<SessionResult> {
    match args.algorithm {
        AlgorithmKind::Ahc => {
            let mut algorithm = Ahc::new(environment, ahc_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::Q => {
            let mut algorithm = QLearning::new(environment, q_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::Sarsa => {
            let mut algorithm = Sarsa::new(environment, sarsa_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::R => {
            let mut algorithm = RLearning::new(environment, r_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
    }
}

fn run_cmac<E: LayeredStates>(environment: E, args: &TrainArgs) -> Result<SessionResult> {
    match args.algorithm {
        AlgorithmKind::Ahc => {
            let mut algorithm = CmacAhc::new(environment, ahc_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::Q => {
            let mut algorithm = CmacQ::new(environment, q_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::Sarsa => {
            let mut algorithm = CmacSarsa::new(environment, q_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::R => {
            let mut algorithm = CmacR::new(environment, r_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
    }
}

fn run_fuzzy<E: FuzzyStates>(environment: E, args: &TrainArgs) -> Result<SessionResult> {
    match args.algorithm {
        AlgorithmKind::Ahc => bail!("the fuzzy family has no AHC variant"),
        AlgorithmKind::Q => {
            let mut algorithm = FuzzyQ::new(environment, q_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::Sarsa => {
            let mut algorithm = FuzzySarsa::new(environment, sarsa_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
        AlgorithmKind::R => {
            let mut algorithm = FuzzyR::new(environment, r_config(args))?;
            if let Some(seed) = args.seed {
                algorithm = algorithm.with_seed(seed);
            }
            run_session(&mut algorithm, args)
        }
    }
}

fn run_grid(environment: GridEnvironment, args: &TrainArgs) -> Result<SessionResult> {
    if args.approximator.is_some() {
        bail!("grid environments are discrete already and take no approximator");
    }
    let environment = match args.max_steps {
        Some(max_steps) => environment.with_max_steps(max_steps),
        None => environment,
    };
    run_classic(environment, args)
}

macro_rules! run_continuous {
    ($environment:expr, $args:expr) => {{
        let mut environment = $environment;
        if let Some(max_steps) = $args.max_steps {
            environment = environment.with_max_steps(max_steps);
        }
        match $args.approximator.unwrap_or(ApproximatorKind::Table) {
            ApproximatorKind::Table => run_classic(
                environment.approximate_with(|n, ranges| TableApproximator::new(n, ranges))?,
                $args,
            ),
            ApproximatorKind::Cmac => run_cmac(
                environment.approximate_with(|n, ranges| {
                    CmacApproximator::new(n, ranges, $args.n_layers)
                })?,
                $args,
            ),
            ApproximatorKind::Fuzzy => run_fuzzy(
                environment.approximate_with(|n, ranges| FuzzyApproximator::new(n, ranges))?,
                $args,
            ),
        }
    }};
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("session_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

fn print_summary(result: &SessionResult) {
    println!("environment: {}", result.environment);
    println!("algorithm:   {}", result.algorithm);
    println!("episodes:    {}", result.episodes);
    if let Some(last) = result.steps_per_episode.last() {
        println!("last episode: {last} steps");
    }
    if let Some(best) = result.steps_per_episode.iter().min() {
        println!("best episode: {best} steps");
    }
    if result.learned {
        println!("stopped early: convergence window satisfied");
    }
}

/// Execute the train command
pub fn execute(args: TrainArgs) -> Result<()> {
    let result = match args.environment {
        EnvironmentKind::Grid66 => run_grid(GridEnvironment::grid66(), &args)?,
        EnvironmentKind::Grid69 => run_grid(GridEnvironment::grid69(), &args)?,
        EnvironmentKind::Grid2436 => run_grid(GridEnvironment::grid2436(), &args)?,
        EnvironmentKind::Grid1010 => run_grid(GridEnvironment::grid1010(), &args)?,
        EnvironmentKind::Grid2525 => run_grid(GridEnvironment::grid2525(), &args)?,
        EnvironmentKind::BallBeam => run_continuous!(BallBeamEnvironment::new(), &args)?,
        EnvironmentKind::MountainCar => run_continuous!(MountainCarEnvironment::new(), &args)?,
        EnvironmentKind::CartPole => run_continuous!(CartPoleEnvironment::new(), &args)?,
    };

    print_summary(&result);

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        result.save(&path)?;
        println!("summary written to {}", path.display());
    }

    if let Some(path) = &args.history {
        export::write_history_csv(path, std::slice::from_ref(&result.steps_per_episode))?;
        println!("history written to {}", path.display());
    }

    Ok(())
}
