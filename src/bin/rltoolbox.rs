//! rltoolbox CLI - train tabular, CMAC and fuzzy learners on simulation
//! environments

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rltoolbox")]
#[command(version, about = "Reinforcement-learning research toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a learning algorithm on a simulation environment
    Train(Box<rltoolbox::cli::commands::train::TrainArgs>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => rltoolbox::cli::commands::train::execute(*args),
    }
}
