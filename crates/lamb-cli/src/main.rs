//! Lamb CLI - Offline simulator for the three-LFO step sequencer module.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lamb")]
#[command(author, version, about = "Lamb LFO/sequencer module simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the module offline and print every step change
    Simulate(commands::simulate::SimulateArgs),

    /// List the sequence selector table
    Sequences(commands::sequences::SequencesArgs),

    /// List the clock ratio table
    Ratios(commands::ratios::RatiosArgs),

    /// Validate a config file and print the effective settings
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Sequences(args) => commands::sequences::run(args),
        Commands::Ratios(args) => commands::ratios::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
