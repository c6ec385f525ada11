mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{overlay, score, weights};
use tracing_subscriber::EnvFilter;

/// Map the `-v` count onto a default filter; `RUST_LOG` still wins when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Overlay(args) => overlay::run(&cli, args),
        Commands::Weights(args) => weights::run(&cli, args),
        Commands::Score(args) => score::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
