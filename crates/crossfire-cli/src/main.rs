//! Crossfire CLI: the `crossfire` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),

        Commands::Concat { as_of, json } => commands::concat::run(cli.config, as_of, json),

        Commands::Calculate { json } => commands::calculate::run(cli.config, json),

        Commands::Grade {
            expected,
            actual,
            json,
        } => commands::grade::run(expected, actual, json),
    }
}

/// Logs go to stderr so `--json` stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
