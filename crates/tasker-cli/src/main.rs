//! Tasker CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tasker_cli::cli::Cli;
use tasker_cli::commands;
use tasker_core::TaskerConfig;

fn main() {
    // Load .env.local if it exists (TASKER_* settings)
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = TaskerConfig::from_env();

    if let Err(e) = commands::execute(cli.command, cli.format, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
