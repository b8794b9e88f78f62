//! Stratum
//!
//! Schema analysis engine for multi-platform code generators.
//!
//! This is the entry point for the `stratum` inspector binary.

use clap::Parser;
use std::process::ExitCode;
use stratum_cli::Cli;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("stratum {}", stratum_cli::VERSION);
    stratum_cli::run(cli)
}
