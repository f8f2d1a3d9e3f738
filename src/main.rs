//! clinical-ml - Main Entry Point
//!
//! Runs the binary-classification experiment pipeline from the command line.

use clap::Parser;
use clinical_ml::cli::{cmd_describe, cmd_run, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinical_ml=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { data, config, seed, n_jobs, svg_dir } => {
            cmd_run(&data, config.as_deref(), seed, n_jobs, svg_dir.as_deref())?;
        }
        Commands::Describe { data, config } => {
            cmd_describe(&data, config.as_deref())?;
        }
    }

    Ok(())
}
