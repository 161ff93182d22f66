// ABOUTME: Entry point for the rollout CLI application.
// ABOUTME: Parses arguments, loads configuration and runs the requested pipeline action.

mod cli;

use clap::Parser;
use cli::Cli;
use rollout::config::{self, Config};
use rollout::error::Result;
use rollout::output::{Output, OutputMode};
use rollout::pipeline::{Collaborators, Orchestrator};
use std::env;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the requested action succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let cwd = env::current_dir()?;

    if cli.init {
        config::init_config(&cwd, cli.namespace.as_deref(), cli.force)?;
        println!("Created {}", config::CONFIG_FILENAME);
        return Ok(true);
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&cwd)?,
    };

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    let cancel = CancellationToken::new();
    tokio::spawn(interrupt_signal(cancel.clone()));

    let collaborators = Collaborators::commands(&config.project_dir);
    let orchestrator = Orchestrator::new(config, collaborators, cancel);

    output.progress(&format!(
        "Running {} for {}...",
        cli.action, cli.environment
    ));
    output.start_timer();

    let result = orchestrator
        .execute(cli.action, cli.environment, cli.tag)
        .await?;
    output.report(&result);

    Ok(result.success)
}

/// First Ctrl-C cancels the run and lets the rollback finish; a second one exits.
async fn interrupt_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    tracing::warn!("interrupted, aborting the current step (Ctrl+C again to exit now)");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("Interrupted twice, exiting without waiting for rollback");
        std::process::exit(130);
    }
}
