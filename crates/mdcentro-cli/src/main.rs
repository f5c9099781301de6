mod cli;
mod commands;
mod config;
mod discovery;
mod error;
mod logging;
mod report;
mod utils;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use clap::Parser;
use mdcentro::engine::progress::ProgressReporter;
use mdcentro::engine::state::SystemOutcome;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("MDCentro v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!(
            "Setting Rayon global thread pool to {} threads.",
            num_threads
        );
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }

    let config = config::build_config(&cli)?;
    debug!("Resolved configuration: {:?}", &config);

    let progress_handler = if cli.quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let outcomes = commands::analyze::run(&config, &reporter).inspect_err(|e| {
        error!("Analysis aborted: {}", e);
    })?;

    let completed = outcomes.iter().filter(|o| o.is_completed()).count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, SystemOutcome::Failed { .. }))
        .count();
    let skipped = outcomes.len() - completed - failed;
    info!(completed, skipped, failed, "Analysis finished.");

    if !cli.quiet {
        println!(
            "✅ {} system(s) analyzed, {} skipped, {} failed. Results in {}",
            completed,
            skipped,
            failed,
            config.output_folder.display()
        );
    }
    Ok(())
}
