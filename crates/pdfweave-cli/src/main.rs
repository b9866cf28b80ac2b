//! pdfweave - Interleave cover, body and appendix PDFs set by set.

mod cli;
mod logging;
mod output;

use anyhow::Context;
use clap::Parser;
use std::process;

use crate::cli::Cli;
use crate::logging::LogConfig;
use crate::output::{OutputFormatter, ProgressReporter, display_outcome, display_slots};
use pdfweave::{Session, WeaveError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.quiet || cli.json, cli.verbose > 0);

    if let Err(err) = run(cli, &formatter).await {
        formatter.error(&format!("Error: {err}"));
        process::exit(exit_code(&err));
    }
}

/// Main application logic.
async fn run(cli: Cli, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let log_config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_format(cli.log_format.into())
        .with_log_file(cli.log_file.clone());
    logging::init_logging(&log_config).context("Failed to initialize logging")?;

    let config = cli.to_config()?;
    let mut session = Session::new(config)?;

    if !cli.has_inputs() {
        formatter.warning("No input patterns given for any slot");
    }

    for (slot, patterns) in cli.slot_patterns() {
        if patterns.is_empty() {
            continue;
        }
        if session.select_paths(slot, patterns)?.is_empty() {
            formatter.warning(&format!("No PDF files matched for slot {slot}"));
        }
    }

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfweave::NAME, pdfweave::VERSION));
        display_slots(formatter, session.registry());
        formatter.blank_line();
    }

    if let Some(dir) = &cli.output_dir
        && let Err(err) = session.select_destination(dir).await
    {
        formatter.warning(&format!("{err}. Files will be downloaded instead."));
    }

    let mut progress = if formatter.should_print() {
        ProgressReporter::auto()
    } else {
        ProgressReporter::hidden()
    };
    let outcome = session.run(&mut progress).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        display_outcome(formatter, &outcome);
    }

    Ok(())
}

/// Process exit code for an error from [`run`].
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<WeaveError>()
        .map_or(1, WeaveError::exit_code)
}
