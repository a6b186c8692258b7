///
/// This module implements the CLI interface for transfer-intake: argument
/// parsing, config resolution, wiring the production collaborators, and
/// user-visible reporting.
///
/// All pipeline logic lives in the [`transfer-intake-core`] crate. This module
/// is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: `transfer-intake [--config <PATH>] <MESSAGE>`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`],
///   then [`exit_code`] on its error to get the process status.
///
/// [`transfer-intake-core`]: ../../transfer-intake-core/
use crate::load_config::resolve_config;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::Instrument;
use transfer_intake_core::contract::SystemCommandRunner;
use transfer_intake_core::error::IntakeError;
use transfer_intake_core::fetch::DefaultFetcher;
use transfer_intake_core::pipeline::{process_message, RunReport};

/// Exit status for failures that happen before the pipeline can classify
/// them (bad arguments, unreadable config or message).
pub const EXIT_INVALID_INPUT: u8 = 1;

/// CLI for transfer-intake: fetch and unpack the archive linked from an email.
#[derive(Parser, Debug)]
#[clap(
    name = "transfer-intake",
    version,
    about = "Extract a download link from an email, fetch and unpack the archive, and run the downstream processors"
)]
pub struct Cli {
    /// Path to the raw email message
    pub message: PathBuf,

    /// Path to a YAML config file; built-in defaults apply when omitted
    #[clap(long, env = "TRANSFER_INTAKE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<RunReport> {
    tracing::info!("trace_initialised");

    let config =
        resolve_config(cli.config.as_deref()).inspect_err(|e| eprintln!("[ERROR] {e:#}"))?;
    let runner = SystemCommandRunner;
    let fetcher = DefaultFetcher::from_config(&config.fetch, SystemCommandRunner)
        .inspect_err(|e| eprintln!("[ERROR] {e}"))?;

    let span = tracing::info_span!("intake", message = %cli.message.display());
    let result = process_message(&config, &fetcher, &runner, &cli.message)
        .instrument(span)
        .await;

    match result {
        Ok(report) => {
            println!("Intake complete: {}", report.url);
            println!("  archive: {} ({})", report.archive.display(), report.format);
            if report.work_dir_removed {
                println!("  work directory removed: {}", report.work_dir.display());
            } else {
                println!("  work directory kept: {}", report.work_dir.display());
            }
            Ok(report)
        }
        Err(e) => {
            match e.outcome() {
                Some(outcome) => eprintln!("[ERROR] {outcome}: {e}"),
                None => eprintln!("[ERROR] {e}"),
            }
            if let Some(dir) = e.retained_dir() {
                eprintln!("[ERROR] work directory kept at {}", dir.display());
            }
            Err(e.into())
        }
    }
}

/// Maps an error returned by [`run`] to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<IntakeError>()
        .and_then(IntakeError::outcome)
        .map(|outcome| outcome.exit_code())
        .unwrap_or(EXIT_INVALID_INPUT)
}
