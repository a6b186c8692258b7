use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use transfer_intake::cli::{exit_code, run, Cli, EXIT_INVALID_INPUT};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the run summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    // Usage errors share the invalid-input status; clap's own 2 is NoLinkFound here.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_INVALID_INPUT)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    tracing::info!("CLI arguments parsed, invoking run");
    match run(cli).await {
        Ok(_) => {
            tracing::info!("CLI completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = exit_code(&e);
            tracing::error!(error = %e, code, "CLI exited with error");
            ExitCode::from(code)
        }
    }
}
