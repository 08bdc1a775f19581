mod catalog;
mod cli;
mod engine;
mod logging;
mod model;
mod orchestrator;
mod shell;
mod storage;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::init(args.log_file.as_deref(), &args.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "task-updater starting");

    let ok = cli::run(args).await?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
