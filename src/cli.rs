use crate::catalog::TaskCatalog;
use crate::engine::{Launcher, ProcessLauncher};
use crate::model::{ActivityMessage, Outcome, Task, TaskKind};
use crate::orchestrator::RunSession;
use crate::storage::ConfigStore;
use anyhow::{bail, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

/// Line routing for the stdout/stderr writer.
enum ConsoleLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<ConsoleLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ConsoleLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                ConsoleLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                ConsoleLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "task-updater",
    version,
    about = "Run your system update commands one after another, with live output"
)]
pub struct Cli {
    /// Config file holding custom tasks
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hide the builtin tasks
    #[arg(long)]
    pub no_builtin: bool,

    /// Run tasks without the TUI and print their output
    #[arg(long)]
    pub text: bool,

    /// Only run the task with this id (repeatable, implies --text)
    #[arg(long = "task", value_name = "ID")]
    pub tasks: Vec<String>,

    /// Print the task catalog and exit
    #[arg(long)]
    pub list: bool,

    /// Log filter, e.g. `debug` or `task_updater=trace`
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file (defaults to the platform state directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Returns `false` when a headless run had failing tasks.
pub async fn run(args: Cli) -> Result<bool> {
    let store = match &args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_location()?,
    };
    let catalog = TaskCatalog::load(store, !args.no_builtin)?;

    if args.list {
        for line in catalog_lines(&catalog.tasks()) {
            println!("{line}");
        }
        return Ok(true);
    }

    let headless = args.text || !args.tasks.is_empty();
    if !headless {
        #[cfg(feature = "tui")]
        {
            crate::tui::run(catalog).await?;
            return Ok(true);
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            info!("built without the tui feature; running headless");
        }
    }

    let tasks = select_tasks(catalog.tasks(), &args.tasks)?;
    run_text(tasks, Box::new(ProcessLauncher)).await
}

fn catalog_lines(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|t| {
            let kind = match t.kind {
                TaskKind::Builtin => "builtin",
                TaskKind::Custom => "custom",
            };
            format!("{}\t{kind}\t{}\t$ {}", t.id, t.name, t.command_line())
        })
        .collect()
}

/// Keep the tasks named by `ids` (all when empty), in catalog order.
fn select_tasks(tasks: Vec<Task>, ids: &[String]) -> Result<Vec<Task>> {
    if ids.is_empty() {
        return Ok(tasks);
    }
    if let Some(unknown) = ids.iter().find(|id| !tasks.iter().any(|t| &t.id == *id)) {
        bail!("unknown task id {unknown:?} (see --list)");
    }
    Ok(tasks.into_iter().filter(|t| ids.contains(&t.id)).collect())
}

fn task_header(task: &Task) -> String {
    format!("== {} ($ {}) ==", task.name, task.command_line())
}

async fn run_text(tasks: Vec<Task>, launcher: Box<dyn Launcher>) -> Result<bool> {
    let (out_tx, out_handle) = spawn_output_writer();
    let mut session = RunSession::start(tasks, launcher);

    if let Some(task) = session.runner().active_task() {
        let _ = out_tx.send(ConsoleLine::Stderr(task_header(task)));
    }
    session
        .run_to_completion(|runner, msg| match msg {
            ActivityMessage::OutputLine(line) => {
                let _ = out_tx.send(ConsoleLine::Stdout(line.clone()));
            }
            ActivityMessage::Finished(outcome) => {
                let index = runner.current_index();
                if let Some(task) = runner.tasks().get(index) {
                    let status = match outcome {
                        Outcome::Success => format!("-- {} finished", task.name),
                        Outcome::Failure(detail) => format!("-- {} failed: {detail}", task.name),
                    };
                    let _ = out_tx.send(ConsoleLine::Stderr(status));
                }
                if let Some(next) = runner.tasks().get(index + 1) {
                    let _ = out_tx.send(ConsoleLine::Stderr(task_header(next)));
                }
            }
        })
        .await;

    let runner = session.runner();
    let summary = crate::text_summary::build_text_summary(runner.tasks(), runner.notice());
    let _ = out_tx.send(ConsoleLine::Stdout(String::new()));
    for line in summary.lines {
        let _ = out_tx.send(ConsoleLine::Stdout(line));
    }
    info!(failed = runner.failed_count(), "headless run finished");
    let ok = !runner.any_failed();

    drop(out_tx);
    let _ = out_handle.await;
    Ok(ok)
}
