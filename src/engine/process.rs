use super::{LaunchHandle, Launcher};
use crate::model::{ActivityMessage, Outcome, Task};
use std::io::{self, BufRead, BufReader, ErrorKind, PipeReader, PipeWriter, Read};
use std::process::{Command, Stdio};
use std::thread;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

/// Launches tasks as real OS processes with the inherited environment.
#[derive(Debug, Default, Clone)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, task: &Task) -> LaunchHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let pid = spawn_streaming(&task.command, &task.args, tx);
        LaunchHandle::new(rx, pid)
    }
}

/// Read end plus the stdout and stderr write ends that share it.
type MergedPipe = (PipeReader, PipeWriter, PipeWriter);

// stdout and stderr share one pipe so lines arrive in emission order.
fn merged_pipe() -> io::Result<MergedPipe> {
    let (reader, writer) = io::pipe()?;
    let writer_err = writer.try_clone()?;
    Ok((reader, writer, writer_err))
}

/// Start `command`, stream its merged output into `tx` and finish with exactly
/// one `Finished`. Returns the pid when the process started.
///
/// Reading and waiting block, so each runs on its own OS thread. Runtime
/// shutdown does not wait for them.
fn spawn_streaming(
    command: &str,
    args: &[String],
    tx: UnboundedSender<ActivityMessage>,
) -> Option<u32> {
    spawn_with_pipe(command, args, tx, merged_pipe())
}

fn spawn_with_pipe(
    command: &str,
    args: &[String],
    tx: UnboundedSender<ActivityMessage>,
    pipe: io::Result<MergedPipe>,
) -> Option<u32> {
    let mut cmd = Command::new(command);
    cmd.args(args).stdin(Stdio::null());

    let reader = match pipe {
        Ok((reader, out, err)) => {
            cmd.stdout(out).stderr(err);
            Some(reader)
        }
        Err(e) => {
            warn!(command, error = %e, "failed to create output pipe; discarding output");
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
            None
        }
    };

    let spawned = cmd.spawn();
    // The command still owns the parent's write ends; the reader only sees EOF
    // once they are closed.
    drop(cmd);

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!(command, error = %e, "failed to start process");
            let _ = tx.send(ActivityMessage::Finished(Outcome::Failure(format!(
                "failed to start {command}: {e}"
            ))));
            return None;
        }
    };
    let pid = child.id();
    info!(command, pid, "process started");

    let reader_handle = reader.and_then(|reader| {
        let tx = tx.clone();
        thread::Builder::new()
            .name(format!("{command}-output"))
            .spawn(move || read_lines(reader, &tx))
            .map_err(|e| warn!(command, error = %e, "failed to start output reader"))
            .ok()
    });

    let name = command.to_string();
    let waiter = thread::Builder::new()
        .name(format!("{command}-wait"))
        .spawn(move || {
            let status = child.wait();
            // Every line must be delivered before the outcome.
            if let Some(handle) = reader_handle {
                if handle.join().is_err() {
                    warn!(command = %name, "output reader panicked");
                }
            }
            let outcome = match status {
                Ok(status) if status.success() => {
                    info!(command = %name, "process exited successfully");
                    Outcome::Success
                }
                Ok(status) => {
                    info!(command = %name, %status, "process failed");
                    Outcome::Failure(format!("{name} exited with {status}"))
                }
                Err(e) => {
                    warn!(command = %name, error = %e, "failed to wait for process");
                    Outcome::Failure(format!("failed to wait for {name}: {e}"))
                }
            };
            let _ = tx.send(ActivityMessage::Finished(outcome));
        });
    if let Err(e) = waiter {
        // The sender went down with the closure; the relay reports the closed stream.
        warn!(command, error = %e, "failed to start process waiter");
    }

    Some(pid)
}

fn read_lines(reader: impl Read, tx: &UnboundedSender<ActivityMessage>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut receiver_gone = false;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if receiver_gone {
                    continue;
                }
                let line = ActivityMessage::OutputLine(decode_line(&buf));
                if tx.send(line).is_err() {
                    // Keep draining so the child never blocks on a full pipe.
                    debug!("activity receiver dropped; discarding remaining output");
                    receiver_gone = true;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "failed to read process output");
                break;
            }
        }
    }
}

fn decode_line(buf: &[u8]) -> String {
    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
