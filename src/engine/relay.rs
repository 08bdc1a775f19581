use super::LaunchHandle;
use crate::model::{ActivityMessage, Outcome};
use tracing::warn;

pub(crate) const STREAM_CLOSED: &str = "activity stream closed before the task reported an outcome";

/// Single-consumer bridge between the current launch and the UI loop.
#[derive(Default)]
pub struct ActivityRelay {
    current: Option<LaunchHandle>,
    finished: bool,
}

impl ActivityRelay {
    /// Bind to a new launch. Anything still queued for the previous one is dropped.
    pub fn attach(&mut self, handle: LaunchHandle) {
        self.current = Some(handle);
        self.finished = false;
    }

    /// Wait for the next message of the attached launch.
    ///
    /// Cancel-safe. Pends forever when nothing is attached or the launch has
    /// already delivered its outcome.
    pub async fn next_event(&mut self) -> ActivityMessage {
        let handle = match self.current.as_mut() {
            Some(handle) if !self.finished => handle,
            _ => return futures::future::pending().await,
        };
        match handle.rx.recv().await {
            Some(msg) => {
                if matches!(msg, ActivityMessage::Finished(_)) {
                    self.finished = true;
                }
                msg
            }
            None => {
                warn!(pid = ?handle.pid, "{STREAM_CLOSED}");
                self.finished = true;
                ActivityMessage::Finished(Outcome::Failure(STREAM_CLOSED.to_string()))
            }
        }
    }
}
