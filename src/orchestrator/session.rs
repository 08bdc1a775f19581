//! Run session: a runner bound to a launcher and an activity relay.
//!
//! The session carries out the runner's effects. It is *armed* while the
//! runner waits for activity; the UI loop only polls `next_event` while armed,
//! and every consumed message disarms it until the runner asks again.

use super::runner::{Effect, TaskRunner};
use crate::engine::{ActivityRelay, Launcher};
use crate::model::{ActivityMessage, Task};
use tracing::debug;

pub struct RunSession {
    runner: TaskRunner,
    launcher: Box<dyn Launcher>,
    relay: ActivityRelay,
    armed: bool,
}

#[cfg_attr(not(feature = "tui"), allow(dead_code))]
impl RunSession {
    /// Build the session and start the first task (if any).
    pub fn start(tasks: Vec<Task>, launcher: Box<dyn Launcher>) -> Self {
        let mut session = Self {
            runner: TaskRunner::new(tasks),
            launcher,
            relay: ActivityRelay::default(),
            armed: false,
        };
        let effects = session.runner.start();
        session.perform(effects);
        session
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut TaskRunner {
        &mut self.runner
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Wait for the next activity message. Cancel-safe.
    pub async fn next_event(&mut self) -> ActivityMessage {
        let msg = self.relay.next_event().await;
        self.armed = false;
        msg
    }

    /// Apply a message taken from `next_event`.
    pub fn apply(&mut self, msg: ActivityMessage) {
        let effects = self.runner.on_activity(msg);
        self.perform(effects);
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Launch(index) => {
                    let task = &self.runner.tasks()[index];
                    let handle = self.launcher.launch(task);
                    debug!(task = %task.id, pid = ?handle.pid, "launch attached to relay");
                    self.relay.attach(handle);
                }
                Effect::AwaitActivity => self.armed = true,
            }
        }
    }

    /// Drive the session to completion, reporting each message to `observe`
    /// before it is applied.
    pub async fn run_to_completion(
        &mut self,
        mut observe: impl FnMut(&TaskRunner, &ActivityMessage),
    ) {
        while self.armed {
            let msg = self.next_event().await;
            observe(&self.runner, &msg);
            self.apply(msg);
        }
    }
}
