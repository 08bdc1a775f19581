mod process;
mod relay;

pub use process::ProcessLauncher;
pub use relay::ActivityRelay;

use crate::model::{ActivityMessage, Task};
use tokio::sync::mpsc;

/// Starts the process behind a task and hands back its activity stream.
///
/// Implementations must not block the caller. The handle yields zero or more
/// `OutputLine`s followed by exactly one `Finished`.
pub trait Launcher: Send {
    fn launch(&self, task: &Task) -> LaunchHandle;
}

/// Receiving side of one launch.
pub struct LaunchHandle {
    pub(crate) rx: mpsc::UnboundedReceiver<ActivityMessage>,
    pub pid: Option<u32>,
}

impl LaunchHandle {
    pub fn new(rx: mpsc::UnboundedReceiver<ActivityMessage>, pid: Option<u32>) -> Self {
        Self { rx, pid }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::model::Outcome;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Launcher that replays canned output per command instead of spawning.
    #[derive(Default, Clone)]
    pub(crate) struct ScriptedLauncher {
        scripts: HashMap<String, (Vec<String>, Outcome)>,
        pub launched: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedLauncher {
        pub(crate) fn script(mut self, command: &str, lines: &[&str], outcome: Outcome) -> Self {
            self.scripts.insert(
                command.to_string(),
                (lines.iter().map(|l| l.to_string()).collect(), outcome),
            );
            self
        }
    }

    impl Launcher for ScriptedLauncher {
        fn launch(&self, task: &Task) -> LaunchHandle {
            self.launched.lock().unwrap().push(task.command.clone());
            let (tx, rx) = mpsc::unbounded_channel();
            let (lines, outcome) = self.scripts.get(&task.command).cloned().unwrap_or((
                Vec::new(),
                Outcome::Failure(format!("no script for {}", task.command)),
            ));
            for line in lines {
                tx.send(ActivityMessage::OutputLine(line)).unwrap();
            }
            tx.send(ActivityMessage::Finished(outcome)).unwrap();
            LaunchHandle::new(rx, None)
        }
    }
}
