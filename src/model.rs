use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a task definition comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Builtin,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    Failed,
}

#[cfg_attr(not(feature = "tui"), allow(dead_code))]
impl TaskStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

/// A runnable unit of work plus the state it accumulates during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub kind: TaskKind,
    pub status: TaskStatus,
    // Append-only; one entry per line emitted by the process.
    pub output: Vec<String>,
    pub error: Option<String>,
    pub elapsed: Option<Duration>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
        kind: TaskKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            command: command.into(),
            args,
            kind,
            status: TaskStatus::Pending,
            output: Vec::new(),
            error: None,
            elapsed: None,
        }
    }

    /// Command and arguments rendered the way a user would type them.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            return self.command.clone();
        }
        format!(
            "{} {}",
            self.command,
            crate::shell::join_args(&self.args)
        )
    }
}

/// Terminal result of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Launch error or non-zero exit; carries a human-readable detail.
    Failure(String),
}

/// The only payload crossing from a launch into the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityMessage {
    OutputLine(String),
    Finished(Outcome),
}

/// Anything a list widget can show and filter.
#[cfg_attr(not(feature = "tui"), allow(dead_code))]
pub trait Displayable {
    fn title(&self) -> String;
    fn description(&self) -> String;
    fn filter_key(&self) -> String;
}

impl Displayable for Task {
    fn title(&self) -> String {
        match self.kind {
            TaskKind::Builtin => format!("[builtin] {}", self.name),
            TaskKind::Custom => self.name.clone(),
        }
    }

    fn description(&self) -> String {
        self.command_line()
    }

    fn filter_key(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_arguments_with_spaces() {
        let task = Task::new(
            "custom-greet",
            "Greet",
            "bash",
            vec!["-c".into(), "echo hello".into()],
            TaskKind::Custom,
        );
        assert_eq!(task.command_line(), "bash -c \"echo hello\"");
    }

    #[test]
    fn builtin_titles_are_tagged() {
        let task = Task::new("dnf", "System packages", "sudo", vec![], TaskKind::Builtin);
        assert_eq!(task.title(), "[builtin] System packages");
        assert_eq!(task.filter_key(), "System packages");
        assert_eq!(task.description(), "sudo");
    }
}
