//! Task runner state machine.
//!
//! The runner is pure: every transition returns the effects the session must
//! carry out (launch a task, wait for the next activity message). This keeps
//! it free of channels and processes, and lets every invariant be tested with
//! plain message sequences.

use crate::model::{ActivityMessage, Outcome, Task, TaskStatus};
use std::time::Instant;
use tracing::{debug, info};

pub const NOTHING_TO_DO: &str = "Nothing to update.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running(usize),
    Completed,
}

/// Work requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Launch(usize),
    AwaitActivity,
}

#[derive(Debug)]
pub struct TaskRunner {
    tasks: Vec<Task>,
    state: RunnerState,
    // Number of tasks that reached a terminal status.
    finished: usize,
    notice: Option<String>,
    exit: bool,
    task_started: Option<Instant>,
}

#[cfg_attr(not(feature = "tui"), allow(dead_code))]
impl TaskRunner {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            state: RunnerState::Idle,
            finished: 0,
            notice: None,
            exit: false,
            task_started: None,
        }
    }

    pub fn start(&mut self) -> Vec<Effect> {
        if self.state != RunnerState::Idle {
            return Vec::new();
        }
        if self.tasks.is_empty() {
            info!("no tasks selected");
            self.state = RunnerState::Completed;
            self.notice = Some(NOTHING_TO_DO.to_string());
            return Vec::new();
        }
        self.begin(0)
    }

    fn begin(&mut self, index: usize) -> Vec<Effect> {
        let task = &mut self.tasks[index];
        task.status = TaskStatus::Running;
        info!(task = %task.id, index, "task started");
        self.task_started = Some(Instant::now());
        self.state = RunnerState::Running(index);
        vec![Effect::Launch(index), Effect::AwaitActivity]
    }

    pub fn on_activity(&mut self, msg: ActivityMessage) -> Vec<Effect> {
        let RunnerState::Running(index) = self.state else {
            debug!(state = ?self.state, "activity outside of a run ignored");
            return Vec::new();
        };
        match msg {
            ActivityMessage::OutputLine(line) => {
                self.tasks[index].output.push(line);
                vec![Effect::AwaitActivity]
            }
            ActivityMessage::Finished(outcome) => {
                let task = &mut self.tasks[index];
                task.elapsed = self.task_started.take().map(|t| t.elapsed());
                match outcome {
                    Outcome::Success => task.status = TaskStatus::Done,
                    Outcome::Failure(detail) => {
                        task.status = TaskStatus::Failed;
                        task.error = Some(detail);
                    }
                }
                info!(task = %task.id, status = ?task.status, "task finished");
                self.finished = index + 1;
                if self.finished == self.tasks.len() {
                    self.state = RunnerState::Completed;
                    info!(failed = self.failed_count(), total = self.tasks.len(), "run completed");
                    Vec::new()
                } else {
                    self.begin(index + 1)
                }
            }
        }
    }

    /// Acknowledge the summary. Only honoured once the run is complete.
    pub fn acknowledge(&mut self) -> bool {
        if self.state == RunnerState::Completed {
            self.exit = true;
        }
        self.exit
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Index of the running task; equals the number of finished tasks.
    pub fn current_index(&self) -> usize {
        self.finished
    }

    pub fn active_task(&self) -> Option<&Task> {
        match self.state {
            RunnerState::Running(i) => self.tasks.get(i),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == RunnerState::Completed
    }

    pub fn exit(&self) -> bool {
        self.exit
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return if self.is_done() { 1.0 } else { 0.0 };
        }
        self.finished as f64 / self.tasks.len() as f64
    }

    pub fn failed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count()
    }

    pub fn any_failed(&self) -> bool {
        self.failed_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskKind;

    fn tasks(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| {
                Task::new(
                    format!("t{i}"),
                    format!("Task {i}"),
                    format!("cmd{i}"),
                    vec![],
                    TaskKind::Custom,
                )
            })
            .collect()
    }

    fn line(s: &str) -> ActivityMessage {
        ActivityMessage::OutputLine(s.to_string())
    }

    fn ok() -> ActivityMessage {
        ActivityMessage::Finished(Outcome::Success)
    }

    fn fail(detail: &str) -> ActivityMessage {
        ActivityMessage::Finished(Outcome::Failure(detail.to_string()))
    }

    #[test]
    fn empty_list_completes_immediately() {
        let mut runner = TaskRunner::new(Vec::new());
        assert!(runner.start().is_empty());
        assert_eq!(runner.state(), RunnerState::Completed);
        assert_eq!(runner.notice(), Some(NOTHING_TO_DO));
        assert_eq!(runner.progress(), 1.0);
    }

    #[test]
    fn start_launches_first_task_and_arms_relay() {
        let mut runner = TaskRunner::new(tasks(2));
        assert_eq!(runner.state(), RunnerState::Idle);
        assert_eq!(runner.start(), vec![Effect::Launch(0), Effect::AwaitActivity]);
        assert_eq!(runner.state(), RunnerState::Running(0));
        assert_eq!(runner.tasks()[0].status, TaskStatus::Running);
        assert_eq!(runner.tasks()[1].status, TaskStatus::Pending);
        // A second start is a no-op.
        assert!(runner.start().is_empty());
    }

    #[test]
    fn output_lines_accumulate_and_rearm() {
        let mut runner = TaskRunner::new(tasks(1));
        runner.start();
        assert_eq!(runner.on_activity(line("a")), vec![Effect::AwaitActivity]);
        assert_eq!(runner.on_activity(line("b")), vec![Effect::AwaitActivity]);
        assert_eq!(runner.tasks()[0].output, vec!["a", "b"]);
        assert_eq!(runner.tasks()[0].status, TaskStatus::Running);
    }

    #[test]
    fn failure_does_not_stop_the_sequence() {
        let mut runner = TaskRunner::new(tasks(2));
        runner.start();
        runner.on_activity(line("building"));
        assert_eq!(
            runner.on_activity(fail("cmd0 exited with exit status: 1")),
            vec![Effect::Launch(1), Effect::AwaitActivity]
        );
        runner.on_activity(ok());

        assert!(runner.is_done());
        let statuses: Vec<_> = runner.tasks().iter().map(|t| t.status).collect();
        assert_eq!(statuses, vec![TaskStatus::Failed, TaskStatus::Done]);
        assert_eq!(
            runner.tasks()[0].error.as_deref(),
            Some("cmd0 exited with exit status: 1")
        );
        assert_eq!(runner.tasks()[0].output, vec!["building"]);
        assert_eq!(runner.failed_count(), 1);
        assert!(runner.any_failed());
    }

    #[test]
    fn progress_tracks_finished_tasks() {
        let mut runner = TaskRunner::new(tasks(4));
        runner.start();
        assert_eq!(runner.progress(), 0.0);
        runner.on_activity(ok());
        assert_eq!(runner.progress(), 0.25);
        runner.on_activity(ok());
        assert_eq!(runner.progress(), 0.50);
        runner.on_activity(fail("x"));
        runner.on_activity(ok());
        assert_eq!(runner.progress(), 1.0);
    }

    #[test]
    fn current_index_advances_by_one_per_finish() {
        let mut runner = TaskRunner::new(tasks(3));
        runner.start();
        let mut seen = vec![runner.current_index()];
        let script = [line("x"), ok(), line("y"), line("z"), fail("f"), ok()];
        for msg in script {
            let finish = matches!(msg, ActivityMessage::Finished(_));
            let before = runner.current_index();
            runner.on_activity(msg);
            let after = runner.current_index();
            assert_eq!(after - before, usize::from(finish));
            seen.push(after);
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(runner.current_index(), 3);
    }

    #[test]
    fn completion_leaves_only_terminal_statuses() {
        for n in 1..6 {
            let mut runner = TaskRunner::new(tasks(n));
            runner.start();
            for i in 0..n {
                runner.on_activity(line("out"));
                runner.on_activity(if i % 2 == 0 { ok() } else { fail("bad") });
            }
            assert!(runner.is_done());
            assert!(runner.tasks().iter().all(|t| t.status.is_finished()));
            assert!(runner.tasks().iter().all(|t| t.elapsed.is_some()));
        }
    }

    #[test]
    fn lines_after_completion_are_ignored() {
        let mut runner = TaskRunner::new(tasks(1));
        runner.start();
        runner.on_activity(ok());
        assert!(runner.on_activity(line("late")).is_empty());
        assert!(runner.tasks()[0].output.is_empty());
    }

    #[test]
    fn lines_after_finish_go_to_the_next_task() {
        let mut runner = TaskRunner::new(tasks(2));
        runner.start();
        runner.on_activity(line("first"));
        runner.on_activity(ok());
        runner.on_activity(line("second"));
        assert_eq!(runner.tasks()[0].output, vec!["first"]);
        assert_eq!(runner.tasks()[1].output, vec!["second"]);
    }

    #[test]
    fn five_hundred_lines_are_kept_in_order() {
        let mut runner = TaskRunner::new(tasks(1));
        runner.start();
        for i in 0..500 {
            runner.on_activity(line(&format!("line {i}")));
        }
        runner.on_activity(ok());
        let output = &runner.tasks()[0].output;
        assert_eq!(output.len(), 500);
        assert!(output
            .iter()
            .enumerate()
            .all(|(i, l)| *l == format!("line {i}")));
    }

    #[test]
    fn acknowledge_only_after_completion() {
        let mut runner = TaskRunner::new(tasks(1));
        runner.start();
        assert!(!runner.acknowledge());
        assert!(!runner.exit());
        runner.on_activity(ok());
        assert!(runner.acknowledge());
        assert!(runner.exit());
    }
}
