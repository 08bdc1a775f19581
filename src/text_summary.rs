//! Text summary builder for headless output.

use crate::model::{Task, TaskStatus};
use std::time::Duration;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Human-readable task duration: milliseconds under a second, whole seconds
/// above.
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let rounded = if elapsed < Duration::from_secs(1) {
        Duration::from_millis(elapsed.as_millis() as u64)
    } else {
        Duration::from_secs(elapsed.as_secs())
    };
    humantime::format_duration(rounded).to_string()
}

/// One line per task in run order, then a totals line.
pub(crate) fn build_text_summary(tasks: &[Task], notice: Option<&str>) -> TextSummary {
    let mut lines = Vec::new();
    if let Some(notice) = notice {
        lines.push(notice.to_string());
        return TextSummary { lines };
    }

    for task in tasks {
        let line = match task.status {
            TaskStatus::Done => {
                let elapsed = task.elapsed.map(format_elapsed).unwrap_or_default();
                format!("✓ {} ({elapsed})", task.name)
            }
            TaskStatus::Failed => format!(
                "✗ {}: {}",
                task.name,
                task.error.as_deref().unwrap_or("failed")
            ),
            TaskStatus::Pending | TaskStatus::Running => format!("  {} (not run)", task.name),
        };
        lines.push(line);
    }

    let failed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Failed)
        .count();
    let succeeded = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .count();
    lines.push(format!(
        "{succeeded} succeeded, {failed} failed, {} total",
        tasks.len()
    ));
    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskKind;

    fn finished(name: &str, status: TaskStatus, error: Option<&str>, ms: u64) -> Task {
        let mut t = Task::new(name, name, name, vec![], TaskKind::Custom);
        t.status = status;
        t.error = error.map(str::to_string);
        t.elapsed = Some(Duration::from_millis(ms));
        t
    }

    #[test]
    fn elapsed_is_rounded() {
        assert_eq!(format_elapsed(Duration::from_micros(245_600)), "245ms");
        assert_eq!(format_elapsed(Duration::from_millis(3_700)), "3s");
        assert_eq!(format_elapsed(Duration::from_secs(75)), "1m 15s");
    }

    #[test]
    fn summary_lists_each_task_and_totals() {
        let tasks = vec![
            finished("dnf", TaskStatus::Done, None, 2_000),
            finished("npm", TaskStatus::Failed, Some("npm exited with exit status: 1"), 10),
        ];
        let summary = build_text_summary(&tasks, None);
        assert_eq!(
            summary.lines,
            vec![
                "✓ dnf (2s)",
                "✗ npm: npm exited with exit status: 1",
                "1 succeeded, 1 failed, 2 total",
            ]
        );
    }

    #[test]
    fn notice_replaces_summary() {
        let summary = build_text_summary(&[], Some("Nothing to update."));
        assert_eq!(summary.lines, vec!["Nothing to update."]);
    }
}
