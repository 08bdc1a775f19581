use crate::model::TaskStatus;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

/// Read-only colour and style registry shared by every screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub subtle: Color,
    pub success: Color,
    pub error: Color,
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Indexed(205),
            secondary: Color::Indexed(63),
            subtle: Color::Indexed(241),
            success: Color::Indexed(42),
            error: Color::Indexed(160),
            highlight: Color::Indexed(212),
        }
    }
}

impl Theme {
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn subtle(&self) -> Style {
        Style::default().fg(self.subtle)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    pub fn key(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Check, cross or ellipsis for a task's status.
    pub fn status_mark(&self, status: TaskStatus) -> Span<'static> {
        match status {
            TaskStatus::Done => Span::styled("✓", self.success()),
            TaskStatus::Failed => Span::styled("✗", self.error()),
            TaskStatus::Running => Span::styled("…", self.subtle()),
            TaskStatus::Pending => Span::raw(" "),
        }
    }
}
