use super::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One-line footer of `key description` pairs.
pub fn key_hints(hints: &[(&str, &str)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", theme.subtle()));
        }
        spans.push(Span::styled(key.to_string(), theme.key()));
        spans.push(Span::styled(format!(" {desc}"), theme.subtle()));
    }
    Line::from(spans)
}

fn bind(key: &str, desc: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{key:<12}"), theme.key()),
        Span::raw(desc.to_string()),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, theme: &Theme) {
    let p = Paragraph::new(vec![
        Line::from("Global:"),
        bind("Ctrl-C", "Quit", theme),
        bind("?", "Show this help (from the menu)", theme),
        Line::from(""),
        Line::from("Task picker:"),
        bind("space", "Toggle task", theme),
        bind("a", "Toggle all", theme),
        bind("/", "Filter by name", theme),
        bind("enter", "Run checked tasks", theme),
        Line::from(""),
        Line::from("Running:"),
        bind("↑/↓ j/k", "Scroll output", theme),
        bind("PgUp/PgDn", "Scroll a page", theme),
        bind("g/G", "Top / follow tail", theme),
        bind("tab", "Next task's output (when finished)", theme),
        bind("enter/q", "Back to menu (when finished)", theme),
        Line::from(""),
        Line::from("Settings:"),
        bind("a", "Add task", theme),
        bind("e/enter", "Edit task", theme),
        bind("d", "Delete task", theme),
        bind("tab", "Next field (in form)", theme),
        bind("esc", "Cancel / back", theme),
        Line::from(""),
        Line::from(Span::styled("Press any key to return.", theme.subtle())),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
