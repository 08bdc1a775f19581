//! Task picker: choose which tasks to run.

use super::help::key_hints;
use super::theme::Theme;
use crate::model::{Displayable, Task};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Run(Vec<Task>),
    Back,
}

pub struct PickerState {
    tasks: Vec<Task>,
    checked: Vec<bool>,
    // Position within the filtered list.
    cursor: usize,
    filter: String,
    filtering: bool,
}

impl PickerState {
    pub fn new(tasks: Vec<Task>) -> Self {
        let checked = vec![true; tasks.len()];
        Self {
            tasks,
            checked,
            cursor: 0,
            filter: String::new(),
            filtering: false,
        }
    }

    /// Indices of tasks matching the filter, in catalog order.
    fn visible(&self) -> Vec<usize> {
        let needle = self.filter.to_lowercase();
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.filter_key().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        if self.filtering {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.filtering = false,
                KeyCode::Backspace => {
                    self.filter.pop();
                    self.clamp_cursor();
                }
                KeyCode::Char(c) => {
                    self.filter.push(c);
                    self.clamp_cursor();
                }
                _ => {}
            }
            return PickerAction::None;
        }

        let visible = self.visible();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < visible.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(&i) = visible.get(self.cursor) {
                    self.checked[i] = !self.checked[i];
                }
            }
            KeyCode::Char('a') => {
                let all = self.checked.iter().all(|c| *c);
                self.checked.iter_mut().for_each(|c| *c = !all);
            }
            KeyCode::Char('/') => self.filtering = true,
            KeyCode::Enter => {
                let chosen = self
                    .tasks
                    .iter()
                    .zip(&self.checked)
                    .filter(|(_, checked)| **checked)
                    .map(|(t, _)| t.clone())
                    .collect();
                return PickerAction::Run(chosen);
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                if self.filter.is_empty() {
                    return PickerAction::Back;
                }
                self.filter.clear();
                self.clamp_cursor();
            }
            _ => {}
        }
        PickerAction::None
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let selected = self.checked.iter().filter(|c| **c).count();
        let mut header = vec![Span::styled(
            format!("{selected} of {} tasks selected", self.tasks.len()),
            theme.title(),
        )];
        if self.filtering || !self.filter.is_empty() {
            header.push(Span::styled("  filter: ", theme.subtle()));
            header.push(Span::raw(self.filter.clone()));
            if self.filtering {
                header.push(Span::styled("▏", theme.selected()));
            }
        }
        f.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

        let visible = self.visible();
        let mut lines = Vec::new();
        if self.tasks.is_empty() {
            lines.push(Line::from(Span::styled(
                "No tasks configured. Add one in Settings.",
                theme.subtle(),
            )));
        } else if visible.is_empty() {
            lines.push(Line::from(Span::styled("No matching tasks.", theme.subtle())));
        }
        for (row, &i) in visible.iter().enumerate() {
            let task = &self.tasks[i];
            let is_cursor = row == self.cursor;
            let box_mark = if self.checked[i] { "[x]" } else { "[ ]" };
            let style = if is_cursor {
                theme.selected()
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(if is_cursor { "› " } else { "  " }, theme.selected()),
                Span::styled(format!("{box_mark} {}", task.title()), style),
            ]));
            lines.push(Line::from(Span::styled(
                format!("      {}", task.description()),
                theme.subtle(),
            )));
        }
        // Keep the cursor row on screen.
        let rows = chunks[1].height.saturating_sub(2) as usize;
        let cursor_row = self.cursor * 2 + 1;
        let scroll = cursor_row.saturating_sub(rows.saturating_sub(1));
        f.render_widget(
            Paragraph::new(lines)
                .scroll((scroll as u16, 0))
                .block(Block::default().borders(Borders::ALL).title("Run updates")),
            chunks[1],
        );

        let hints: &[(&str, &str)] = if self.filtering {
            &[("enter/esc", "done filtering"), ("backspace", "delete")]
        } else {
            &[
                ("space", "toggle"),
                ("a", "all"),
                ("/", "filter"),
                ("enter", "run"),
                ("esc", "back"),
            ]
        };
        f.render_widget(Paragraph::new(key_hints(hints, theme)), chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskKind;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn picker() -> PickerState {
        PickerState::new(vec![
            Task::new("dnf", "System packages (dnf)", "sudo", vec![], TaskKind::Builtin),
            Task::new("flatpak", "Flatpak applications", "flatpak", vec![], TaskKind::Builtin),
            Task::new("custom-npm", "Npm globals", "npm", vec![], TaskKind::Custom),
        ])
    }

    fn ids(action: PickerAction) -> Vec<String> {
        match action {
            PickerAction::Run(tasks) => tasks.into_iter().map(|t| t.id).collect(),
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn everything_is_checked_initially() {
        let mut p = picker();
        assert_eq!(
            ids(p.handle_key(key(KeyCode::Enter))),
            vec!["dnf", "flatpak", "custom-npm"]
        );
    }

    #[test]
    fn space_toggles_the_cursor_row() {
        let mut p = picker();
        p.handle_key(key(KeyCode::Down));
        p.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(ids(p.handle_key(key(KeyCode::Enter))), vec!["dnf", "custom-npm"]);
    }

    #[test]
    fn toggle_all() {
        let mut p = picker();
        p.handle_key(key(KeyCode::Char('a')));
        assert!(ids(p.handle_key(key(KeyCode::Enter))).is_empty());
        p.handle_key(key(KeyCode::Char('a')));
        assert_eq!(ids(p.handle_key(key(KeyCode::Enter))).len(), 3);
    }

    #[test]
    fn filter_matches_names_case_insensitively() {
        let mut p = picker();
        p.handle_key(key(KeyCode::Char('/')));
        for c in "NPM".chars() {
            p.handle_key(key(KeyCode::Char(c)));
        }
        p.handle_key(key(KeyCode::Enter));
        assert_eq!(p.visible(), vec![2]);

        // Toggling acts on the filtered row; the run keeps catalog order.
        p.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(ids(p.handle_key(key(KeyCode::Enter))), vec!["dnf", "flatpak"]);
    }

    #[test]
    fn esc_clears_filter_before_going_back() {
        let mut p = picker();
        p.handle_key(key(KeyCode::Char('/')));
        p.handle_key(key(KeyCode::Char('z')));
        p.handle_key(key(KeyCode::Esc));
        assert!(p.visible().is_empty());
        assert_eq!(p.handle_key(key(KeyCode::Esc)), PickerAction::None);
        assert_eq!(p.visible().len(), 3);
        assert_eq!(p.handle_key(key(KeyCode::Esc)), PickerAction::Back);
    }
}
