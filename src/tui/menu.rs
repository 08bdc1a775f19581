use super::help::key_hints;
use super::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run,
    Settings,
    Help,
    Quit,
}

const ENTRIES: &[(MenuChoice, &str, &str)] = &[
    (MenuChoice::Run, "Run updates", "Pick tasks and run them in order"),
    (MenuChoice::Settings, "Settings", "Add, edit or remove custom tasks"),
    (MenuChoice::Quit, "Quit", "Leave task-updater"),
];

#[derive(Debug, Default)]
pub struct MenuState {
    cursor: usize,
}

impl MenuState {
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<MenuChoice> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.checked_sub(1).unwrap_or(ENTRIES.len() - 1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1) % ENTRIES.len();
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => Some(ENTRIES[self.cursor].0),
            KeyCode::Char('?') => Some(MenuChoice::Help),
            KeyCode::Char('q') | KeyCode::Esc => Some(MenuChoice::Quit),
            _ => None,
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let mut lines = vec![
            Line::from(Span::styled("What would you like to do?", theme.title())),
            Line::from(""),
        ];
        for (i, (_, label, desc)) in ENTRIES.iter().enumerate() {
            let (cursor, style) = if i == self.cursor {
                ("› ", theme.selected())
            } else {
                ("  ", ratatui::style::Style::default())
            };
            lines.push(Line::from(vec![
                Span::styled(cursor, theme.selected()),
                Span::styled(label.to_string(), style),
            ]));
            lines.push(Line::from(Span::styled(format!("    {desc}"), theme.subtle())));
        }
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Menu")),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new(key_hints(
                &[("↑/↓", "move"), ("enter", "select"), ("?", "help"), ("q", "quit")],
                theme,
            )),
            chunks[1],
        );
    }
}
