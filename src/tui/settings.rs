//! Custom task management: a list of tasks and an add/edit form.

use super::help::key_hints;
use super::theme::Theme;
use crate::catalog::TaskCatalog;
use crate::model::{Displayable, Task, TaskKind};
use crate::shell::{join_args, parse_args};
use crate::storage::CustomTask;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::warn;

/// One row of the settings list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsItem {
    Builtin(Task),
    Custom(CustomTask),
    AddNew,
}

impl Displayable for SettingsItem {
    fn title(&self) -> String {
        match self {
            SettingsItem::Builtin(task) => task.title(),
            SettingsItem::Custom(ct) => ct.name.clone(),
            SettingsItem::AddNew => "+ Add task".to_string(),
        }
    }

    fn description(&self) -> String {
        match self {
            SettingsItem::Builtin(task) => task.description(),
            SettingsItem::Custom(ct) if ct.args.is_empty() => ct.command.clone(),
            SettingsItem::Custom(ct) => format!("{} {}", ct.command, join_args(&ct.args)),
            SettingsItem::AddNew => "Create a new custom task".to_string(),
        }
    }

    fn filter_key(&self) -> String {
        match self {
            SettingsItem::Builtin(task) => task.filter_key(),
            SettingsItem::Custom(ct) => ct.name.clone(),
            SettingsItem::AddNew => String::new(),
        }
    }
}

fn items(catalog: &TaskCatalog) -> Vec<SettingsItem> {
    let mut items: Vec<SettingsItem> = catalog
        .tasks()
        .into_iter()
        .filter(|t| t.kind == TaskKind::Builtin)
        .map(SettingsItem::Builtin)
        .collect();
    let custom = catalog.custom_tasks().iter().cloned();
    items.extend(custom.map(SettingsItem::Custom));
    items.push(SettingsItem::AddNew);
    items
}

/// Form fields: label and character limit.
const FIELDS: [(&str, usize); 3] = [("Name", 50), ("Command", 50), ("Arguments", 100)];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    values: [String; 3],
    focus: usize,
    // Id of the custom task being edited; `None` when adding.
    editing: Option<String>,
    error: Option<String>,
}

impl TaskForm {
    fn edit(ct: &CustomTask) -> Self {
        Self {
            values: [ct.name.clone(), ct.command.clone(), join_args(&ct.args)],
            editing: Some(ct.id.clone()),
            ..Default::default()
        }
    }

    fn insert(&mut self, c: char) {
        let (_, limit) = FIELDS[self.focus];
        let value = &mut self.values[self.focus];
        if value.chars().count() < limit {
            value.push(c);
        }
    }

    fn next(&mut self) {
        self.focus = (self.focus + 1) % FIELDS.len();
    }

    fn prev(&mut self) {
        self.focus = (self.focus + FIELDS.len() - 1) % FIELDS.len();
    }

    /// Trimmed name, command and parsed arguments.
    fn validate(&self) -> Result<(String, String, Vec<String>), String> {
        let name = self.values[0].trim();
        let command = self.values[1].trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if command.is_empty() {
            return Err("Command is required".to_string());
        }
        if command.chars().any(char::is_whitespace) {
            return Err("Command must be a single program; put arguments in Arguments".to_string());
        }
        let args = parse_args(&self.values[2]).map_err(|e| format!("Arguments: {e}"))?;
        Ok((name.to_string(), command.to_string(), args))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    List,
    Form(TaskForm),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    Back,
}

pub struct SettingsState {
    items: Vec<SettingsItem>,
    cursor: usize,
    mode: Mode,
    status: Option<String>,
}

impl SettingsState {
    pub fn new(catalog: &TaskCatalog) -> Self {
        Self {
            items: items(catalog),
            cursor: 0,
            mode: Mode::List,
            status: None,
        }
    }

    fn reload(&mut self, catalog: &TaskCatalog) {
        self.items = items(catalog);
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent, catalog: &mut TaskCatalog) -> SettingsAction {
        match &mut self.mode {
            Mode::List => self.handle_list_key(key, catalog),
            Mode::Form(form) => {
                match key.code {
                    KeyCode::Esc => self.mode = Mode::List,
                    KeyCode::Tab | KeyCode::Down => form.next(),
                    KeyCode::BackTab | KeyCode::Up => form.prev(),
                    KeyCode::Backspace => {
                        form.values[form.focus].pop();
                    }
                    KeyCode::Enter if form.focus + 1 < FIELDS.len() => form.next(),
                    KeyCode::Enter => self.submit(catalog),
                    KeyCode::Char(c) => form.insert(c),
                    _ => {}
                }
                SettingsAction::None
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent, catalog: &mut TaskCatalog) -> SettingsAction {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.items.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('a') => self.open_form(TaskForm::default()),
            KeyCode::Char('e') | KeyCode::Enter => match self.items.get(self.cursor) {
                Some(SettingsItem::Custom(ct)) => {
                    let form = TaskForm::edit(ct);
                    self.open_form(form);
                }
                Some(SettingsItem::AddNew) => self.open_form(TaskForm::default()),
                Some(SettingsItem::Builtin(_)) => {
                    self.status = Some("Builtin tasks cannot be edited.".to_string());
                }
                None => {}
            },
            KeyCode::Char('d') => match self.items.get(self.cursor) {
                Some(SettingsItem::Custom(ct)) => {
                    let (id, name) = (ct.id.clone(), ct.name.clone());
                    match catalog.remove_custom(&id) {
                        Ok(()) => self.status = Some(format!("Deleted {name}.")),
                        Err(e) => {
                            warn!(task = %id, error = %format!("{e:#}"), "failed to delete task");
                            self.status = Some(format!("Delete failed: {e:#}"));
                        }
                    }
                    self.reload(catalog);
                }
                Some(SettingsItem::Builtin(_)) => {
                    self.status = Some("Builtin tasks cannot be deleted.".to_string());
                }
                _ => {}
            },
            KeyCode::Esc | KeyCode::Char('q') => return SettingsAction::Back,
            _ => {}
        }
        SettingsAction::None
    }

    fn open_form(&mut self, form: TaskForm) {
        self.status = None;
        self.mode = Mode::Form(form);
    }

    fn submit(&mut self, catalog: &mut TaskCatalog) {
        let Mode::Form(form) = &mut self.mode else {
            return;
        };
        let (name, command, args) = match form.validate() {
            Ok(fields) => fields,
            Err(msg) => {
                form.error = Some(msg);
                return;
            }
        };
        let saved = match &form.editing {
            Some(id) => catalog.update_custom(id, &name, &command, args),
            None => catalog.add_custom(&name, &command, args).map(|_| ()),
        };
        match saved {
            Ok(()) => {
                self.status = Some(format!("Saved {name}."));
                self.mode = Mode::List;
                self.reload(catalog);
            }
            Err(e) => {
                warn!(task = %name, error = %format!("{e:#}"), "failed to save task");
                form.error = Some(format!("Save failed: {e:#}"));
            }
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        match &self.mode {
            Mode::List => self.draw_list(f, chunks[0], theme),
            Mode::Form(form) => draw_form(form, f, chunks[0], theme),
        }

        let status = match &self.mode {
            Mode::Form(TaskForm {
                error: Some(err), ..
            }) => Line::from(Span::styled(err.clone(), theme.error())),
            Mode::List => Line::from(Span::styled(
                self.status.clone().unwrap_or_default(),
                theme.subtle(),
            )),
            Mode::Form(_) => Line::from(""),
        };
        f.render_widget(Paragraph::new(status), chunks[1]);

        let hints: &[(&str, &str)] = match self.mode {
            Mode::List => &[
                ("a", "add"),
                ("e", "edit"),
                ("d", "delete"),
                ("esc", "back"),
            ],
            Mode::Form(_) => &[("tab", "next field"), ("enter", "save"), ("esc", "cancel")],
        };
        f.render_widget(Paragraph::new(key_hints(hints, theme)), chunks[2]);
    }

    fn draw_list(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            let is_cursor = i == self.cursor;
            let mut style = if is_cursor {
                theme.selected()
            } else {
                Style::default()
            };
            if matches!(item, SettingsItem::Builtin(_)) {
                style = style.add_modifier(Modifier::DIM);
            }
            lines.push(Line::from(vec![
                Span::styled(if is_cursor { "› " } else { "  " }, theme.selected()),
                Span::styled(item.title(), style),
            ]));
            lines.push(Line::from(Span::styled(
                format!("    {}", item.description()),
                theme.subtle(),
            )));
        }
        let rows = area.height.saturating_sub(2) as usize;
        let scroll = (self.cursor * 2 + 1).saturating_sub(rows.saturating_sub(1));
        f.render_widget(
            Paragraph::new(lines)
                .scroll((scroll as u16, 0))
                .block(Block::default().borders(Borders::ALL).title("Settings")),
            area,
        );
    }
}

fn draw_form(form: &TaskForm, f: &mut Frame, area: Rect, theme: &Theme) {
    let title = if form.editing.is_some() {
        "Edit task"
    } else {
        "Add task"
    };
    let mut lines = Vec::new();
    for (i, (label, limit)) in FIELDS.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            theme.title()
        } else {
            theme.subtle()
        };
        lines.push(Line::from(vec![
            Span::styled(label.to_string(), label_style),
            Span::styled(
                format!(" ({}/{limit})", form.values[i].chars().count()),
                theme.subtle(),
            ),
        ]));
        let mut value = vec![
            Span::styled(if focused { "› " } else { "  " }, theme.selected()),
            Span::raw(form.values[i].clone()),
        ];
        if focused {
            value.push(Span::styled("▏", theme.selected()));
        }
        lines.push(Line::from(value));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Arguments use shell quoting: \"two words\" stays one argument.",
        theme.subtle(),
    )));
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}
