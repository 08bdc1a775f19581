//! Running and completed views of a run.

use super::help::key_hints;
use super::pane::OutputPane;
use super::theme::Theme;
use crate::engine::Launcher;
use crate::model::{ActivityMessage, Task, TaskStatus};
use crate::orchestrator::{RunSession, NOTHING_TO_DO};
use crate::text_summary::format_elapsed;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const STILL_RUNNING: &str = "Tasks are still running and cannot be cancelled.";

struct Areas {
    header: Rect,
    tasks: Rect,
    gauge: Rect,
    output: Rect,
    footer: Rect,
}

fn split(area: Rect, task_count: usize) -> Areas {
    let list_height = (task_count.max(1) as u16).saturating_add(2);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(list_height),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    Areas {
        header: chunks[0],
        tasks: chunks[1],
        gauge: chunks[2],
        output: chunks[3],
        footer: chunks[4],
    }
}

pub struct RunnerView {
    session: RunSession,
    pane: OutputPane,
    pane_rows: usize,
    spinner: usize,
    // Task whose output is shown once the run is complete.
    selected: usize,
    hint: Option<String>,
}

impl RunnerView {
    pub fn start(tasks: Vec<Task>, launcher: Box<dyn Launcher>, area: Rect) -> Self {
        let mut view = Self {
            session: RunSession::start(tasks, launcher),
            pane: OutputPane::default(),
            pane_rows: 0,
            spinner: 0,
            selected: 0,
            hint: None,
        };
        view.resize(area);
        view
    }

    pub fn session_mut(&mut self) -> &mut RunSession {
        &mut self.session
    }

    pub fn is_armed(&self) -> bool {
        self.session.is_armed()
    }

    /// True once the user acknowledged the completed run.
    pub fn exit(&self) -> bool {
        self.session.runner().exit()
    }

    pub fn resize(&mut self, area: Rect) {
        let areas = split(area, self.session.runner().tasks().len());
        self.pane_rows = areas.output.height.saturating_sub(2) as usize;
    }

    pub fn on_tick(&mut self) {
        if !self.session.runner().is_done() {
            self.spinner = (self.spinner + 1) % SPINNER.len();
        }
    }

    pub fn on_activity(&mut self, msg: ActivityMessage) {
        match msg {
            ActivityMessage::OutputLine(_) => self.pane.hold(),
            ActivityMessage::Finished(_) => self.pane.bottom(),
        }
        self.session.apply(msg);
        if self.session.runner().is_done() {
            self.selected = self.default_selection();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let total = self.shown_task().map_or(0, |t| t.output.len());
        let rows = self.pane_rows;
        let page = rows.max(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.pane.scroll_up(1, total, rows),
            KeyCode::Down | KeyCode::Char('j') => self.pane.scroll_down(1),
            KeyCode::PageUp => self.pane.scroll_up(page, total, rows),
            KeyCode::PageDown => self.pane.scroll_down(page),
            KeyCode::Home | KeyCode::Char('g') => self.pane.top(total, rows),
            KeyCode::End | KeyCode::Char('G') => self.pane.bottom(),
            KeyCode::Tab => self.select_next(),
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
                if !self.session.runner_mut().acknowledge() {
                    self.hint = Some(STILL_RUNNING.to_string());
                }
            }
            _ => {}
        }
    }

    fn select_next(&mut self) {
        let runner = self.session.runner();
        if !runner.is_done() || runner.tasks().is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % runner.tasks().len();
        self.pane.bottom();
    }

    fn default_selection(&self) -> usize {
        let tasks = self.session.runner().tasks();
        tasks
            .iter()
            .position(|t| t.status == TaskStatus::Failed)
            .unwrap_or(tasks.len().saturating_sub(1))
    }

    fn shown_task(&self) -> Option<&Task> {
        let runner = self.session.runner();
        if runner.is_done() {
            runner.tasks().get(self.selected)
        } else {
            runner.active_task()
        }
    }

    pub fn draw(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let runner = self.session.runner();
        let areas = split(area, runner.tasks().len());

        f.render_widget(Paragraph::new(self.header(theme)), areas.header);
        f.render_widget(
            Paragraph::new(self.task_lines(theme))
                .block(Block::default().borders(Borders::ALL).title("Tasks")),
            areas.tasks,
        );

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(theme.primary))
            .ratio(runner.progress().clamp(0.0, 1.0))
            .label(format!("{}/{}", runner.current_index(), runner.tasks().len()));
        f.render_widget(gauge, areas.gauge);

        self.draw_output(f, areas.output, theme);

        let footer = match (&self.hint, runner.is_done()) {
            (Some(hint), false) => Line::from(Span::styled(hint.clone(), theme.error())),
            (_, false) => key_hints(
                &[("↑/↓", "scroll"), ("PgUp/PgDn", "page"), ("G", "follow")],
                theme,
            ),
            (_, true) => key_hints(
                &[("tab", "next task"), ("↑/↓", "scroll"), ("enter", "back")],
                theme,
            ),
        };
        f.render_widget(Paragraph::new(footer), areas.footer);
    }

    fn header(&self, theme: &Theme) -> Line<'static> {
        let runner = self.session.runner();
        if !runner.is_done() {
            let name = runner
                .active_task()
                .map(|t| t.name.clone())
                .unwrap_or_default();
            return Line::from(vec![
                Span::styled(SPINNER[self.spinner], theme.title()),
                Span::styled(" Running ", theme.title()),
                Span::raw(name),
            ]);
        }
        if let Some(notice) = runner.notice() {
            return Line::from(Span::styled(notice.to_string(), theme.title()));
        }
        let total = runner.tasks().len();
        let failed = runner.failed_count();
        if failed > 0 {
            Line::from(Span::styled(
                format!("{failed} of {total} tasks failed"),
                theme.error().add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(
                format!("All {total} tasks finished"),
                theme.success().add_modifier(Modifier::BOLD),
            ))
        }
    }

    fn task_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let runner = self.session.runner();
        if runner.tasks().is_empty() {
            return vec![Line::from(Span::styled(NOTHING_TO_DO, theme.subtle()))];
        }
        let done = runner.is_done();
        let active = match runner.state() {
            crate::orchestrator::RunnerState::Running(i) => Some(i),
            _ => None,
        };
        runner
            .tasks()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let cursor = if done && i == self.selected {
                    "›"
                } else if active == Some(i) {
                    SPINNER[self.spinner]
                } else {
                    " "
                };
                let name_style = if active == Some(i) {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let mut spans = vec![
                    Span::styled(format!("{cursor} "), theme.selected()),
                    theme.status_mark(t.status),
                    Span::raw(" "),
                    Span::styled(t.name.clone(), name_style),
                ];
                match t.status {
                    TaskStatus::Done => {
                        if let Some(elapsed) = t.elapsed {
                            spans.push(Span::styled(
                                format!("  {}", format_elapsed(elapsed)),
                                theme.subtle(),
                            ));
                        }
                    }
                    TaskStatus::Failed => spans.push(Span::styled(
                        format!("  {}", t.error.as_deref().unwrap_or("failed")),
                        theme.error(),
                    )),
                    _ => {}
                }
                Line::from(spans)
            })
            .collect()
    }

    fn draw_output(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let runner = self.session.runner();
        let Some(task) = self.shown_task() else {
            let p = Paragraph::new(Line::from(Span::styled(
                runner.notice().unwrap_or(NOTHING_TO_DO).to_string(),
                theme.subtle(),
            )))
            .block(Block::default().borders(Borders::ALL).title("Output"));
            f.render_widget(p, area);
            return;
        };

        let title = format!("$ {}", task.command_line());
        let lines: Vec<Line> = if task.output.is_empty() {
            let placeholder = if task.status.is_finished() {
                "(no output)".to_string()
            } else {
                format!("Running {}…", task.name)
            };
            vec![Line::from(Span::styled(placeholder, theme.subtle()))]
        } else {
            let range = self.pane.window(task.output.len(), self.pane_rows);
            task.output[range]
                .iter()
                .map(|l| Line::from(l.as_str()))
                .collect()
        };
        let mut block = Block::default().borders(Borders::ALL).title(title);
        if !self.pane.following() {
            block = block.title_bottom(Line::from(Span::styled(" scrolled ", theme.subtle())));
        }
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}
