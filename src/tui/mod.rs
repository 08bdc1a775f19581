//! Terminal UI: a menu, the task picker, the run views and settings.

mod help;
mod menu;
mod pane;
mod picker;
mod runner_view;
mod settings;
mod theme;

use crate::catalog::TaskCatalog;
use crate::engine::{Launcher, ProcessLauncher};
use crate::model::ActivityMessage;
use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use menu::{MenuChoice, MenuState};
use picker::{PickerAction, PickerState};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use runner_view::RunnerView;
use settings::{SettingsAction, SettingsState};
use std::{io, time::Duration};
use theme::Theme;
use tracing::{debug, info, warn};

type LauncherFactory = Box<dyn Fn() -> Box<dyn Launcher>>;

enum Screen {
    Menu(MenuState),
    Picker(PickerState),
    Runner(RunnerView),
    Settings(SettingsState),
    Help,
}

impl Screen {
    fn title(&self) -> &'static str {
        match self {
            Screen::Menu(_) => "Menu",
            Screen::Picker(_) => "Run updates",
            Screen::Runner(_) => "Running",
            Screen::Settings(_) => "Settings",
            Screen::Help => "Help",
        }
    }
}

struct App {
    screen: Screen,
    catalog: TaskCatalog,
    theme: Theme,
    launcher: LauncherFactory,
    area: Rect,
    quit: bool,
}

fn content_area(area: Rect) -> Rect {
    split(area)[1]
}

fn split(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area)
}

impl App {
    fn new(catalog: TaskCatalog, launcher: LauncherFactory, area: Rect) -> Self {
        Self {
            screen: Screen::Menu(MenuState::default()),
            catalog,
            theme: Theme::default(),
            launcher,
            area,
            quit: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            info!("quit requested");
            self.quit = true;
            return;
        }

        let next = match &mut self.screen {
            Screen::Menu(menu) => match menu.handle_key(key) {
                Some(MenuChoice::Run) => {
                    Some(Screen::Picker(PickerState::new(self.catalog.tasks())))
                }
                Some(MenuChoice::Settings) => {
                    Some(Screen::Settings(SettingsState::new(&self.catalog)))
                }
                Some(MenuChoice::Help) => Some(Screen::Help),
                Some(MenuChoice::Quit) => {
                    self.quit = true;
                    None
                }
                None => None,
            },
            Screen::Picker(picker) => match picker.handle_key(key) {
                PickerAction::Run(tasks) => {
                    info!(count = tasks.len(), "starting run");
                    let launcher = (self.launcher)();
                    Some(Screen::Runner(RunnerView::start(
                        tasks,
                        launcher,
                        content_area(self.area),
                    )))
                }
                PickerAction::Back => Some(Screen::Menu(MenuState::default())),
                PickerAction::None => None,
            },
            Screen::Runner(view) => {
                view.handle_key(key);
                view.exit().then(|| Screen::Menu(MenuState::default()))
            }
            Screen::Settings(settings) => match settings.handle_key(key, &mut self.catalog) {
                SettingsAction::Back => Some(Screen::Menu(MenuState::default())),
                SettingsAction::None => None,
            },
            Screen::Help => Some(Screen::Menu(MenuState::default())),
        };
        if let Some(screen) = next {
            debug!(from = self.screen.title(), to = screen.title(), "screen change");
            self.screen = screen;
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        if let Screen::Runner(view) = &mut self.screen {
            view.resize(content_area(self.area));
        }
    }

    fn on_tick(&mut self) {
        if let Screen::Runner(view) = &mut self.screen {
            view.on_tick();
        }
    }

    /// Next message from the active run. Pending unless a run is waiting for
    /// activity.
    async fn next_activity(&mut self) -> ActivityMessage {
        match &mut self.screen {
            Screen::Runner(view) if view.is_armed() => view.session_mut().next_event().await,
            _ => futures::future::pending().await,
        }
    }

    fn on_activity(&mut self, msg: ActivityMessage) {
        match &mut self.screen {
            Screen::Runner(view) => view.on_activity(msg),
            _ => debug!("activity without an active run dropped"),
        }
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = split(f.area());
        let header = Paragraph::new(Line::from(self.screen.title()))
            .style(Style::default().fg(self.theme.secondary))
            .block(Block::default().borders(Borders::ALL).title("task-updater"));
        f.render_widget(header, chunks[0]);

        match &self.screen {
            Screen::Menu(menu) => menu.draw(f, chunks[1], &self.theme),
            Screen::Picker(picker) => picker.draw(f, chunks[1], &self.theme),
            Screen::Runner(view) => view.draw(f, chunks[1], &self.theme),
            Screen::Settings(settings) => settings.draw(f, chunks[1], &self.theme),
            Screen::Help => help::draw_help(chunks[1], f, &self.theme),
        }
    }
}

pub async fn run(catalog: TaskCatalog) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let area = terminal
        .size()
        .map(|size| Rect::new(0, 0, size.width, size.height))
        .unwrap_or_default();
    let launcher: LauncherFactory = Box::new(|| Box::new(ProcessLauncher));
    let mut app = App::new(catalog, launcher, area);

    let res = event_loop(&mut terminal, &mut app).await;

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(100));

    while !app.quit {
        terminal.draw(|f| app.draw(f)).context("draw frame")?;

        tokio::select! {
            ev = events.next() => match ev {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(Event::Resize(w, h))) => app.resize(w, h),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "terminal event error");
                }
                None => {
                    warn!("terminal event stream closed");
                    break;
                }
            },
            msg = app.next_activity() => app.on_activity(msg),
            _ = tick.tick() => app.on_tick(),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::ScriptedLauncher;
    use crate::model::Outcome;
    use crate::storage::ConfigStore;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 30,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(dir: &TempDir) -> App {
        let mut catalog =
            TaskCatalog::load(ConfigStore::new(dir.path().join("config.json")), false).unwrap();
        catalog
            .add_custom("Echo", "echo", vec!["hi".into()])
            .unwrap();
        let launcher: LauncherFactory = Box::new(|| {
            Box::new(ScriptedLauncher::default().script("echo", &["hi"], Outcome::Success))
        });
        App::new(catalog, launcher, AREA)
    }

    #[tokio::test]
    async fn run_from_menu_and_return() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.screen, Screen::Picker(_)));
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.screen, Screen::Runner(_)));

        // Not acknowledged while running.
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.screen, Screen::Runner(_)));

        for _ in 0..2 {
            let msg = app.next_activity().await;
            app.on_activity(msg);
        }
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.screen, Screen::Menu(_)));
    }

    #[test]
    fn ctrl_c_quits_from_any_screen() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.screen, Screen::Settings(_)));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.quit);
    }

    #[test]
    fn help_returns_to_menu_on_any_key() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.handle_key(key(KeyCode::Char('?')));
        assert!(matches!(app.screen, Screen::Help));
        app.handle_key(key(KeyCode::Char('x')));
        assert!(matches!(app.screen, Screen::Menu(_)));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn every_screen_renders() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let mut terminal = Terminal::new(TestBackend::new(AREA.width, AREA.height)).unwrap();
        for step in [KeyCode::Char('?'), KeyCode::Esc, KeyCode::Down, KeyCode::Enter] {
            terminal.draw(|f| app.draw(f)).unwrap();
            app.handle_key(key(step));
        }
        terminal.draw(|f| app.draw(f)).unwrap();
        let buf = terminal.backend().buffer();
        let text: String = (0..buf.area.width).map(|x| buf[(x, 1)].symbol()).collect();
        assert!(text.contains("Settings"));
    }
}
