//! Demo host: wires the drawer, the providers and the terminal together.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use super::components::{DetailsPanel, DrawerView, ErrorDialog, PickerDialog, StatusBar};
use super::layout::LayoutManager;
use crate::backend::{Backend, ConnectionParams, FileSource, MemoryBackend, TaskRunner};
use crate::config::Config;
use crate::constants::KEY_SEQUENCE_TIMEOUT_MS;
use crate::drawer::{Drawer, KeyMode};
use crate::error::DrawerError;
use crate::logger::Logger;
use crate::providers::{ConnectionsProvider, MemoryNotes, NotesProvider};

const DEMO_LATENCY_MS: u64 = 300;
const POLL_INTERVAL_MS: u64 = 100;

/// Host application state
pub struct App {
    pub drawer: Drawer,
    pub view: Rc<RefCell<DrawerView>>,
    pub picker: Rc<RefCell<PickerDialog>>,
    pub connections: ConnectionsProvider,
    pub backend: Arc<dyn Backend>,
    pub source: Option<FileSource>,
    pub runner: TaskRunner,
    pub logger: Logger,
    pub status: Rc<RefCell<String>>,
    pub error_message: Option<String>,
    pub should_quit: bool,
    pub width: u16,
    last_key_at: Option<Instant>,
    active: Option<String>,
}

impl App {
    /// Build the app. Must run inside a tokio runtime.
    pub fn new(config: &Config, logger: Logger) -> Result<Self> {
        let source = config.sources.connections_file.clone().map(FileSource::new);
        let backend: Arc<dyn Backend> = match &source {
            Some(source) => Arc::new(MemoryBackend::from_connections(source.load()?)),
            None => Arc::new(
                MemoryBackend::from_connections(demo_connections())
                    .with_latency(Duration::from_millis(DEMO_LATENCY_MS)),
            ),
        };

        let view = Rc::new(RefCell::new(DrawerView::new()));
        let picker = Rc::new(RefCell::new(PickerDialog::new()));
        let status = Rc::new(RefCell::new(String::new()));

        let builder = Drawer::builder();
        let runner = TaskRunner::current(builder.continuation())?;
        let connections = ConnectionsProvider::new(backend.clone(), runner.clone());

        let notes = {
            let status = status.clone();
            let connections = connections.clone();
            NotesProvider::new(
                Rc::new(MemoryNotes::new()),
                move |namespace, note| {
                    *status.borrow_mut() = format!("opened note {} ({})", note.name, namespace);
                    Ok(())
                },
                move || connections.active_connection(),
            )
        };

        let drawer = builder
            .provider(connections.clone())
            .provider(notes)
            .surface(view.clone())
            .prompt(picker.clone())
            .keymap(config.key_map()?)
            .theme(config.theme())
            .help_enabled(config.drawer.help_enabled)
            .build()?;

        Ok(Self {
            drawer,
            view,
            picker,
            connections,
            backend,
            source,
            runner,
            logger,
            status,
            error_message: None,
            should_quit: false,
            width: config.drawer.width,
            last_key_at: None,
            active: None,
        })
    }

    /// Route one key press.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        if self.error_message.is_some() {
            if key.code == KeyCode::Esc {
                self.error_message = None;
            }
            return;
        }

        if self.picker.borrow().is_open() {
            // The picker's callback may queue drawer events
            self.picker.borrow_mut().handle_key(key);
            self.report(|drawer| drawer.process_events());
            return;
        }

        if !self.drawer.has_pending_keys() {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.drawer.move_down();
                    return;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.drawer.move_up();
                    return;
                }
                KeyCode::Char('i') => {
                    self.drawer.theme_mut().cycle_icon_theme();
                    self.drawer.redraw();
                    return;
                }
                KeyCode::Tab => {
                    self.toggle_drawer();
                    return;
                }
                _ => {}
            }
        }

        self.last_key_at = Some(Instant::now());
        self.report(|drawer| drawer.handle_key(KeyMode::Normal, key));
    }

    /// Open the drawer when closed, close it when open.
    pub fn toggle_drawer(&mut self) {
        if self.drawer.is_open() {
            self.drawer.close();
        } else {
            self.report(Drawer::open);
        }
    }

    /// Periodic housekeeping between key presses.
    pub fn tick(&mut self) {
        let timed_out = self
            .last_key_at
            .is_some_and(|at| at.elapsed() >= Duration::from_millis(KEY_SEQUENCE_TIMEOUT_MS));
        if timed_out {
            self.last_key_at = None;
            self.report(Drawer::expire_pending_keys);
        }

        self.report(Drawer::process_events);

        let failures = self.drawer.take_failures();
        if !failures.is_empty() {
            let message = failures
                .iter()
                .map(|failure| format!("{}: {}", failure.node_id, failure.message))
                .collect::<Vec<_>>()
                .join("\n");
            self.error_message = Some(message);
        }

        let active = self.connections.active_connection();
        if active != self.active {
            self.drawer.set_active(active.clone());
            self.active = active;
        }
    }

    /// Persist connections back to the configured file, if any.
    pub async fn save_connections(&self) -> Result<()> {
        let Some(source) = &self.source else {
            return Ok(());
        };
        let connections = self.backend.list_connections().await?;
        source.save(&connections)
    }

    fn status_text(&self) -> String {
        let running = self.runner.active_count();
        if running > 0 {
            return format!("{} background task(s) running...", running);
        }
        self.status.borrow().clone()
    }

    fn report<T>(&mut self, operation: impl FnOnce(&mut Drawer) -> Result<T, DrawerError>) {
        if let Err(err) = operation(&mut self.drawer) {
            let message = format!("{:#}", anyhow::Error::from(err));
            log::error!("{}", message);
            self.error_message = Some(message);
        }
    }
}

fn demo_connections() -> Vec<ConnectionParams> {
    [("pg-local", "postgres"), ("shop", "mysql"), ("scratch", "sqlite")]
        .into_iter()
        .map(|(name, kind)| ConnectionParams {
            id: format!("conn-{}", name),
            name: name.to_string(),
            kind: kind.to_string(),
            url: format!("{}://localhost/{}", kind, name),
        })
        .collect()
}

/// Run the terminal UI until the user quits.
pub async fn run_app(config: Config, logger: Logger) -> Result<()> {
    let mut app = App::new(&config, logger)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_ui(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    app.runner.abort_all();
    app.save_connections().await.context("Failed to save connections")?;
    res
}

fn run_ui<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    app.toggle_drawer();

    loop {
        app.tick();
        terminal.draw(|f| render(f, app))?;

        if event::poll(Duration::from_millis(POLL_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(&key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Draw the whole screen.
pub fn render(f: &mut Frame, app: &App) {
    let (content, status_area) = LayoutManager::main_layout(f.area());
    let drawer_open = app.drawer.is_open();
    let (drawer_area, details_area) = LayoutManager::drawer_layout(content, app.width, drawer_open);

    if drawer_open {
        app.view.borrow().render(f, drawer_area, !app.picker.borrow().is_open());
    }
    DetailsPanel::render(f, details_area, app.drawer.current_node(), &app.logger.get_logs());
    StatusBar::render(f, status_area, &app.status_text(), app.error_message.is_some());

    app.picker.borrow().render(f);
    if let Some(message) = &app.error_message {
        ErrorDialog::render(f, message);
    }
}
