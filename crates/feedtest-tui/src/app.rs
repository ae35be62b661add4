//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. All state lives in
//! [`AppState`] and is mutated only from that loop; network completions
//! arrive through [`FeedController::pump`] at the top of every tick.

use crate::{
    commands::{execute_command, Command},
    controller::FeedController,
    event::{AppEvent, Keymap},
    theme::Theme,
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        feed_panel::FeedPanel,
        header::Header,
        help::HelpPopup,
        poster::{Poster, PosterAction, PosterKind, PosterState},
    },
};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use feedtest_api::FeedsApi;
use feedtest_core::{config::Config, FeedScope, FilterState};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::{Modifier, Style},
    Frame, Terminal,
};
use std::{io, sync::Arc, time::Duration};
use tokio::runtime::Handle;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    UserFeed,
    GlobalFeed,
    /// A poster form is open.
    Poster,
    /// Vim-style `:` command line is active.
    Command,
}

impl Focus {
    fn scope(self) -> Option<FeedScope> {
        match self {
            Focus::UserFeed => Some(FeedScope::User),
            Focus::GlobalFeed => Some(FeedScope::Global),
            Focus::Poster | Focus::Command => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub controller: FeedController,
    pub focus: Focus,
    /// Focus before entering command mode or opening a poster, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub keymap: Keymap,
    /// Name the user list is titled after.
    pub display_name: String,
    pub show_help: bool,
    pub show_timestamps: bool,
    pub command_bar: CommandBarState,
    pub poster: Option<PosterState>,
    /// Id handed to the most recently opened poster form.
    next_poster_id: u64,
    pub quit: bool,
}

impl AppState {
    pub fn new(
        api: Arc<dyn FeedsApi>,
        handle: Handle,
        config: Config,
        theme: Theme,
        display_name: String,
    ) -> Self {
        Self {
            controller: FeedController::new(api, handle),
            focus: Focus::UserFeed,
            prev_focus: Focus::UserFeed,
            theme,
            keymap: Keymap::from_config(&config.keybindings),
            show_timestamps: config.ui.show_timestamps,
            config,
            display_name,
            show_help: false,
            command_bar: CommandBarState::default(),
            poster: None,
            next_poster_id: 0,
            quit: false,
        }
    }

    /// True when a text-input widget owns the keyboard, so letters must be
    /// typed rather than trigger shortcuts.
    pub fn is_insert_mode(&self) -> bool {
        matches!(self.focus, Focus::Poster | Focus::Command)
    }

    /// Apply finished network calls. Called once per loop iteration.
    pub fn tick(&mut self) {
        if self.controller.pump() > 0 {
            self.sync_poster();
        }
    }

    /// Wait until no call is in flight, applying completions as they land.
    pub async fn settle(&mut self) {
        self.controller.settle().await;
        self.sync_poster();
    }

    pub fn open_poster(&mut self, kind: PosterKind) {
        tracing::debug!(?kind, "poster opened");
        if self.focus != Focus::Poster {
            self.prev_focus = self.focus;
        }
        self.next_poster_id += 1;
        self.poster = Some(PosterState::with_id(self.next_poster_id, kind));
        self.focus = Focus::Poster;
    }

    pub fn close_poster(&mut self) {
        tracing::debug!("poster closed");
        self.poster = None;
        self.focus = self.prev_focus;
    }

    /// Close the form after a successful post, or show the failure in it.
    /// Outcomes for a form that was cancelled or replaced are dropped.
    fn sync_poster(&mut self) {
        for (form, outcome) in self.controller.take_post_outcomes() {
            if self.poster.as_ref().map(|p| p.id) != Some(form) {
                tracing::debug!(form, "post outcome for a closed form ignored");
                continue;
            }
            match outcome {
                Ok(_) => self.close_poster(),
                Err(msg) => {
                    if let Some(poster) = self.poster.as_mut() {
                        poster.fail(msg);
                    }
                }
            }
        }
    }

    /// Re-fetch with `filters`. Without a session there is nothing to fetch,
    /// so the feed stays hidden and only the filter state changes.
    pub(crate) fn refresh_feed(&mut self, filters: FilterState) {
        if self.controller.token().is_none() {
            tracing::debug!(?filters, "refresh skipped, not signed in");
            return;
        }
        self.controller.refresh(filters);
    }

    pub fn handle(&mut self, event: AppEvent) {
        // Help popup intercepts all events; only close keys pass through.
        if self.show_help {
            match event {
                AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit => {
                    tracing::debug!("help popup closed");
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.focus {
            Focus::Command => return self.handle_command(event),
            Focus::Poster => return self.handle_poster(event),
            Focus::UserFeed | Focus::GlobalFeed => {}
        }

        match event {
            AppEvent::Char('?') => {
                tracing::debug!("help popup opened");
                self.show_help = true;
            }
            AppEvent::Char(':') => {
                tracing::debug!(prev_focus = ?self.focus, "entering command mode");
                self.prev_focus = self.focus;
                self.command_bar.clear();
                self.focus = Focus::Command;
            }
            AppEvent::Quit => {
                tracing::debug!("quit");
                self.quit = true;
            }
            AppEvent::FocusNext | AppEvent::FocusPrev => {
                let next = match self.focus {
                    Focus::UserFeed => Focus::GlobalFeed,
                    _ => Focus::UserFeed,
                };
                tracing::debug!(from = ?self.focus, to = ?next, "focus cycle");
                self.focus = next;
            }
            AppEvent::Refresh => {
                let filters = self.controller.current_filters();
                self.refresh_feed(filters);
            }
            AppEvent::OpenPoster => self.open_poster(PosterKind::Targeted),
            AppEvent::OpenGlobalPoster => self.open_poster(PosterKind::Global),

            // Terminal resize is handled automatically by ratatui
            AppEvent::Resize(_, _) => {}

            other => self.dispatch_to_focused(other),
        }
    }

    fn handle_command(&mut self, event: AppEvent) {
        match event {
            AppEvent::Escape => {
                tracing::debug!("command bar cancelled");
                self.command_bar.clear();
                self.focus = self.prev_focus;
            }
            AppEvent::Quit => self.quit = true,
            AppEvent::Enter => match Command::parse(self.command_bar.text()) {
                Ok(cmd) => {
                    tracing::debug!(command = ?cmd, "executing command");
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                    execute_command(self, cmd);
                }
                Err(msg) if msg.is_empty() => {
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                }
                Err(msg) => {
                    // Show the error; bar stays open
                    self.command_bar.error = Some(msg);
                }
            },
            other => self.command_bar.handle(&other),
        }
    }

    fn handle_poster(&mut self, event: AppEvent) {
        if event == AppEvent::Quit {
            self.quit = true;
            return;
        }
        let Some(poster) = self.poster.as_mut() else {
            self.focus = self.prev_focus;
            return;
        };
        let form = poster.id;
        match poster.handle(&event) {
            Some(PosterAction::Submit(kind, note)) => self.controller.submit_post(form, kind, note),
            Some(PosterAction::Cancel) => self.close_poster(),
            None => {}
        }
    }

    /// Route an event to the feed list that owns the current focus.
    fn dispatch_to_focused(&mut self, event: AppEvent) {
        let Some(scope) = self.focus.scope() else { return };
        if !self.controller.visible() {
            return;
        }
        if let Some(action) = self.controller.list_mut(scope).handle(&event) {
            self.controller.dispatch(scope, action);
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
}

impl App {
    pub fn new(state: AppState) -> Self {
        App { state }
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.state.tick();
            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                let raw = ct_event::read()?;
                if let Event::Key(key) = &raw {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                }
                let app_event = if self.state.is_insert_mode() {
                    self.state.keymap.to_app_event_insert(raw)
                } else {
                    self.state.keymap.to_app_event(raw)
                };
                if let Some(ev) = app_event {
                    tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                    self.state.handle(ev);
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: 1-line header | feeds | 1-line status
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    frame.render_widget(Header::new(state.controller.display_name(), &state.theme), vert[0]);

    let list_focus = match state.focus {
        Focus::Poster | Focus::Command => state.prev_focus.scope(),
        f => f.scope(),
    };
    let timestamps = state.show_timestamps.then_some(state.config.ui.timestamp_format.as_str());
    frame.render_widget(
        FeedPanel::new(&state.controller, list_focus, &state.theme)
            .global_pct(state.config.ui.global_pane_height_pct)
            .timestamps(timestamps),
        vert[1],
    );

    frame.buffer_mut().set_string(
        vert[2].x,
        vert[2].y,
        status_line(state),
        Style::default().add_modifier(Modifier::DIM),
    );

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }

    if let Some(ref poster) = state.poster {
        let widget = Poster::new(poster, &state.theme);
        let cursor = widget.cursor_position(area);
        frame.render_widget(widget, area);
        if let Some(pos) = cursor {
            frame.set_cursor_position(pos);
        }
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
    }
}

fn status_line(state: &AppState) -> String {
    let busy = match state.controller.in_flight() {
        0 => String::new(),
        n => format!("  ⟳ {n} in flight"),
    };
    format!(" {}{}", state.config.service.base_url, busy)
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
