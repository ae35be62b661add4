//! feedtest TUI: ratatui application shell.

pub mod app;
pub mod commands;
pub mod controller;
pub mod event;
pub mod theme;
pub mod widgets;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, AppState};
pub use controller::FeedController;

use feedtest_api::FeedsApi;
use feedtest_core::config::Config;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Who the TUI starts as. Without a token the feed stays hidden until one is
/// set with `:token`.
#[derive(Debug, Clone)]
pub struct Session {
    pub display_name: String,
    pub token: Option<String>,
}

/// Start the TUI against `api`. Blocks until the user quits; network calls
/// run on `handle`, which must stay alive for the whole session.
pub fn run(config: Config, api: Arc<dyn FeedsApi>, handle: Handle, session: Session) -> anyhow::Result<()> {
    let theme = theme::Theme::load_default();
    let mut state = AppState::new(api, handle, config, theme, session.display_name);
    if let Some(token) = session.token.as_deref().filter(|t| !t.is_empty()) {
        let name = state.display_name.clone();
        state.controller.initialize(&name, token);
    }
    App::new(state).run()
}
