//! Shared test utilities for feedtest integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

pub mod assertions;
pub mod builders;
pub mod fake_feeds_service;

pub use builders::*;
pub use fake_feeds_service::*;

use ratatui::{backend::TestBackend, Terminal};

/// Render the whole TUI into an off-screen buffer and return its text, one
/// line per terminal row.
pub fn render_screen(state: &feedtest_tui::AppState, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| feedtest_tui::app::draw(f, state)).unwrap();
    let buf = terminal.backend().buffer();
    buf.content
        .chunks(buf.area.width as usize)
        .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
