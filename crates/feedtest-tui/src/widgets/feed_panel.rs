//! Feed panel: the body of the screen.
//!
//! Renders one of three things, in order of precedence:
//!
//! 1. a placeholder when no feed is shown (no token yet, or after `logout`);
//! 2. the error banner when the last fetch or update failed;
//! 3. the global list stacked above the user list.

use crate::controller::FeedController;
use crate::theme::Theme;
use crate::widgets::feed_list::FeedList;
use feedtest_core::FeedScope;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

const HIDDEN_HINT: &str = "Set a token with :token <token> to load your feed.";

pub struct FeedPanel<'a> {
    controller: &'a FeedController,
    focus: Option<FeedScope>,
    theme: &'a Theme,
    global_pct: u16,
    timestamp_format: Option<&'a str>,
}

impl<'a> FeedPanel<'a> {
    pub fn new(controller: &'a FeedController, focus: Option<FeedScope>, theme: &'a Theme) -> Self {
        Self { controller, focus, theme, global_pct: 35, timestamp_format: None }
    }

    /// Height of the global pane as a percentage of the panel.
    pub fn global_pct(mut self, pct: u16) -> Self {
        self.global_pct = pct.min(100);
        self
    }

    pub fn timestamps(mut self, format: Option<&'a str>) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Widget for FeedPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.controller.visible() {
            let block = Block::bordered().border_style(self.theme.border_unfocused);
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Line::from(Span::styled(
                HIDDEN_HINT,
                Style::default().add_modifier(Modifier::DIM),
            )))
            .render(inner, buf);
            return;
        }

        if let Some(banner) = self.controller.banner() {
            let block = Block::bordered().border_style(self.theme.banner);
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Line::from(Span::styled(banner.to_string(), self.theme.banner)))
                .wrap(Wrap { trim: true })
                .render(inner, buf);
            return;
        }

        let rows = Layout::default()
            .direction(LayoutDir::Vertical)
            .constraints([Constraint::Percentage(self.global_pct), Constraint::Fill(1)])
            .split(area);

        FeedList::new(
            self.controller.global(),
            self.focus == Some(FeedScope::Global),
            self.theme,
        )
        .timestamps(self.timestamp_format)
        .render(rows[0], buf);

        FeedList::new(self.controller.user(), self.focus == Some(FeedScope::User), self.theme)
            .timestamps(self.timestamp_format)
            .render(rows[1], buf);
    }
}
