//! Notification item: one line per notification in a feed list.
//!
//! ```text
//! ● ERROR   groups      1970-01-15 06:56  alice joined group1  ↗ https://…
//! ```
//!
//! The leading glyph is the seen indicator and is omitted for lists created
//! without a seen control.

use crate::theme::Theme;
use feedtest_core::NotificationView;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

pub struct NotificationItem<'a> {
    view: &'a NotificationView,
    theme: &'a Theme,
    show_seen: bool,
    /// strftime format for the created timestamp; `None` hides it.
    timestamp_format: Option<&'a str>,
}

impl<'a> NotificationItem<'a> {
    pub fn new(view: &'a NotificationView, theme: &'a Theme) -> Self {
        Self { view, theme, show_seen: true, timestamp_format: None }
    }

    pub fn show_seen(mut self, show: bool) -> Self {
        self.show_seen = show;
        self
    }

    pub fn timestamps(mut self, format: Option<&'a str>) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn line(&self) -> Line<'static> {
        let view = self.view;
        let mut spans: Vec<Span<'static>> = Vec::new();

        if self.show_seen {
            let style = if view.seen { self.theme.seen } else { self.theme.unseen };
            spans.push(Span::styled(format!("{} ", view.seen_indicator()), style));
        }

        spans.push(Span::styled(
            format!("{:<8}", view.level.as_str().to_ascii_uppercase()),
            self.theme.level_style(view.level),
        ));

        spans.push(Span::styled(
            format!("{:<10} ", view.source),
            self.theme.source_style(&view.source),
        ));

        if let Some(fmt) = self.timestamp_format {
            spans.push(Span::styled(
                format!("{}  ", view.created.format(fmt)),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }

        let message_style = if view.seen {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        spans.push(Span::styled(view.message.clone(), message_style));

        if let Some(ref link) = view.link {
            spans.push(Span::raw("  ↗ "));
            spans.push(Span::styled(link.clone(), self.theme.link));
        }

        Line::from(spans)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
