//! Feed list: one bordered pane listing the notifications of a single scope.
//!
//! # Lifecycle
//!
//! ```text
//! Hidden ──► Loading ──► Rendered ──► Loading ──► Error
//!                ▲                        │
//!                └────────────────────────┘  (filter change / refresh)
//! ```
//!
//! Every [`FeedListState::render`] discards the previous items and rebuilds
//! them from the fetched notifications, in fetch order.
//!
//! # Controls (lists built with [`FeedListState::with_controls`])
//!
//! | Event | Action |
//! |-------|--------|
//! | `IncludeSeen` | flip `include_seen` |
//! | `ReverseSort` | flip `reverse_sort` |
//! | `CycleLevel` | none → alert → warning → error → request → none |
//! | `CycleSource` | none → groups → workspace → jobs → narrative → none |
//!
//! Each control emits exactly one [`FeedAction::Refresh`] with the full
//! filter state. `ToggleSeen` / `Enter` on a selected item emits
//! [`FeedAction::ToggleSeen`]; the list never flips `seen` itself.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use crate::widgets::notification_item::NotificationItem;
use feedtest_core::{
    filter::{next_level, next_source},
    FeedScope, FilterPatch, FilterState, Notification, NotificationView, SeenToggle,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Hidden,
    Loading,
    Rendered,
    Error,
}

/// What a list asks its owner to do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    /// Re-fetch with this full filter state.
    Refresh(FilterState),
    /// Call mark seen / unseen on the server, then refresh.
    ToggleSeen(SeenToggle),
}

#[derive(Debug, Clone)]
pub struct FeedListState {
    pub scope: FeedScope,
    /// Display name shown before "notifications" in the pane title.
    pub title: String,
    pub phase: FeedPhase,
    pub items: Vec<NotificationView>,
    pub filters: FilterState,
    pub show_controls: bool,
    pub show_seen: bool,
    /// Index into `items` of the highlighted row.
    pub cursor: usize,
}

impl FeedListState {
    pub fn new(scope: FeedScope, title: impl Into<String>) -> Self {
        Self {
            scope,
            title: title.into(),
            phase: FeedPhase::Hidden,
            items: Vec::new(),
            filters: FilterState::default(),
            show_controls: false,
            show_seen: true,
            cursor: 0,
        }
    }

    pub fn with_controls(mut self) -> Self {
        self.show_controls = true;
        self
    }

    pub fn without_seen(mut self) -> Self {
        self.show_seen = false;
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Merge `patch` into the filter state and return the refresh request
    /// carrying the full state.
    pub fn set_filters(&mut self, patch: FilterPatch) -> FeedAction {
        self.filters.apply(patch);
        tracing::debug!(scope = %self.scope, filters = ?self.filters, "feed: filters changed");
        FeedAction::Refresh(self.filters.clone())
    }

    /// Replace the items with freshly fetched notifications, in fetch order.
    /// Notifications rejected by the local source filter are skipped.
    pub fn render(&mut self, notes: &[Notification]) {
        self.items = notes
            .iter()
            .filter(|n| self.filters.admits(n))
            .map(NotificationView::from)
            .collect();
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
        self.phase = FeedPhase::Rendered;
        tracing::debug!(scope = %self.scope, items = self.items.len(), "feed: rendered");
    }

    /// Drop all items, keeping the current phase.
    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = 0;
    }

    pub fn hide(&mut self) {
        self.clear();
        self.phase = FeedPhase::Hidden;
    }

    pub fn set_loading(&mut self) {
        self.phase = FeedPhase::Loading;
    }

    pub fn set_error(&mut self) {
        self.clear();
        self.phase = FeedPhase::Error;
    }

    pub fn selected(&self) -> Option<&NotificationView> {
        self.items.get(self.cursor)
    }

    /// Handle an [`AppEvent`] routed to this list.
    pub fn handle(&mut self, event: &AppEvent) -> Option<FeedAction> {
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            AppEvent::Nav(Direction::Down) => {
                if self.cursor + 1 < self.items.len() {
                    self.cursor += 1;
                }
                None
            }
            AppEvent::ToggleSeen | AppEvent::Enter if self.show_seen => {
                let toggle = self.selected()?.seen_toggle();
                tracing::debug!(scope = %self.scope, ?toggle, "feed: seen toggle");
                Some(FeedAction::ToggleSeen(toggle))
            }
            AppEvent::IncludeSeen if self.show_controls => {
                let value = !self.filters.include_seen;
                Some(self.set_filters(FilterPatch::include_seen(value)))
            }
            AppEvent::ReverseSort if self.show_controls => {
                let value = !self.filters.reverse_sort;
                Some(self.set_filters(FilterPatch::reverse_sort(value)))
            }
            AppEvent::CycleLevel if self.show_controls => {
                let next = next_level(self.filters.level);
                Some(self.set_filters(FilterPatch::level(next)))
            }
            AppEvent::CycleSource if self.show_controls => {
                let next = next_source(self.filters.source.as_deref());
                Some(self.set_filters(FilterPatch::source(next)))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct FeedList<'a> {
    state: &'a FeedListState,
    focused: bool,
    theme: &'a Theme,
    timestamp_format: Option<&'a str>,
}

impl<'a> FeedList<'a> {
    pub fn new(state: &'a FeedListState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme, timestamp_format: None }
    }

    pub fn timestamps(mut self, format: Option<&'a str>) -> Self {
        self.timestamp_format = format;
        self
    }

    fn title(&self) -> Line<'static> {
        let mut spans = vec![Span::styled(
            format!(" {} notifications ", self.state.title),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.state.show_controls {
            let summary = self.state.filters.summary();
            let summary = if summary.is_empty() { "no filters".to_string() } else { summary };
            spans.push(Span::styled(
                format!("[{summary}] "),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for FeedList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(self.title())
            .border_style(self.theme.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let placeholder = match self.state.phase {
            FeedPhase::Hidden | FeedPhase::Error => Some(""),
            FeedPhase::Loading if self.state.items.is_empty() => Some("loading…"),
            FeedPhase::Rendered if self.state.items.is_empty() => Some("no notifications"),
            _ => None,
        };
        if let Some(text) = placeholder {
            Paragraph::new(Line::from(Span::styled(
                text,
                Style::default().add_modifier(Modifier::DIM),
            )))
            .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .items
            .iter()
            .map(|view| {
                ListItem::new(
                    NotificationItem::new(view, self.theme)
                        .show_seen(self.state.show_seen)
                        .timestamps(self.timestamp_format)
                        .line(),
                )
            })
            .collect();

        let list = List::new(items).highlight_style(if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        });
        let mut list_state = ListState::default().with_selected(Some(self.state.cursor));
        StatefulWidget::render(list, inner, buf, &mut list_state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
