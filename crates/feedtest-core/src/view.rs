//! View models: pure mappings from fetched data to what a list displays.
//!
//! Nothing here knows about ratatui; the TUI widgets style these values, and
//! tests can assert on them directly.

use crate::types::{Level, Notification};
use chrono::{DateTime, Utc};

/// Display-ready form of a single [`Notification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationView {
    pub id: String,
    pub level: Level,
    pub source: String,
    /// `context.text` when present, otherwise `"<actor> <verb> <object>"`.
    pub message: String,
    pub link: Option<String>,
    pub created: DateTime<Utc>,
    pub seen: bool,
}

impl From<&Notification> for NotificationView {
    fn from(note: &Notification) -> Self {
        Self {
            id: note.id.clone(),
            level: note.level,
            source: note.source.clone(),
            message: message_text(note),
            link: note.context.link.clone().filter(|l| !l.is_empty()),
            created: note.created,
            seen: note.seen,
        }
    }
}

impl NotificationView {
    /// Glyph shown in the seen column.
    pub fn seen_indicator(&self) -> &'static str {
        if self.seen {
            SEEN_GLYPH
        } else {
            UNSEEN_GLYPH
        }
    }

    /// The action activating this item's seen control performs.
    pub fn seen_toggle(&self) -> SeenToggle {
        if self.seen {
            SeenToggle::MarkUnseen(self.id.clone())
        } else {
            SeenToggle::MarkSeen(self.id.clone())
        }
    }
}

pub const SEEN_GLYPH: &str = "○";
pub const UNSEEN_GLYPH: &str = "●";

/// Server call issued by a seen toggle. Never applied locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeenToggle {
    MarkSeen(String),
    MarkUnseen(String),
}

impl SeenToggle {
    pub fn id(&self) -> &str {
        match self {
            SeenToggle::MarkSeen(id) | SeenToggle::MarkUnseen(id) => id,
        }
    }
}

fn message_text(note: &Notification) -> String {
    match note.context.text.as_deref() {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => format!("{} {} {}", note.actor, note.verb, note.object),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
