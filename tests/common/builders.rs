//! Test builders: ergonomic constructors for notifications.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{DateTime, Utc};
use feedtest_core::{Context, Level, Notification};

// ---------------------------------------------------------------------------
// NotificationBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Notification`] fixtures.
///
/// Defaults to `alice joined group1`, level `alert`, source `groups`, unseen.
///
/// # Example
///
/// ```rust
/// let note = NotificationBuilder::new("n1")
///     .level(Level::Error)
///     .created_ms(1_234_567_890)
///     .build();
/// ```
pub struct NotificationBuilder {
    note: Notification,
}

impl NotificationBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            note: Notification {
                id: id.into(),
                actor: "alice".to_string(),
                verb: "joined".to_string(),
                object: "group1".to_string(),
                level: Level::Alert,
                source: "groups".to_string(),
                created: Utc::now(),
                expires: None,
                seen: false,
                context: Context::default(),
            },
        }
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.note.actor = actor.into();
        self
    }

    pub fn verb(mut self, verb: impl Into<String>) -> Self {
        self.note.verb = verb.into();
        self
    }

    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.note.object = object.into();
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.note.level = level;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.note.source = source.into();
        self
    }

    pub fn seen(mut self, seen: bool) -> Self {
        self.note.seen = seen;
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.note.context.text = Some(text.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.note.context.link = Some(link.into());
        self
    }

    pub fn created_ms(mut self, ms: i64) -> Self {
        self.note.created = DateTime::from_timestamp_millis(ms).expect("valid epoch millis");
        self
    }

    pub fn build(self) -> Notification {
        self.note
    }
}

/// `count` unseen notifications `"<prefix>-0"`, `"<prefix>-1"`, …, each one
/// minute newer than the last.
pub fn notifications(prefix: &str, count: usize) -> Vec<Notification> {
    (0..count)
        .map(|i| {
            NotificationBuilder::new(format!("{prefix}-{i}"))
                .created_ms(1_600_000_000_000 + i as i64 * 60_000)
                .build()
        })
        .collect()
}
