//! Feed filter state and its query-string encoding.
//!
//! A [`FilterState`] is owned by a feed list view and rebuilt from a
//! [`FilterPatch`] on every control interaction. The full state is then passed
//! by value to the refresh callback, which encodes it with
//! [`FilterState::to_query`].
//!
//! # Query parameters
//!
//! | Field          | Parameter   |
//! |----------------|-------------|
//! | `reverse_sort` | `rev=1`     |
//! | `verb`         | `v=<verb>`  |
//! | `level`        | `l=<level>` |
//! | `include_seen` | `seen=1`    |
//!
//! Parameters appear in that order and only for truthy / non-empty fields.
//! `source` has no query parameter; lists apply it locally via
//! [`FilterState::admits`].

use crate::types::{Level, Notification};

/// Sources offered by the source filter control.
pub const KNOWN_SOURCES: [&str; 4] = ["groups", "workspace", "jobs", "narrative"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub include_seen: bool,
    pub reverse_sort: bool,
    pub verb: Option<String>,
    pub level: Option<Level>,
    pub source: Option<String>,
}

/// A partial update to a [`FilterState`]. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub include_seen: Option<bool>,
    pub reverse_sort: Option<bool>,
    pub verb: Option<Option<String>>,
    pub level: Option<Option<Level>>,
    pub source: Option<Option<String>>,
}

impl FilterPatch {
    pub fn include_seen(value: bool) -> Self {
        Self { include_seen: Some(value), ..Self::default() }
    }

    pub fn reverse_sort(value: bool) -> Self {
        Self { reverse_sort: Some(value), ..Self::default() }
    }

    pub fn verb(value: Option<String>) -> Self {
        Self { verb: Some(value), ..Self::default() }
    }

    pub fn level(value: Option<Level>) -> Self {
        Self { level: Some(value), ..Self::default() }
    }

    pub fn source(value: Option<String>) -> Self {
        Self { source: Some(value), ..Self::default() }
    }
}

impl FilterState {
    /// Merge a patch into this state. Empty strings clear `verb` / `source`.
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(v) = patch.include_seen {
            self.include_seen = v;
        }
        if let Some(v) = patch.reverse_sort {
            self.reverse_sort = v;
        }
        if let Some(v) = patch.verb {
            self.verb = non_empty(v);
        }
        if let Some(v) = patch.level {
            self.level = v;
        }
        if let Some(v) = patch.source {
            self.source = non_empty(v);
        }
    }

    /// Encode as the list endpoint's query string, without the leading `?`.
    pub fn to_query(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if self.reverse_sort {
            params.push("rev=1".to_string());
        }
        if let Some(verb) = self.verb.as_deref().filter(|v| !v.is_empty()) {
            params.push(format!("v={}", urlencoding::encode(verb)));
        }
        if let Some(level) = self.level {
            params.push(format!("l={level}"));
        }
        if self.include_seen {
            params.push("seen=1".to_string());
        }
        params.join("&")
    }

    /// Whether a fetched notification passes the local source filter.
    pub fn admits(&self, note: &Notification) -> bool {
        match self.source.as_deref() {
            Some(source) => note.source == source,
            None => true,
        }
    }

    /// One-line summary for list headers, e.g. `seen rev level:error`.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.include_seen {
            parts.push("seen".to_string());
        }
        if self.reverse_sort {
            parts.push("rev".to_string());
        }
        if let Some(ref verb) = self.verb {
            parts.push(format!("verb:{verb}"));
        }
        if let Some(level) = self.level {
            parts.push(format!("level:{level}"));
        }
        if let Some(ref source) = self.source {
            parts.push(format!("source:{source}"));
        }
        parts.join(" ")
    }
}

/// Level control step: none → alert → warning → error → request → none.
pub fn next_level(current: Option<Level>) -> Option<Level> {
    match current {
        None => Some(Level::ALL[0]),
        Some(level) => {
            let idx = Level::ALL.iter().position(|l| *l == level).unwrap_or(0);
            Level::ALL.get(idx + 1).copied()
        }
    }
}

/// Source control step over [`KNOWN_SOURCES`], wrapping back to none.
/// An unknown current source resets to none.
pub fn next_source(current: Option<&str>) -> Option<String> {
    let next = match current {
        None => KNOWN_SOURCES.first(),
        Some(source) => KNOWN_SOURCES
            .iter()
            .position(|s| *s == source)
            .and_then(|idx| KNOWN_SOURCES.get(idx + 1)),
    };
    next.map(|s| s.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
