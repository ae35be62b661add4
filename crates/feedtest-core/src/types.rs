//! Core types for feedtest-core.
//!
//! These mirror the JSON documents exchanged with the feeds service: the
//! [`Notification`] records returned by the list endpoint, their [`Level`],
//! the [`FeedResponse`] envelope, and the [`NewNotification`] body used when
//! posting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single notification as returned by `GET api/V1/notifications`.
///
/// Records are immutable once fetched. `seen` only changes on the server, via
/// the mark seen/unseen endpoints; the UI re-fetches to observe the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub actor: String,
    pub verb: String,
    pub object: String,
    pub level: Level,
    /// Name of the service that produced the notification (`groups`, `jobs`, …).
    pub source: String,
    /// Creation time, epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seen: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: Context,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Free-form context attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Context {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.link.is_none()
    }
}

/// Notification severity, as registered by the feeds service.
///
/// Serializes as the lowercase name. Deserializes from either the name or
/// the numeric id, since the service accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Alert,
    Warning,
    Error,
    Request,
}

impl Level {
    /// Every level, in service id order.
    pub const ALL: [Level; 4] = [Level::Alert, Level::Warning, Level::Error, Level::Request];

    /// Numeric id used by the service's level registry.
    pub fn id(self) -> u8 {
        match self {
            Level::Alert => 1,
            Level::Warning => 2,
            Level::Error => 3,
            Level::Request => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Alert => "alert",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Request => "request",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither a level name nor a level id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("level \"{0}\" not found")]
pub struct UnknownLevel(pub String);

impl std::str::FromStr for Level {
    type Err = UnknownLevel;

    /// Accepts a level name (case-insensitive) or its numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Level::ALL
            .into_iter()
            .find(|l| l.as_str() == key || l.id().to_string() == key)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Id(u8),
        }
        let key = match Repr::deserialize(deserializer)? {
            Repr::Name(name) => name,
            Repr::Id(id) => id.to_string(),
        };
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Body of `GET api/V1/notifications`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub global: Vec<Notification>,
    #[serde(default)]
    pub user: Vec<Notification>,
}

/// Which of the two feeds a notification list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedScope {
    Global,
    User,
}

impl std::fmt::Display for FeedScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedScope::Global => write!(f, "global"),
            FeedScope::User => write!(f, "user"),
        }
    }
}

/// Body of `POST api/V1/notification` and `POST api/V1/notification/global`.
///
/// Global posts only use `verb`, `object`, `level` and `context`; the service
/// fills in actor and source itself. Targeted posts additionally need
/// `actor`, `target` and `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub verb: String,
    pub object: String,
    pub level: Level,
    #[serde(default)]
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Expiration time, epoch milliseconds on the wire.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires: Option<DateTime<Utc>>,
}

impl NewNotification {
    pub fn new(verb: impl Into<String>, object: impl Into<String>, level: Level) -> Self {
        Self {
            verb: verb.into(),
            object: object.into(),
            level,
            context: Context::default(),
            actor: None,
            target: Vec::new(),
            source: None,
            expires: None,
        }
    }
}

/// Response to a successful post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAck {
    pub id: String,
}

/// Response to mark seen / mark unseen.
///
/// The service names the accepted list `seen_notes` or `unseen_notes`
/// depending on the endpoint; both land in `notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkAck {
    #[serde(default, alias = "seen_notes", alias = "unseen_notes")]
    pub notes: Vec<String>,
    #[serde(default)]
    pub unauthorized_notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
