//! feedtest-core: shared types for the feeds test harness.
//!
//! # Layers
//!
//! ```text
//! FeedsApi ──► FeedController ──► FeedList / Poster widgets
//!    │               │
//!    └── types ──────┴──► filter, view
//! ```
//!
//! This crate holds everything that is independent of both the transport and
//! the terminal: the wire model, filter state with its query encoding, the
//! notification view model, and configuration.

pub mod config;
pub mod filter;
pub mod types;
pub mod view;

pub use filter::{FilterPatch, FilterState};
pub use types::{
    Context, FeedResponse, FeedScope, Level, MarkAck, NewNotification, Notification, PostAck,
};
pub use view::{NotificationView, SeenToggle};
