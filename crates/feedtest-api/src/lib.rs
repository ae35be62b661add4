//! feedtest-api: client for the notification feeds service.
//!
//! [`FeedsApi`] is the seam the rest of the harness talks to. [`FeedsClient`]
//! implements it over HTTP with hyper; tests substitute in-memory fakes.

pub mod client;
pub mod error;

pub use client::FeedsClient;
pub use error::FeedsError;

use async_trait::async_trait;
use feedtest_core::{FeedResponse, FilterState, MarkAck, NewNotification, Notification, PostAck};

/// Operations offered by the feeds service.
///
/// Every call takes the caller's token and fails with
/// [`FeedsError::AuthRequired`] when it is missing or empty.
#[async_trait]
pub trait FeedsApi: Send + Sync {
    /// `GET api/V1/notifications?<query>`: both feeds, filtered.
    async fn list_notifications(
        &self,
        filters: &FilterState,
        token: Option<&str>,
    ) -> Result<FeedResponse, FeedsError>;

    /// `GET api/V1/notifications/global`.
    async fn get_global_notifications(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<Notification>, FeedsError>;

    /// `GET api/V1/notification/<id>`.
    async fn get_notification(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Notification, FeedsError>;

    /// `POST api/V1/notification`: targeted notification.
    async fn post_notification(
        &self,
        data: &NewNotification,
        token: Option<&str>,
    ) -> Result<PostAck, FeedsError>;

    /// `POST api/V1/notification/global`: requires the admin role server-side.
    async fn post_global_notification(
        &self,
        data: &NewNotification,
        token: Option<&str>,
    ) -> Result<PostAck, FeedsError>;

    /// `POST api/V1/notifications/see` with `{note_ids}`. `ids` must be non-empty.
    async fn mark_seen(&self, ids: &[String], token: Option<&str>) -> Result<MarkAck, FeedsError>;

    /// `POST api/V1/notifications/unsee` with `{note_ids}`. `ids` must be non-empty.
    async fn mark_unseen(&self, ids: &[String], token: Option<&str>)
        -> Result<MarkAck, FeedsError>;
}
