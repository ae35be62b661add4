//! hyper-backed [`FeedsApi`] implementation.
//!
//! Every call goes through [`FeedsClient::call`], which
//! - checks the token before building anything,
//! - strips a leading `/` from the path and joins it onto the base URL,
//! - upper-cases the method and rejects anything but GET/POST/PUT/DELETE,
//! - sends the raw token as `Authorization` with a JSON content type,
//! - maps non-2xx statuses to [`FeedsError::Http`] and decodes the body.

use crate::{error::FeedsError, FeedsApi};
use async_trait::async_trait;
use feedtest_core::{FeedResponse, FilterState, MarkAck, NewNotification, Notification, PostAck};
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, header, Method, Request};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::{de::DeserializeOwned, Deserialize};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const ALLOWED_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

pub(crate) const NOTIFICATIONS_PATH: &str = "api/V1/notifications";
pub(crate) const GLOBAL_NOTIFICATIONS_PATH: &str = "api/V1/notifications/global";
pub(crate) const NOTIFICATION_PATH: &str = "api/V1/notification";
pub(crate) const GLOBAL_NOTIFICATION_PATH: &str = "api/V1/notification/global";
pub(crate) const SEE_PATH: &str = "api/V1/notifications/see";
pub(crate) const UNSEE_PATH: &str = "api/V1/notifications/unsee";

/// HTTP client for one feeds service deployment.
#[derive(Clone)]
pub struct FeedsClient {
    base_url: String,
    http: Client<HttpConnector, Full<Bytes>>,
}

#[derive(Deserialize)]
struct SingleNotification {
    notification: Notification,
}

impl FeedsClient {
    /// Create a client rooted at `base_url` (e.g. `http://host/services/feeds/`).
    /// A trailing `/` is added if missing.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let http = Client::builder(TokioExecutor::new()).build_http();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<T, FeedsError> {
        let token = require_token(token)?;
        let method = parse_method(method)?;
        let url = format!("{}{}", self.base_url, path.strip_prefix('/').unwrap_or(path));

        let payload = match body {
            Some(ref value) => Bytes::from(serde_json::to_vec(value)?),
            None => Bytes::new(),
        };
        let request = Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(header::AUTHORIZATION, token)
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Full::new(payload))?;

        tracing::debug!(%method, %url, "feeds call");
        let response = self.http.request(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::warn!(%method, %url, status = status.as_u16(), "feeds call failed");
            return Err(FeedsError::Http { status: status.as_u16(), body });
        }

        tracing::debug!(%method, %url, status = status.as_u16(), bytes = bytes.len(), "feeds call ok");
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl FeedsApi for FeedsClient {
    async fn list_notifications(
        &self,
        filters: &FilterState,
        token: Option<&str>,
    ) -> Result<FeedResponse, FeedsError> {
        require_token(token)?;
        let query = filters.to_query();
        let path = if query.is_empty() {
            NOTIFICATIONS_PATH.to_string()
        } else {
            format!("{NOTIFICATIONS_PATH}?{query}")
        };
        self.call("get", &path, token, None).await
    }

    async fn get_global_notifications(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<Notification>, FeedsError> {
        self.call("get", GLOBAL_NOTIFICATIONS_PATH, token, None).await
    }

    async fn get_notification(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Notification, FeedsError> {
        let path = format!("{NOTIFICATION_PATH}/{}", urlencoding::encode(id));
        let single: SingleNotification = self.call("get", &path, token, None).await?;
        Ok(single.notification)
    }

    async fn post_notification(
        &self,
        data: &NewNotification,
        token: Option<&str>,
    ) -> Result<PostAck, FeedsError> {
        let body = serde_json::to_value(data)?;
        self.call("post", NOTIFICATION_PATH, token, Some(body)).await
    }

    async fn post_global_notification(
        &self,
        data: &NewNotification,
        token: Option<&str>,
    ) -> Result<PostAck, FeedsError> {
        // The global endpoint ignores targeting fields; don't send them.
        let body = serde_json::json!({
            "verb": data.verb,
            "object": data.object,
            "level": data.level,
            "context": data.context,
        });
        self.call("post", GLOBAL_NOTIFICATION_PATH, token, Some(body)).await
    }

    async fn mark_seen(&self, ids: &[String], token: Option<&str>) -> Result<MarkAck, FeedsError> {
        self.mark(SEE_PATH, ids, token).await
    }

    async fn mark_unseen(
        &self,
        ids: &[String],
        token: Option<&str>,
    ) -> Result<MarkAck, FeedsError> {
        self.mark(UNSEE_PATH, ids, token).await
    }
}

impl FeedsClient {
    async fn mark(
        &self,
        path: &str,
        ids: &[String],
        token: Option<&str>,
    ) -> Result<MarkAck, FeedsError> {
        require_token(token)?;
        if ids.is_empty() {
            return Err(FeedsError::NoNotificationIds);
        }
        let body = serde_json::json!({ "note_ids": ids });
        self.call("post", path, token, Some(body)).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject a missing or empty token.
pub(crate) fn require_token(token: Option<&str>) -> Result<&str, FeedsError> {
    match token {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(FeedsError::AuthRequired),
    }
}

/// Upper-case `method` and accept only the verbs the service speaks.
pub(crate) fn parse_method(method: &str) -> Result<Method, FeedsError> {
    let upper = method.to_ascii_uppercase();
    if !ALLOWED_METHODS.contains(&upper.as_str()) {
        return Err(FeedsError::UnsupportedMethod(upper));
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| FeedsError::UnsupportedMethod(upper))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
