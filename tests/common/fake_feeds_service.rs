//! Fake feeds service for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1, mounted under `/services/feeds/` like a real deployment.
//! Serves:
//! - `GET  api/V1/notifications`: both feeds, honouring `rev`, `v`, `l`, `seen`
//! - `GET  api/V1/notifications/global`
//! - `GET  api/V1/notification/{id}`
//! - `POST api/V1/notification`: targeted; needs actor, target and source
//! - `POST api/V1/notification/global`: only for the admin token
//! - `POST api/V1/notifications/see` and `.../unsee`
//!
//! Every request is recorded so tests can assert on method, path, query,
//! headers and body.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn demo() {
//! let service = FakeFeedsService::start().await.unwrap();
//! service.add_user(NotificationBuilder::new("n1").build()).await;
//! let client = FeedsClient::new(service.base_url());
//! # }
//! ```

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use feedtest_core::{Context, Level, Notification};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";

/// One request as the service saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct ServiceState {
    global: Vec<Notification>,
    user: Vec<Notification>,
    requests: Vec<RecordedRequest>,
    /// When set, every request fails with this status.
    fail_status: Option<u16>,
    next_id: u64,
}

type Shared = Arc<Mutex<ServiceState>>;

/// Handle to the running fake feeds service.
pub struct FakeFeedsService {
    addr: SocketAddr,
    state: Shared,
}

impl FakeFeedsService {
    /// Start the service on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(ServiceState::default()));

        let api = Router::new()
            .route("/api/V1/notifications", get(list_notifications))
            .route("/api/V1/notifications/global", get(list_global))
            .route("/api/V1/notifications/see", post(mark_seen))
            .route("/api/V1/notifications/unsee", post(mark_unseen))
            .route("/api/V1/notification", post(post_notification))
            .route("/api/V1/notification/global", post(post_global))
            .route("/api/V1/notification/{id}", get(get_notification))
            .with_state(state.clone());
        let app = Router::new().nest("/services/feeds", api);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL of the deployment, with the trailing slash clients expect.
    pub fn base_url(&self) -> String {
        format!("http://{}/services/feeds/", self.addr)
    }

    pub async fn add_global(&self, note: Notification) {
        self.state.lock().await.global.push(note);
    }

    pub async fn add_user(&self, note: Notification) {
        self.state.lock().await.user.push(note);
    }

    /// Make every subsequent request fail with `status`.
    pub async fn fail_with(&self, status: u16) {
        self.state.lock().await.fail_status = Some(status);
    }

    pub async fn recover(&self) {
        self.state.lock().await.fail_status = None;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn last_request(&self) -> Option<RecordedRequest> {
        self.state.lock().await.requests.last().cloned()
    }

    pub async fn user_notes(&self) -> Vec<Notification> {
        self.state.lock().await.user.clone()
    }

    pub async fn global_notes(&self) -> Vec<Notification> {
        self.state.lock().await.global.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// Record the request and apply the auth and failure rules shared by every
/// endpoint. `Err` carries the response to send instead.
async fn admit(
    state: &Shared,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Option<String>, Response> {
    let header = |name: axum::http::header::HeaderName| {
        headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    };
    let authorization = header(axum::http::header::AUTHORIZATION);
    let mut s = state.lock().await;
    s.requests.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: authorization.clone(),
        content_type: header(axum::http::header::CONTENT_TYPE),
        body: serde_json::from_slice(body).ok(),
    });

    if let Some(status) = s.fail_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err((status, Json(json!({"error": {"message": "scripted failure"}}))).into_response());
    }
    match authorization {
        Some(token) if !token.is_empty() => Ok(Some(token)),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "Authentication token required"}})),
        )
            .into_response()),
    }
}

fn query_params(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (k, v) = p.split_once('=').unwrap_or((p, ""));
            let v = urlencoding::decode(v).map(|v| v.into_owned()).unwrap_or_else(|_| v.to_string());
            (k.to_string(), v)
        })
        .collect()
}

async fn list_notifications(
    State(state): State<Shared>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = admit(&state, method, &uri, &headers, &Bytes::new()).await {
        return resp;
    }
    let params = query_params(&uri);
    let has = |key: &str| params.iter().any(|(k, v)| k == key && v == "1");
    let value = |key: &str| params.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());

    let level = value("l").and_then(|l| l.parse::<Level>().ok());
    let verb = value("v");
    let include_seen = has("seen");
    let reverse = has("rev");

    let s = state.lock().await;
    let select = |notes: &[Notification]| {
        let mut out: Vec<Notification> = notes
            .iter()
            .filter(|n| include_seen || !n.seen)
            .filter(|n| level.map_or(true, |l| n.level == l))
            .filter(|n| verb.as_deref().map_or(true, |v| n.verb == v))
            .cloned()
            .collect();
        // newest first unless reversed
        out.sort_by_key(|n| std::cmp::Reverse(n.created));
        if reverse {
            out.reverse();
        }
        out
    };
    Json(json!({"global": select(&s.global), "user": select(&s.user)})).into_response()
}

async fn list_global(
    State(state): State<Shared>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = admit(&state, method, &uri, &headers, &Bytes::new()).await {
        return resp;
    }
    let s = state.lock().await;
    Json(s.global.clone()).into_response()
}

async fn get_notification(
    State(state): State<Shared>,
    Path(id): Path<String>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = admit(&state, method, &uri, &headers, &Bytes::new()).await {
        return resp;
    }
    let s = state.lock().await;
    match s.user.iter().chain(s.global.iter()).find(|n| n.id == id) {
        Some(note) => Json(json!({ "notification": note })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": format!("Cannot find notification with id {id}")}})),
        )
            .into_response(),
    }
}

async fn post_notification(
    State(state): State<Shared>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(resp) = admit(&state, method, &uri, &headers, &body).await {
        return resp;
    }
    let data: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    for key in ["actor", "target", "source", "verb", "object", "level"] {
        if data.get(key).map_or(true, Value::is_null) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"message": format!("Missing required field: {key}")}})),
            )
                .into_response();
        }
    }
    let mut s = state.lock().await;
    let note = stored_note(&mut s, &data, data["actor"].as_str().unwrap_or_default());
    let id = note.id.clone();
    s.user.push(note);
    Json(json!({ "id": id })).into_response()
}

async fn post_global(
    State(state): State<Shared>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let token = match admit(&state, method, &uri, &headers, &body).await {
        Ok(token) => token,
        Err(resp) => return resp,
    };
    if token.as_deref() != Some(ADMIN_TOKEN) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"message": "You do not have permission to post global notifications"}})),
        )
            .into_response();
    }
    let data: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let mut s = state.lock().await;
    let note = stored_note(&mut s, &data, "kbase");
    let id = note.id.clone();
    s.global.push(note);
    Json(json!({ "id": id })).into_response()
}

async fn mark_seen(
    State(state): State<Shared>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mark(state, method, uri, headers, body, true).await
}

async fn mark_unseen(
    State(state): State<Shared>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mark(state, method, uri, headers, body, false).await
}

async fn mark(
    state: Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    seen: bool,
) -> Response {
    if let Err(resp) = admit(&state, method, &uri, &headers, &body).await {
        return resp;
    }
    let data: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let ids: Vec<String> = data["note_ids"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    if ids.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"message": "Expected a list of notification ids"}})),
        )
            .into_response();
    }

    let mut s = state.lock().await;
    let (mut done, mut refused) = (Vec::new(), Vec::new());
    for id in ids {
        match s.user.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.seen = seen;
                done.push(id);
            }
            None => refused.push(id),
        }
    }
    let key = if seen { "seen_notes" } else { "unseen_notes" };
    let mut reply = serde_json::Map::new();
    reply.insert(key.to_string(), json!(done));
    reply.insert("unauthorized_notes".to_string(), json!(refused));
    Json(Value::Object(reply)).into_response()
}

fn stored_note(s: &mut ServiceState, data: &Value, actor: &str) -> Notification {
    s.next_id += 1;
    let text = |key: &str| data[key].as_str().unwrap_or_default().to_string();
    let context: Context = serde_json::from_value(data["context"].clone()).unwrap_or_default();
    Notification {
        id: format!("posted-{}", s.next_id),
        actor: actor.to_string(),
        verb: text("verb"),
        object: text("object"),
        level: serde_json::from_value(data["level"].clone()).unwrap_or(Level::Alert),
        source: data["source"].as_str().unwrap_or("feeds").to_string(),
        created: chrono::Utc::now(),
        expires: None,
        seen: false,
        context,
    }
}
