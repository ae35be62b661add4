//! In-memory [`FeedsApi`] shared by the unit tests of this crate.

use async_trait::async_trait;
use chrono::DateTime;
use feedtest_api::{FeedsApi, FeedsError};
use feedtest_core::{
    Context, FeedResponse, FilterState, Level, MarkAck, NewNotification, Notification, PostAck,
};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(FilterState),
    MarkSeen(Vec<String>),
    MarkUnseen(Vec<String>),
    Post(String),
    PostGlobal(String),
}

/// In-memory [`FeedsApi`] that records calls and replays scripted list
/// responses (`Err(status)` becomes an HTTP failure).
#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<Call>>,
    lists: Mutex<VecDeque<Result<FeedResponse, u16>>>,
    fail_writes: bool,
}

impl FakeApi {
    pub(crate) fn scripted(lists: Vec<Result<FeedResponse, u16>>) -> Self {
        Self { lists: Mutex::new(lists.into()), ..Self::default() }
    }

    /// Every post and mark fails with a 500; lists still succeed.
    pub(crate) fn failing_writes() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result<T>(&self, ok: T) -> Result<T, FeedsError> {
        if self.fail_writes {
            Err(FeedsError::Http { status: 500, body: "boom".into() })
        } else {
            Ok(ok)
        }
    }
}

#[async_trait]
impl FeedsApi for FakeApi {
    async fn list_notifications(
        &self,
        filters: &FilterState,
        _token: Option<&str>,
    ) -> Result<FeedResponse, FeedsError> {
        self.record(Call::List(filters.clone()));
        match self.lists.lock().unwrap().pop_front() {
            Some(Ok(feed)) => Ok(feed),
            Some(Err(status)) => Err(FeedsError::Http { status, body: "nope".into() }),
            None => Ok(FeedResponse::default()),
        }
    }

    async fn get_global_notifications(
        &self,
        _token: Option<&str>,
    ) -> Result<Vec<Notification>, FeedsError> {
        Ok(Vec::new())
    }

    async fn get_notification(
        &self,
        id: &str,
        _token: Option<&str>,
    ) -> Result<Notification, FeedsError> {
        Err(FeedsError::Http { status: 404, body: id.to_string() })
    }

    async fn post_notification(
        &self,
        data: &NewNotification,
        _token: Option<&str>,
    ) -> Result<PostAck, FeedsError> {
        self.record(Call::Post(data.verb.clone()));
        self.write_result(PostAck { id: "new-1".into() })
    }

    async fn post_global_notification(
        &self,
        data: &NewNotification,
        _token: Option<&str>,
    ) -> Result<PostAck, FeedsError> {
        self.record(Call::PostGlobal(data.verb.clone()));
        self.write_result(PostAck { id: "new-g".into() })
    }

    async fn mark_seen(&self, ids: &[String], _token: Option<&str>) -> Result<MarkAck, FeedsError> {
        self.record(Call::MarkSeen(ids.to_vec()));
        self.write_result(MarkAck { notes: ids.to_vec(), ..MarkAck::default() })
    }

    async fn mark_unseen(
        &self,
        ids: &[String],
        _token: Option<&str>,
    ) -> Result<MarkAck, FeedsError> {
        self.record(Call::MarkUnseen(ids.to_vec()));
        self.write_result(MarkAck { notes: ids.to_vec(), ..MarkAck::default() })
    }
}

pub(crate) fn note(id: &str, seen: bool) -> Notification {
    Notification {
        id: id.into(),
        actor: "alice".into(),
        verb: "joined".into(),
        object: "group1".into(),
        level: Level::Error,
        source: "groups".into(),
        created: DateTime::from_timestamp_millis(1_234_567_890).unwrap(),
        expires: None,
        seen,
        context: Context::default(),
    }
}

pub(crate) fn feed(global: Vec<Notification>, user: Vec<Notification>) -> FeedResponse {
    FeedResponse { global, user }
}

