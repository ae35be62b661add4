//! Feed controller: owns both feed lists and drives every network call.
//!
//! The controller never blocks the UI thread. Each call is spawned on the
//! runtime [`Handle`] it was given; the task sends a [`ControllerMsg`] back
//! over an unbounded channel and the event loop applies it with
//! [`FeedController::pump`] on the next tick. Tests await
//! [`FeedController::settle`] instead, which applies messages until nothing
//! is in flight (including refreshes started by earlier completions).
//!
//! Superseded fetches are not cancelled. Whichever response arrives last is
//! what the lists show.

use crate::widgets::{
    feed_list::{FeedAction, FeedListState},
    poster::PosterKind,
};
use feedtest_api::{FeedsApi, FeedsError};
use feedtest_core::{
    FeedResponse, FeedScope, FilterState, MarkAck, NewNotification, PostAck, SeenToggle,
};
use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};

pub const FETCH_ERROR_BANNER: &str = "An error occurred while fetching your feed!";
pub const UPDATE_ERROR_BANNER: &str = "An error occurred while updating your feed!";

/// Completion of a spawned call, applied on the UI thread.
#[derive(Debug)]
pub enum ControllerMsg {
    Fetched(Result<FeedResponse, FeedsError>),
    Marked(SeenToggle, Result<MarkAck, FeedsError>),
    /// Carries the id of the form that submitted it.
    Posted(u64, PosterKind, Result<PostAck, FeedsError>),
}

/// How a post ended, keyed by the form that submitted it.
pub type PostOutcome = (u64, Result<PostAck, String>);

pub struct FeedController {
    api: Arc<dyn FeedsApi>,
    handle: Handle,
    tx: UnboundedSender<ControllerMsg>,
    rx: UnboundedReceiver<ControllerMsg>,
    in_flight: usize,

    token: Option<String>,
    display_name: Option<String>,
    visible: bool,
    banner: Option<&'static str>,
    global: FeedListState,
    user: FeedListState,
    post_outcomes: Vec<PostOutcome>,
}

impl FeedController {
    pub fn new(api: Arc<dyn FeedsApi>, handle: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            handle,
            tx,
            rx,
            in_flight: 0,
            token: None,
            display_name: None,
            visible: false,
            banner: None,
            global: FeedListState::new(FeedScope::Global, "Global"),
            user: FeedListState::new(FeedScope::User, "Your").with_controls(),
            post_outcomes: Vec::new(),
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner
    }

    pub fn global(&self) -> &FeedListState {
        &self.global
    }

    pub fn user(&self) -> &FeedListState {
        &self.user
    }

    pub fn list_mut(&mut self, scope: FeedScope) -> &mut FeedListState {
        match scope {
            FeedScope::Global => &mut self.global,
            FeedScope::User => &mut self.user,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Filters the refresh callback uses: the user list's, since only it
    /// carries controls.
    pub fn current_filters(&self) -> FilterState {
        self.user.filters.clone()
    }

    /// Posts finished since the last call, oldest first. The app shell
    /// matches each against the open poster form.
    pub fn take_post_outcomes(&mut self) -> Vec<PostOutcome> {
        std::mem::take(&mut self.post_outcomes)
    }

    // ── Operations ─────────────────────────────────────────────────────────

    /// Start a session: remember the token, title the user list after the
    /// display name, drop any previous render and fetch unfiltered.
    pub fn initialize(&mut self, display_name: &str, token: &str) {
        tracing::info!(display_name, "feed: initialize");
        self.token = Some(token.to_string());
        self.display_name = Some(display_name.to_string());
        self.user.set_title(format!("{display_name}'s"));
        self.teardown();
        self.user.filters = FilterState::default();
        self.refresh(FilterState::default());
    }

    /// Show the feed and fetch both lists with `filters`.
    pub fn refresh(&mut self, filters: FilterState) {
        self.visible = true;
        self.global.set_loading();
        self.user.set_loading();

        tracing::debug!(?filters, "feed: refresh");
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        self.spawn(async move {
            let result = api.list_notifications(&filters, token.as_deref()).await;
            ControllerMsg::Fetched(result)
        });
    }

    /// Hide the feed and clear both lists. Fetches already in flight still
    /// land, into the hidden lists.
    pub fn teardown(&mut self) {
        tracing::debug!("feed: teardown");
        self.visible = false;
        self.banner = None;
        self.global.hide();
        self.user.hide();
    }

    /// Forget the session entirely.
    pub fn logout(&mut self) {
        tracing::info!("feed: logout");
        self.token = None;
        self.display_name = None;
        self.teardown();
    }

    pub fn toggle_seen(&mut self, scope: FeedScope, toggle: SeenToggle) {
        tracing::debug!(%scope, ?toggle, "feed: toggle seen");
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        self.spawn(async move {
            let ids = vec![toggle.id().to_string()];
            let result = match toggle {
                SeenToggle::MarkSeen(_) => api.mark_seen(&ids, token.as_deref()).await,
                SeenToggle::MarkUnseen(_) => api.mark_unseen(&ids, token.as_deref()).await,
            };
            ControllerMsg::Marked(toggle, result)
        });
    }

    /// Post `data` on behalf of poster form `form`.
    pub fn submit_post(&mut self, form: u64, kind: PosterKind, data: NewNotification) {
        tracing::debug!(form, ?kind, verb = %data.verb, "feed: submit post");
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        self.spawn(async move {
            let result = match kind {
                PosterKind::Targeted => api.post_notification(&data, token.as_deref()).await,
                PosterKind::Global => api.post_global_notification(&data, token.as_deref()).await,
            };
            ControllerMsg::Posted(form, kind, result)
        });
    }

    /// Act on something a feed list asked for.
    pub fn dispatch(&mut self, scope: FeedScope, action: FeedAction) {
        match action {
            FeedAction::Refresh(filters) => self.refresh(filters),
            FeedAction::ToggleSeen(toggle) => self.toggle_seen(scope, toggle),
        }
    }

    // ── Completion handling ────────────────────────────────────────────────

    /// Apply every completion that has already arrived. Returns how many
    /// were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            applied += 1;
        }
        applied
    }

    /// Wait for and apply completions until no call is in flight.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(msg) => self.apply(msg),
                None => break,
            }
        }
    }

    pub fn apply(&mut self, msg: ControllerMsg) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match msg {
            ControllerMsg::Fetched(Ok(feed)) => {
                tracing::info!(
                    global = feed.global.len(),
                    user = feed.user.len(),
                    "feed: fetched"
                );
                self.banner = None;
                self.global.render(&feed.global);
                self.user.render(&feed.user);
            }
            ControllerMsg::Fetched(Err(e)) => {
                tracing::warn!(error = %e, "feed: fetch failed");
                self.fail(FETCH_ERROR_BANNER);
            }
            ControllerMsg::Marked(toggle, Ok(ack)) => {
                if !ack.unauthorized_notes.is_empty() {
                    tracing::warn!(ids = ?ack.unauthorized_notes, "feed: not allowed to mark");
                }
                tracing::info!(?toggle, "feed: marked");
                self.refresh_if_visible();
            }
            ControllerMsg::Marked(toggle, Err(e)) => {
                tracing::warn!(?toggle, error = %e, "feed: mark failed");
                self.fail(UPDATE_ERROR_BANNER);
            }
            ControllerMsg::Posted(form, kind, Ok(ack)) => {
                tracing::info!(form, ?kind, id = %ack.id, "feed: posted");
                self.post_outcomes.push((form, Ok(ack)));
                self.refresh_if_visible();
            }
            ControllerMsg::Posted(form, kind, Err(e)) => {
                tracing::warn!(form, ?kind, error = %e, "feed: post failed");
                self.post_outcomes.push((form, Err(e.to_string())));
            }
        }
    }

    /// Follow-up refresh after a write. A feed hidden by teardown or logout
    /// stays hidden.
    fn refresh_if_visible(&mut self) {
        if self.visible {
            self.refresh(self.current_filters());
        } else {
            tracing::debug!("feed: hidden, skipping follow-up refresh");
        }
    }

    fn fail(&mut self, banner: &'static str) {
        self.global.set_error();
        self.user.set_error();
        self.banner = Some(banner);
    }

    fn spawn<F>(&mut self, call: F)
    where
        F: std::future::Future<Output = ControllerMsg> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            // The receiver lives as long as the controller.
            let _ = tx.send(call.await);
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
