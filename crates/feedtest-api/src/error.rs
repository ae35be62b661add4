//! Errors returned by [`FeedsApi`](crate::FeedsApi) calls.

/// Failure of a single feeds service call.
///
/// `AuthRequired`, `UnsupportedMethod` and `NoNotificationIds` are raised
/// before anything touches the network. The remaining variants are
/// transport or HTTP failures and are shown to the user only as a generic
/// banner.
#[derive(Debug, thiserror::Error)]
pub enum FeedsError {
    #[error("auth token required")]
    AuthRequired,

    #[error("method {0} not usable")]
    UnsupportedMethod(String),

    #[error("at least one notification id is required")]
    NoNotificationIds,

    #[error("could not build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("request to feeds service failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("failed reading response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("feeds service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not decode feeds response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FeedsError {
    /// True for failures raised locally, before a request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            FeedsError::AuthRequired
                | FeedsError::UnsupportedMethod(_)
                | FeedsError::NoNotificationIds
        )
    }
}
