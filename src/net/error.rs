//! Error taxonomy surfaced to callers of the API client.
//!
//! `ApiError` is `Clone` because one refresh failure fans out to every
//! request queued behind it; payloads are therefore owned strings rather
//! than the underlying transport/serde error types.

/// Errors produced by [`ApiClient`](super::client::ApiClient) and the
/// resource modules built on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The transport failed before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// A 401 could not be recovered because the token refresh failed.
    /// The session has been cleared; the inner error is the refresh's own.
    #[error("session expired: {0}")]
    AuthExpired(Box<ApiError>),

    /// The backend answered with a non-401, non-2xx status.
    #[error("server error: status {status}: {message}")]
    Server { status: u16, message: String },

    /// A 401 on a request that was already replayed once after a refresh.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The refresh endpoint answered 2xx but reported failure or carried no token.
    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    /// The request driving the refresh was dropped before the refresh settled.
    #[error("token refresh was cancelled")]
    RefreshCancelled,

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The backend envelope reported `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// A header value could not be constructed.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// The configured base URL or request path did not form a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status carried by this error, if the backend produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::AuthExpired(inner) => inner.status(),
            _ => None,
        }
    }

    /// `true` when the error means the user must sign in again.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::AuthExpired(_) | Self::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
