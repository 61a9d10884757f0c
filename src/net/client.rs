//! Authenticated API client with transparent access-token refresh.
//!
//! ARCHITECTURE
//! ============
//! Outbound: every request is decorated with `Authorization: Bearer <token>`
//! when the session holds an access token, and sent as-is otherwise.
//!
//! Inbound: a 401 on a request that has not been replayed yet goes through
//! recovery. The first such request leads a single refresh call
//! (`POST /auth/refresh`, cookie-authenticated); any 401 that arrives while
//! that call is outstanding queues behind it on the [`RefreshGate`]. When the
//! refresh settles, queued requests are released in arrival order and every
//! request is replayed once with the new token. A failed refresh clears the
//! session and fails the leader and every queued request with the same
//! [`ApiError::AuthExpired`].
//!
//! A replayed request that still gets 401 fails with
//! [`ApiError::Unauthorized`]; it never starts another refresh.
//!
//! Replays of queued requests leave in arrival order on a `current_thread`
//! runtime. On a multi-thread runtime only the single refresh and the fresh
//! token on every replay are guaranteed.
//!
//! TRADE-OFFS
//! ==========
//! A 401 for a request that was sent with a token the session has since
//! replaced is replayed with the current token instead of refreshing again.
//! This covers responses that land after a concurrent refresh finished.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::refresh::{Entry, RefreshGate, RefreshOutcome};
use super::transport::{ReqwestTransport, Transport};
use super::types::{ApiRequest, ApiResponse};
use crate::config::ClientConfig;
use crate::session::SessionStore;

pub const REFRESH_PATH: &str = "/auth/refresh";

// =============================================================================
// CLIENT
// =============================================================================

/// Cheap-to-clone handle; clones share the transport, session and refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    gate: RefreshGate,
    refresh_timeout: Option<Duration>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self { transport, session, gate: RefreshGate::new(), refresh_timeout: None }
    }

    /// Build a client backed by [`ReqwestTransport`]. A refresh token already
    /// held by `session` is seeded into the transport's cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL is invalid.
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.clone())?;
        if let Some(token) = session.refresh_token() {
            transport.seed_refresh_cookie(&token)?;
        }
        Ok(Self::new(Arc::new(transport), session).with_refresh_timeout(config.timeouts.refresh))
    }

    /// Bound each refresh call. `None` waits as long as the transport does.
    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.gate.is_refreshing()
    }

    /// Copy a refresh token the server set only as a cookie into the session,
    /// so a saved session still carries it. Signed-out sessions are left
    /// alone. Returns whether the session changed.
    pub fn capture_refresh_cookie(&self) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }
        let Some(token) = self.transport.refresh_cookie() else {
            return false;
        };
        if self.session.refresh_token().as_deref() == Some(token.as_str()) {
            return false;
        }
        debug!("storing refresh token received as cookie");
        self.session.set_refresh_token(token);
        true
    }

    /// Requests currently parked behind an in-flight refresh.
    #[must_use]
    pub fn queued_requests(&self) -> usize {
        self.gate.queued()
    }

    /// Send a request, recovering from an expired access token if possible.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] if no response arrived
    /// - [`ApiError::AuthExpired`] if a 401 could not be recovered by refreshing
    /// - [`ApiError::Unauthorized`] if the replayed request was rejected again
    /// - [`ApiError::Server`] for any other non-2xx status
    #[tracing::instrument(skip_all, fields(request_id = %request.id, method = %request.method, path = %request.path))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        request.bearer = self.session.access_token();
        debug!(authenticated = request.bearer.is_some(), retried = request.retried, "dispatching request");

        let response = self.transport.execute(&request).await?;
        if response.is_unauthorized() && !request.retried {
            return self.recover(request).await;
        }
        into_result(response, request.retried)
    }

    /// Send a request and deserialize its JSON body.
    ///
    /// # Errors
    ///
    /// Everything [`ApiClient::send`] returns, plus [`ApiError::Decode`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    async fn recover(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        request.retried = true;

        let current = self.session.access_token();
        let token = if current.is_some() && current != request.bearer {
            debug!("token replaced since dispatch; replaying without refresh");
            current
        } else {
            match self.gate.enter() {
                Entry::Leader(lease) => {
                    let outcome = self.refresh().await;
                    let released = lease.settle(&outcome);
                    debug!(released, "released queued requests");
                    Some(outcome?)
                }
                Entry::Waiter(pending) => {
                    debug!("queued behind in-flight token refresh");
                    Some(pending.wait().await?)
                }
            }
        };

        request.bearer = token;
        debug!("replaying request with refreshed token");
        let response = self.transport.execute(&request).await?;
        into_result(response, true)
    }

    /// Perform one refresh call and apply its result to the session.
    async fn refresh(&self) -> RefreshOutcome {
        info!("access token rejected; refreshing");
        let result = match self.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, self.request_refresh())
                .await
                .unwrap_or_else(|_| Err(ApiError::Network(format!("token refresh timed out after {limit:?}")))),
            None => self.request_refresh().await,
        };

        match result {
            Ok(tokens) => {
                self.session.update_tokens(tokens.access_token.clone(), tokens.refresh_token);
                info!("access token refreshed");
                Ok(tokens.access_token)
            }
            Err(cause) => {
                warn!(error = %cause, "token refresh failed; clearing session");
                self.session.clear_auth();
                Err(ApiError::AuthExpired(Box::new(cause)))
            }
        }
    }

    async fn request_refresh(&self) -> Result<RefreshedTokens, ApiError> {
        let request = ApiRequest::post(REFRESH_PATH).with_credentials();
        let response = self.transport.execute(&request).await?;
        if !response.is_success() {
            return Err(ApiError::Server { status: response.status, message: response.message() });
        }
        parse_refresh(&response.body)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .field("refreshing", &self.is_refreshing())
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}

fn into_result(response: ApiResponse, retried: bool) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    if response.is_unauthorized() && retried {
        return Err(ApiError::Unauthorized { message: response.message() });
    }
    Err(ApiError::Server { status: response.status, message: response.message() })
}

// =============================================================================
// REFRESH WIRE TYPES
// =============================================================================

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct RefreshedTokens {
    access_token: String,
    refresh_token: Option<String>,
}

fn parse_refresh(body: &str) -> Result<RefreshedTokens, ApiError> {
    let parsed: RefreshResponse = serde_json::from_str(body)?;
    if !parsed.success {
        let message = parsed.message.unwrap_or_else(|| "refresh reported failure".to_owned());
        return Err(ApiError::RefreshRejected(message));
    }
    let access_token = parsed
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::RefreshRejected("response carried no access token".to_owned()))?;
    let refresh_token = parsed.refresh_token.filter(|token| !token.is_empty());
    Ok(RefreshedTokens { access_token, refresh_token })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
