//! Networking — the authenticated REST client and its transport.
//!
//! DESIGN
//! ======
//! `client` owns the 401 recovery state machine, `refresh` the single-flight
//! gate it uses, `transport` the wire layer. Resource modules under
//! `crate::api` only ever talk to [`ApiClient`].

pub mod client;
pub mod error;
pub mod refresh;
pub mod transport;
pub mod types;

pub use client::{ApiClient, REFRESH_PATH};
pub use error::ApiError;
pub use transport::{ReqwestTransport, Transport};
pub use types::{ApiRequest, ApiResponse, FormPart, Method, PartValue, RequestBody};

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;
    use crate::session::SessionStore;

    type Hook = Box<dyn Fn(&ApiRequest) + Send + Sync>;

    /// A request as the transport saw it.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub method: Method,
        pub path: String,
        pub query: Vec<(String, String)>,
        pub bearer: Option<String>,
        pub with_credentials: bool,
        pub retried: bool,
        pub body: RequestBody,
    }

    #[derive(Default)]
    struct MockState {
        accepted_token: Option<String>,
        routes: HashMap<String, VecDeque<ApiResponse>>,
        refresh_cookie: Option<String>,
        refresh_results: VecDeque<Result<ApiResponse, ApiError>>,
        calls: Vec<RecordedCall>,
    }

    /// Scripted transport.
    ///
    /// - With an accepted token set, any non-refresh request whose bearer
    ///   differs gets a 401.
    /// - Refresh calls pop scripted results; with `hold_refresh` they block
    ///   until [`MockTransport::release_refresh`].
    /// - Other requests answer from per-route queues (`"GET /cart"`), the last
    ///   queued response repeating, or a generic success envelope.
    #[derive(Default)]
    pub struct MockTransport {
        state: Mutex<MockState>,
        hold_refresh: bool,
        refresh_started: Notify,
        release: Notify,
        hook: Option<Hook>,
    }

    impl MockTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn accept_token(self, token: &str) -> Self {
            self.lock().accepted_token = Some(token.to_owned());
            self
        }

        #[must_use]
        pub fn hold_refresh(mut self) -> Self {
            self.hold_refresh = true;
            self
        }

        #[must_use]
        pub fn refresh_ok(self, access: &str, refresh: &str) -> Self {
            let body = serde_json::json!({ "success": true, "accessToken": access, "refreshToken": refresh });
            self.refresh_result(Ok(ApiResponse::new(200, body.to_string())))
        }

        #[must_use]
        pub fn refresh_result(self, result: Result<ApiResponse, ApiError>) -> Self {
            self.lock().refresh_results.push_back(result);
            self
        }

        #[must_use]
        pub fn route(self, method: &Method, path: &str, status: u16, body: serde_json::Value) -> Self {
            self.lock()
                .routes
                .entry(route_key(method, path))
                .or_default()
                .push_back(ApiResponse::new(status, body.to_string()));
            self
        }

        /// Run `hook` on every non-refresh request before answering it.
        #[must_use]
        pub fn on_request(mut self, hook: impl Fn(&ApiRequest) + Send + Sync + 'static) -> Self {
            self.hook = Some(Box::new(hook));
            self
        }

        /// Refresh token the mock reports as held in its cookie jar.
        #[must_use]
        pub fn refresh_cookie_value(self, token: &str) -> Self {
            self.lock().refresh_cookie = Some(token.to_owned());
            self
        }

        pub async fn refresh_started(&self) {
            tokio::time::timeout(Duration::from_secs(5), self.refresh_started.notified())
                .await
                .expect("refresh call was never made");
        }

        pub fn release_refresh(&self) {
            self.release.notify_one();
        }

        #[must_use]
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.lock().calls.clone()
        }

        #[must_use]
        pub fn refresh_calls(&self) -> usize {
            self.calls().iter().filter(|c| c.path == REFRESH_PATH).count()
        }

        /// Non-refresh calls, in dispatch order.
        #[must_use]
        pub fn api_calls(&self) -> Vec<RecordedCall> {
            self.calls().into_iter().filter(|c| c.path != REFRESH_PATH).collect()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    fn route_key(method: &Method, path: &str) -> String {
        format!("{method} {path}")
    }

    fn default_body(path: &str) -> String {
        serde_json::json!({ "success": true, "data": { "path": path } }).to_string()
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.lock().calls.push(RecordedCall {
                method: request.method.clone(),
                path: request.path.clone(),
                query: request.query.clone(),
                bearer: request.bearer.clone(),
                with_credentials: request.with_credentials,
                retried: request.retried,
                body: request.body.clone(),
            });

            if request.path == REFRESH_PATH {
                self.refresh_started.notify_one();
                if self.hold_refresh {
                    self.release.notified().await;
                }
                return self
                    .lock()
                    .refresh_results
                    .pop_front()
                    .unwrap_or_else(|| Ok(ApiResponse::new(500, r#"{"message":"no scripted refresh"}"#)));
            }

            if let Some(hook) = &self.hook {
                hook(request);
            }

            let mut state = self.lock();
            if let Some(accepted) = &state.accepted_token {
                if request.bearer.as_ref() != Some(accepted) {
                    return Ok(ApiResponse::new(401, r#"{"success":false,"message":"jwt expired"}"#));
                }
            }
            let key = route_key(&request.method, &request.path);
            let response = match state.routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            Ok(response.unwrap_or_else(|| ApiResponse::new(200, default_body(&request.path))))
        }

        fn refresh_cookie(&self) -> Option<String> {
            self.lock().refresh_cookie.clone()
        }
    }

    /// Client over a fresh mock, signed in with `token`.
    #[must_use]
    pub fn client_with(transport: MockTransport, token: Option<&str>) -> (ApiClient, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let session = SessionStore::new();
        if let Some(token) = token {
            session.set_session(token.to_owned(), Some("ref1".to_owned()), None);
        }
        let client = ApiClient::new(transport.clone(), session);
        (client, transport)
    }

    /// Yield until `n` requests are parked behind the running refresh.
    pub async fn wait_for_queue(client: &ApiClient, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while client.queued_requests() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("requests never queued behind the refresh");
    }
}
