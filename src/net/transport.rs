//! Wire transport — turns [`ApiRequest`]s into HTTP calls.
//!
//! DESIGN
//! ======
//! `Transport` is the seam between the client's recovery logic and the
//! network; tests substitute a scripted implementation. `ReqwestTransport`
//! keeps its own cookie jar: `Set-Cookie` from any response is stored, and
//! cookies are only sent on requests marked `with_credentials` (the refresh
//! token travels as a cookie, never in a body).

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::multipart::{Form, Part};

use super::client::REFRESH_PATH;
use super::error::ApiError;
use super::types::{ApiRequest, ApiResponse, FormPart, PartValue, RequestBody};
use crate::config::ClientConfig;

/// Sends a single request and reports whatever response came back.
///
/// Implementations return `Err` only when no response was received; every
/// HTTP status, including 401 and 5xx, is an `Ok(ApiResponse)`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;

    /// Refresh token currently held as a cookie, if the transport keeps cookies.
    fn refresh_cookie(&self) -> Option<String> {
        None
    }
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
    config: ClientConfig,
    cookies: Arc<Jar>,
}

impl ReqwestTransport {
    /// Build a transport for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeouts.request {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.timeouts.connect {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Network(format!("http client build failed: {e}")))?;
        Ok(Self { http, config, cookies: Arc::new(Jar::default()) })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Put a refresh token obtained earlier (e.g. from a saved session) into
    /// the cookie jar so the next credentialed request carries it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL does not parse.
    pub fn seed_refresh_cookie(&self, token: &str) -> Result<(), ApiError> {
        let url = parse_url(&self.config.base_url)?;
        let cookie = format!("{}={token}; Path=/", self.config.refresh_cookie_name);
        self.cookies.add_cookie_str(&cookie, &url);
        Ok(())
    }

    /// Assemble the HTTP request for one send. Cookies from the jar are
    /// attached only when the request is credentialed; a multipart form is
    /// rebuilt from its parts on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, a MIME type, or the request itself is invalid.
    pub fn build_request(&self, request: &ApiRequest) -> Result<reqwest::Request, ApiError> {
        let url = parse_url(&self.config.url_for(&request.path))?;

        let mut builder = self.http.request(request.method.clone(), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if request.with_credentials {
            if let Some(cookie) = self.cookies.cookies(&url) {
                builder = builder.header(COOKIE, cookie);
            }
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };
        Ok(builder.build()?)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let http_request = self.build_request(request)?;
        let url = http_request.url().clone();

        let response = self.http.execute(http_request).await.map_err(|e| ApiError::Network(e.to_string()))?;

        let mut set_cookies = response.headers().get_all(SET_COOKIE).iter().peekable();
        if set_cookies.peek().is_some() {
            self.cookies.set_cookies(&mut set_cookies, &url);
        }

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }

    fn refresh_cookie(&self) -> Option<String> {
        // The refresh endpoint's URL matches cookies scoped to its path too.
        let url = parse_url(&self.config.url_for(REFRESH_PATH)).ok()?;
        let header = self.cookies.cookies(&url)?;
        cookie_value(header.to_str().ok()?, &self.config.refresh_cookie_name)
    }
}

/// Value of `name` in a `Cookie` header (`a=1; b=2`). Empty values count as absent.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_url(raw: &str) -> Result<reqwest::Url, ApiError> {
    reqwest::Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

/// Rebuild a multipart form from owned parts; forms are consumed on send,
/// so a replay needs a fresh one.
fn build_form(parts: &[FormPart]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            PartValue::Text(text) => form.text(part.name.clone(), text.clone()),
            PartValue::File { file_name, mime, bytes } => {
                let file = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| ApiError::InvalidHeader(format!("{mime}: {e}")))?;
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
