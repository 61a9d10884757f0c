//! Request/response values passed between the client and its transport.
//!
//! DESIGN
//! ======
//! Requests are plain owned data (including multipart parts) so the same
//! request can be replayed after a token refresh. The transport turns them
//! into wire requests on every send.

use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;

pub use reqwest::Method;

// =============================================================================
// REQUEST BODY
// =============================================================================

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// One field of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File { file_name: String, mime: String, bytes: Vec<u8> },
}

impl FormPart {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: PartValue::Text(value.into()) }
    }

    #[must_use]
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), value: PartValue::File { file_name: file_name.into(), mime: mime.into(), bytes } }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// An outgoing API call, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Correlation id for logs; stays the same across a replay.
    pub id: Uuid,
    pub method: Method,
    /// Path below the base URL, e.g. `/cart/items`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Access token to send as `Authorization: Bearer`. Filled in by the client.
    pub bearer: Option<String>,
    /// Send with cookies (the refresh-token cookie).
    pub with_credentials: bool,
    /// Set once the request has been replayed after a refresh.
    pub retried: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            bearer: None,
            with_credentials: false,
            retried: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the value cannot be serialized.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_credentials(mut self) -> Self {
        self.with_credentials = true;
        self
    }

    #[must_use]
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// A response that reached the client, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(ApiError::from)
    }

    /// Human-readable failure message: the body's `message` (or `error`)
    /// field when it is JSON, otherwise the raw body.
    #[must_use]
    pub fn message(&self) -> String {
        let parsed = serde_json::from_str::<serde_json::Value>(&self.body).ok();
        let field = parsed.as_ref().and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(serde_json::Value::as_str)
        });
        match field {
            Some(message) => message.to_owned(),
            None if self.body.trim().is_empty() => format!("HTTP {}", self.status),
            None => self.body.clone(),
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
