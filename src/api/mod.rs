//! Resource API modules: typed wrappers over fixed backend paths.
//!
//! DESIGN
//! ======
//! Each module is a set of free functions taking `&ApiClient`, one per
//! endpoint. The backend wraps payloads as `{ success, data, message }`;
//! [`Envelope::into_data`] unwraps that shape so callers only see `T` or an
//! [`ApiError`].

pub mod auth;
pub mod cart;
pub mod coins;
pub mod menu;
pub mod offers;
pub mod payment;
pub mod profile;
pub mod qr;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::net::{ApiClient, ApiError, ApiRequest, FormPart};

/// Standard response wrapper used by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] when `success` is false, [`ApiError::Decode`]
    /// when a successful envelope carries no `data`.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(self.message.unwrap_or_else(|| "request was not successful".to_owned())));
        }
        self.data.ok_or_else(|| ApiError::Decode("response envelope has no data".to_owned()))
    }
}

/// An image attached to a multipart form (signup avatar, profile photo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk, guessing the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
        let mime = match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        };
        Ok(Self { file_name, mime: mime.to_owned(), bytes })
    }

    pub(crate) fn into_part(self, field: &str) -> FormPart {
        FormPart::file(field, self.file_name, self.mime, self.bytes)
    }
}

/// Send `request` and unwrap the enveloped payload.
pub(crate) async fn call<T: DeserializeOwned>(client: &ApiClient, request: ApiRequest) -> Result<T, ApiError> {
    client.send_json::<Envelope<T>>(request).await?.into_data()
}

/// Send `request` where only the envelope's `success` matters.
pub(crate) async fn call_unit(client: &ApiClient, request: ApiRequest) -> Result<(), ApiError> {
    let envelope = client.send_json::<Envelope<serde_json::Value>>(request).await?;
    if envelope.success {
        Ok(())
    } else {
        Err(ApiError::Rejected(envelope.message.unwrap_or_else(|| "request was not successful".to_owned())))
    }
}
