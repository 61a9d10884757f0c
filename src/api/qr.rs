//! QR-scan endpoint: resolves a table's QR token to restaurant and table.

use serde::{Deserialize, Serialize};

use super::call;
use crate::net::{ApiClient, ApiError, ApiRequest};

/// What a table's QR code resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub table_id: String,
    /// Sent as either a string or a number; kept as text.
    #[serde(deserialize_with = "string_or_number")]
    pub table_number: String,
    /// Short-lived dining-session token issued for this table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// Anything else the backend sends; kept in memory, never persisted.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn string_or_number<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

/// `POST /qr/scan`
///
/// # Errors
///
/// [`ApiError::Rejected`] for unknown or inactive tables, or any transport error.
pub async fn scan(client: &ApiClient, qr_token: &str) -> Result<ScanResult, ApiError> {
    let request = ApiRequest::post("/qr/scan").json(&serde_json::json!({ "qrToken": qr_token }))?;
    let result: ScanResult = call(client, request).await?;
    tracing::info!(restaurant_id = %result.restaurant_id, table = %result.table_number, "table scanned");
    Ok(result)
}

#[cfg(test)]
#[path = "qr_test.rs"]
mod tests;
