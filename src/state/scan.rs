//! Persistence of the last QR-scan result.
//!
//! Only whitelisted fields reach disk: restaurant and table identity plus
//! the scan time. Session tokens and any extra fields the backend adds stay
//! in memory.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::api::qr::ScanResult;

/// Fields of a [`ScanResult`] allowed on disk (camelCase wire names).
pub const PERSISTED_FIELDS: [&str; 4] = ["restaurantId", "restaurantName", "tableId", "tableNumber"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedScan {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub table_id: String,
    pub table_number: String,
    /// Unix milliseconds.
    pub scanned_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ScanStoreError {
    #[error("scan file io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("scan file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reduce a scan result to the whitelisted fields, stamped with `scanned_at`.
///
/// # Errors
///
/// Returns an error if the result cannot be represented as JSON.
pub fn filter_scan(scan: &ScanResult, scanned_at: i64) -> Result<serde_json::Value, ScanStoreError> {
    let serde_json::Value::Object(full) = serde_json::to_value(scan)? else {
        return Ok(serde_json::Value::Null);
    };
    let mut kept: serde_json::Map<String, serde_json::Value> =
        full.into_iter().filter(|(key, _)| PERSISTED_FIELDS.contains(&key.as_str())).collect();
    kept.insert("scannedAt".to_owned(), serde_json::json!(scanned_at));
    Ok(serde_json::Value::Object(kept))
}

/// Write the whitelisted part of `scan` to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save(path: &Path, scan: &ScanResult) -> Result<PersistedScan, ScanStoreError> {
    let filtered = filter_scan(scan, now_ms())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&filtered)?)?;
    Ok(serde_json::from_value(filtered)?)
}

/// Read the last saved scan, if any.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<Option<PersistedScan>, ScanStoreError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Forget the saved scan (leaving the table).
///
/// # Errors
///
/// Returns an error if an existing file cannot be removed.
pub fn clear(path: &Path) -> Result<(), ScanStoreError> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

fn now_ms() -> i64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
