//! Loyalty-coin endpoints.

use serde::{Deserialize, Serialize};

use super::call;
use crate::net::{ApiClient, ApiError, ApiRequest};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub balance: u64,
    /// Currency value of one coin.
    #[serde(default)]
    pub coin_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinTxKind {
    Earned,
    Redeemed,
    Expired,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinTransaction {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CoinTxKind,
    pub amount: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    pub created_at: String,
}

/// What redeeming a given number of coins would be worth on a bill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionPreview {
    pub coins: u64,
    pub discount: f64,
    pub remaining_balance: u64,
}

/// `GET /coins/balance`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn balance(client: &ApiClient) -> Result<CoinBalance, ApiError> {
    call(client, ApiRequest::get("/coins/balance")).await
}

/// `GET /coins/history`, newest first.
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn history(client: &ApiClient) -> Result<Vec<CoinTransaction>, ApiError> {
    call(client, ApiRequest::get("/coins/history")).await
}

/// `POST /coins/preview`
///
/// # Errors
///
/// [`ApiError::Rejected`] when the amount exceeds the balance or the
/// redemption cap.
pub async fn preview_redemption(client: &ApiClient, coins: u64) -> Result<RedemptionPreview, ApiError> {
    let request = ApiRequest::post("/coins/preview").json(&serde_json::json!({ "coins": coins }))?;
    call(client, request).await
}

#[cfg(test)]
#[path = "coins_test.rs"]
mod tests;
