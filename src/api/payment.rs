//! Checkout and payment verification.
//!
//! The gateway itself is out of reach here: `create_order` returns the ids
//! a gateway checkout needs, and `verify_payment` hands the gateway's
//! signed result back to the backend.

use serde::{Deserialize, Serialize};

use super::call;
use crate::net::{ApiClient, ApiError, ApiRequest};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub restaurant_id: String,
    pub table_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub coins_to_redeem: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Order created on the backend, with the gateway order to pay against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub order_id: String,
    pub gateway_order_id: String,
    /// Smallest currency unit, as the gateway expects.
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub order_id: String,
    pub status: String,
    #[serde(default)]
    pub coins_earned: u64,
}

/// `POST /payment/create-order`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn create_order(client: &ApiClient, checkout: &CheckoutRequest) -> Result<PaymentOrder, ApiError> {
    let order: PaymentOrder = call(client, ApiRequest::post("/payment/create-order").json(checkout)?).await?;
    tracing::info!(order_id = %order.order_id, amount = order.amount, "payment order created");
    Ok(order)
}

/// `POST /payment/verify`
///
/// # Errors
///
/// [`ApiError::Rejected`] when the signature does not check out.
pub async fn verify_payment(client: &ApiClient, verification: &PaymentVerification) -> Result<PaymentReceipt, ApiError> {
    call(client, ApiRequest::post("/payment/verify").json(verification)?).await
}

#[cfg(test)]
#[path = "payment_test.rs"]
mod tests;
