//! Offers and coupons.

use serde::{Deserialize, Serialize};

use super::call;
use crate::net::{ApiClient, ApiError, ApiRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(alias = "_id")]
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountKind,
    pub discount_value: f64,
    #[serde(default)]
    pub min_order_value: f64,
    #[serde(default)]
    pub max_discount: Option<f64>,
}

impl Offer {
    /// Discount this offer gives on `subtotal`, or zero below the minimum.
    #[must_use]
    pub fn discount_for(&self, subtotal: f64) -> f64 {
        if subtotal < self.min_order_value {
            return 0.0;
        }
        let raw = match self.discount_type {
            DiscountKind::Percentage => subtotal * self.discount_value / 100.0,
            DiscountKind::Flat => self.discount_value,
        };
        let capped = self.max_discount.map_or(raw, |cap| raw.min(cap));
        capped.clamp(0.0, subtotal.max(0.0))
    }
}

/// Backend's verdict on a coupon for a given subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: f64,
    #[serde(default)]
    pub final_amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyCoupon<'a> {
    code: &'a str,
    subtotal: f64,
}

/// `GET /offers/{restaurant_id}`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn list_offers(client: &ApiClient, restaurant_id: &str) -> Result<Vec<Offer>, ApiError> {
    call(client, ApiRequest::get(format!("/offers/{restaurant_id}"))).await
}

/// `POST /offers/apply`
///
/// # Errors
///
/// [`ApiError::Rejected`] for expired codes or an order below the minimum.
pub async fn apply_coupon(client: &ApiClient, code: &str, subtotal: f64) -> Result<AppliedCoupon, ApiError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ApiError::Rejected("coupon code is empty".to_owned()));
    }
    let request = ApiRequest::post("/offers/apply").json(&ApplyCoupon { code, subtotal })?;
    call(client, request).await
}

#[cfg(test)]
#[path = "offers_test.rs"]
mod tests;
