//! Cart endpoints.

use serde::{Deserialize, Serialize};

use super::{call, call_unit};
use crate::net::{ApiClient, ApiError, ApiRequest};
use crate::state::cart::{BillLine, BillSummary, Discounts};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Re-derive the bill for display from the cart's own lines.
    #[must_use]
    pub fn bill(&self, discounts: Discounts, gst_rate: f64) -> BillSummary {
        let lines: Vec<BillLine> = self
            .items
            .iter()
            .map(|item| BillLine { unit_price: item.price, quantity: item.quantity })
            .collect();
        BillSummary::compute(&lines, discounts, gst_rate)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub menu_item_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `GET /cart`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn get_cart(client: &ApiClient) -> Result<Cart, ApiError> {
    call(client, ApiRequest::get("/cart")).await
}

/// `POST /cart/items`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn add_item(client: &ApiClient, item: &AddToCart) -> Result<Cart, ApiError> {
    call(client, ApiRequest::post("/cart/items").json(item)?).await
}

/// `PATCH /cart/items/{id}`; a quantity of zero removes the line.
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn update_quantity(client: &ApiClient, item_id: &str, quantity: u32) -> Result<Cart, ApiError> {
    if quantity == 0 {
        return remove_item(client, item_id).await;
    }
    let request = ApiRequest::patch(format!("/cart/items/{item_id}")).json(&serde_json::json!({ "quantity": quantity }))?;
    call(client, request).await
}

/// `DELETE /cart/items/{id}`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn remove_item(client: &ApiClient, item_id: &str) -> Result<Cart, ApiError> {
    call(client, ApiRequest::delete(format!("/cart/items/{item_id}"))).await
}

/// `DELETE /cart`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn clear(client: &ApiClient) -> Result<(), ApiError> {
    call_unit(client, ApiRequest::delete("/cart")).await
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
