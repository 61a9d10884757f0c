//! Menu endpoints. Public reads; the client still attaches a token when it
//! has one.

use serde::{Deserialize, Serialize};

use super::call;
use crate::net::{ApiClient, ApiError, ApiRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_veg: bool,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub item_count: u32,
}

/// `GET /menu/{restaurant_id}`, optionally narrowed to one category.
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn list_menu(client: &ApiClient, restaurant_id: &str, category: Option<&str>) -> Result<Vec<MenuItem>, ApiError> {
    let mut request = ApiRequest::get(format!("/menu/{restaurant_id}"));
    if let Some(category) = category {
        request = request.query("category", category);
    }
    call(client, request).await
}

/// `GET /menu/items/{id}`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn get_item(client: &ApiClient, item_id: &str) -> Result<MenuItem, ApiError> {
    call(client, ApiRequest::get(format!("/menu/items/{item_id}"))).await
}

/// `GET /menu/{restaurant_id}/categories`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn categories(client: &ApiClient, restaurant_id: &str) -> Result<Vec<Category>, ApiError> {
    call(client, ApiRequest::get(format!("/menu/{restaurant_id}/categories"))).await
}

#[cfg(test)]
#[path = "menu_test.rs"]
mod tests;
