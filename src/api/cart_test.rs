use super::*;
use crate::net::test_helpers::{MockTransport, client_with};
use crate::net::{Method, RequestBody};

fn cart_body(quantity: u32) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": {
            "_id": "c1",
            "items": [
                { "_id": "i1", "menuItemId": "m1", "name": "Masala Dosa", "price": 120.0, "quantity": quantity },
                { "_id": "i2", "menuItemId": "m2", "name": "Filter Coffee", "price": 40.0, "quantity": 1 }
            ]
        }
    })
}

#[tokio::test]
async fn get_cart_decodes_items() {
    let transport = MockTransport::new().route(&Method::GET, "/cart", 200, cart_body(2));
    let (client, _transport) = client_with(transport, Some("tok1"));

    let cart = get_cart(&client).await.unwrap();
    assert_eq!(cart.id.as_deref(), Some("c1"));
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.item_count(), 3);
}

#[tokio::test]
async fn add_item_posts_camel_case_body() {
    let transport = MockTransport::new().route(&Method::POST, "/cart/items", 200, cart_body(1));
    let (client, transport) = client_with(transport, Some("tok1"));

    let item = AddToCart { menu_item_id: "m1".into(), quantity: 1, notes: None };
    add_item(&client, &item).await.unwrap();

    let RequestBody::Json(body) = &transport.calls()[0].body else {
        panic!("expected json body");
    };
    assert_eq!(body, &serde_json::json!({ "menuItemId": "m1", "quantity": 1 }));
}

#[tokio::test]
async fn zero_quantity_removes_line() {
    let transport = MockTransport::new().route(&Method::DELETE, "/cart/items/i1", 200, cart_body(1));
    let (client, transport) = client_with(transport, Some("tok1"));

    update_quantity(&client, "i1", 0).await.unwrap();
    let call = &transport.calls()[0];
    assert_eq!(call.method, Method::DELETE);
    assert_eq!(call.path, "/cart/items/i1");
}

#[tokio::test]
async fn update_quantity_patches_line() {
    let transport = MockTransport::new().route(&Method::PATCH, "/cart/items/i1", 200, cart_body(4));
    let (client, _transport) = client_with(transport, Some("tok1"));

    let cart = update_quantity(&client, "i1", 4).await.unwrap();
    assert_eq!(cart.items[0].quantity, 4);
}

#[tokio::test]
async fn clear_reports_rejection() {
    let body = serde_json::json!({ "success": false, "message": "Order already placed" });
    let transport = MockTransport::new().route(&Method::DELETE, "/cart", 200, body);
    let (client, _transport) = client_with(transport, Some("tok1"));

    assert_eq!(clear(&client).await.unwrap_err(), ApiError::Rejected("Order already placed".into()));
}

#[test]
fn bill_uses_cart_lines() {
    let cart: Cart = serde_json::from_value(cart_body(2)["data"].clone()).unwrap();
    let bill = cart.bill(Discounts::default(), 0.05);
    assert!((bill.subtotal - 280.0).abs() < f64::EPSILON);
    assert!((bill.gst - 14.0).abs() < f64::EPSILON);
    assert!((bill.total - 294.0).abs() < f64::EPSILON);
}
