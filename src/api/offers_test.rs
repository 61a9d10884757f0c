use super::*;
use crate::net::test_helpers::{MockTransport, client_with};
use crate::net::{Method, RequestBody};

fn offer(kind: DiscountKind, value: f64, min: f64, cap: Option<f64>) -> Offer {
    Offer {
        id: "o1".into(),
        code: "WELCOME".into(),
        title: "Welcome".into(),
        description: None,
        discount_type: kind,
        discount_value: value,
        min_order_value: min,
        max_discount: cap,
    }
}

#[test]
fn percentage_discount_respects_cap() {
    let o = offer(DiscountKind::Percentage, 20.0, 0.0, Some(50.0));
    assert!((o.discount_for(100.0) - 20.0).abs() < 1e-9);
    assert!((o.discount_for(1_000.0) - 50.0).abs() < 1e-9);
}

#[test]
fn below_minimum_gives_nothing() {
    let o = offer(DiscountKind::Flat, 75.0, 300.0, None);
    assert!(o.discount_for(299.0).abs() < 1e-9);
    assert!((o.discount_for(300.0) - 75.0).abs() < 1e-9);
}

#[test]
fn flat_discount_never_exceeds_subtotal() {
    let o = offer(DiscountKind::Flat, 500.0, 0.0, None);
    assert!((o.discount_for(120.0) - 120.0).abs() < 1e-9);
}

#[tokio::test]
async fn apply_coupon_trims_code() {
    let body = serde_json::json!({ "success": true, "data": { "code": "WELCOME", "discount": 50.0 } });
    let transport = MockTransport::new().route(&Method::POST, "/offers/apply", 200, body);
    let (client, transport) = client_with(transport, Some("tok1"));

    let applied = apply_coupon(&client, "  WELCOME ", 400.0).await.unwrap();
    assert_eq!(applied.code, "WELCOME");

    let RequestBody::Json(sent) = &transport.calls()[0].body else {
        panic!("expected json body");
    };
    assert_eq!(sent, &serde_json::json!({ "code": "WELCOME", "subtotal": 400.0 }));
}

#[tokio::test]
async fn empty_code_is_rejected_locally() {
    let (client, transport) = client_with(MockTransport::new(), Some("tok1"));
    let err = apply_coupon(&client, "   ", 400.0).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn expired_coupon_is_rejected() {
    let body = serde_json::json!({ "success": false, "message": "Coupon expired" });
    let transport = MockTransport::new().route(&Method::POST, "/offers/apply", 200, body);
    let (client, _transport) = client_with(transport, Some("tok1"));

    let err = apply_coupon(&client, "OLD", 400.0).await.unwrap_err();
    assert_eq!(err, ApiError::Rejected("Coupon expired".into()));
}
