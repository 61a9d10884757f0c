use super::*;
use crate::net::test_helpers::{MockTransport, client_with};
use crate::net::{Method, RequestBody};

#[tokio::test]
async fn scan_posts_token_and_decodes_result() {
    let body = serde_json::json!({
        "success": true,
        "data": {
            "restaurantId": "r1",
            "restaurantName": "Udupi Corner",
            "tableId": "t7",
            "tableNumber": "7",
            "sessionToken": "dining-secret"
        }
    });
    let transport = MockTransport::new().route(&Method::POST, "/qr/scan", 200, body);
    let (client, transport) = client_with(transport, None);

    let result = scan(&client, "qr-abc").await.unwrap();
    assert_eq!(result.table_number, "7");
    assert_eq!(result.session_token.as_deref(), Some("dining-secret"));
    assert!(result.extra.is_empty());

    let RequestBody::Json(sent) = &transport.calls()[0].body else {
        panic!("expected json body");
    };
    assert_eq!(sent, &serde_json::json!({ "qrToken": "qr-abc" }));
}

#[tokio::test]
async fn inactive_table_is_rejected() {
    let body = serde_json::json!({ "success": false, "message": "Table inactive" });
    let transport = MockTransport::new().route(&Method::POST, "/qr/scan", 200, body);
    let (client, _transport) = client_with(transport, None);

    assert_eq!(scan(&client, "qr-old").await.unwrap_err(), ApiError::Rejected("Table inactive".into()));
}

#[test]
fn numeric_table_number_is_accepted() {
    let result: ScanResult = serde_json::from_value(serde_json::json!({
        "restaurantId": "r1",
        "restaurantName": "Udupi Corner",
        "tableId": "t12",
        "tableNumber": 12
    }))
    .unwrap();
    assert_eq!(result.table_number, "12");
    assert!(result.extra.is_empty());
}

#[test]
fn null_table_number_is_rejected() {
    let result = serde_json::from_value::<ScanResult>(serde_json::json!({
        "restaurantId": "r1",
        "restaurantName": "Udupi Corner",
        "tableId": "t12",
        "tableNumber": null
    }));
    assert!(result.is_err());
}
