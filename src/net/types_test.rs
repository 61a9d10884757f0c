use super::*;

// =============================================================================
// ApiRequest builders
// =============================================================================

#[test]
fn new_request_is_unauthenticated_and_not_retried() {
    let req = ApiRequest::get("/menu");
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/menu");
    assert!(req.bearer.is_none());
    assert!(!req.with_credentials);
    assert!(!req.retried);
    assert_eq!(req.body, RequestBody::Empty);
}

#[test]
fn json_body_is_captured_as_value() {
    let req = ApiRequest::post("/cart/items")
        .json(&serde_json::json!({ "menuItemId": "m1", "quantity": 2 }))
        .unwrap();
    let RequestBody::Json(value) = &req.body else {
        panic!("expected json body");
    };
    assert_eq!(value["quantity"], 2);
}

#[test]
fn query_pairs_keep_insertion_order() {
    let req = ApiRequest::get("/menu").query("restaurantId", "r1").query("category", "drinks");
    assert_eq!(
        req.query,
        vec![("restaurantId".to_owned(), "r1".to_owned()), ("category".to_owned(), "drinks".to_owned())]
    );
}

#[test]
fn clone_keeps_correlation_id() {
    let req = ApiRequest::delete("/cart");
    let replay = req.clone();
    assert_eq!(req.id, replay.id);
}

#[test]
fn multipart_parts_survive_clone() {
    let req = ApiRequest::patch("/profile").multipart(vec![
        FormPart::text("name", "Asha"),
        FormPart::file("avatar", "me.png", "image/png", vec![1, 2, 3]),
    ]);
    let replay = req.clone();
    assert_eq!(req.body, replay.body);
}

// =============================================================================
// ApiResponse
// =============================================================================

#[test]
fn success_range_is_2xx() {
    assert!(ApiResponse::new(200, "").is_success());
    assert!(ApiResponse::new(204, "").is_success());
    assert!(!ApiResponse::new(301, "").is_success());
    assert!(!ApiResponse::new(401, "").is_success());
}

#[test]
fn message_prefers_json_message_field() {
    let resp = ApiResponse::new(400, r#"{"success":false,"message":"Cart is empty"}"#);
    assert_eq!(resp.message(), "Cart is empty");
}

#[test]
fn message_falls_back_to_error_field() {
    let resp = ApiResponse::new(500, r#"{"error":"boom"}"#);
    assert_eq!(resp.message(), "boom");
}

#[test]
fn message_uses_raw_body_when_not_json() {
    let resp = ApiResponse::new(502, "Bad Gateway");
    assert_eq!(resp.message(), "Bad Gateway");
}

#[test]
fn message_for_empty_body_names_status() {
    let resp = ApiResponse::new(503, "  ");
    assert_eq!(resp.message(), "HTTP 503");
}

#[test]
fn json_decode_error_maps_to_decode() {
    let resp = ApiResponse::new(200, "not json");
    let err = resp.json::<serde_json::Value>().unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
