use super::*;

fn scan_result() -> ScanResult {
    serde_json::from_value(serde_json::json!({
        "restaurantId": "r1",
        "restaurantName": "Udupi Corner",
        "tableId": "t7",
        "tableNumber": "7",
        "sessionToken": "dining-secret",
        "waiterPhone": "9000000000"
    }))
    .unwrap()
}

fn temp_path() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("tableside-scan-{}.json", uuid::Uuid::new_v4()))
}

#[test]
fn scan_result_keeps_unknown_fields_in_memory() {
    let scan = scan_result();
    assert_eq!(scan.session_token.as_deref(), Some("dining-secret"));
    assert_eq!(scan.extra["waiterPhone"], "9000000000");
}

#[test]
fn filter_keeps_only_whitelisted_fields() {
    let filtered = filter_scan(&scan_result(), 42).unwrap();
    let object = filtered.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["restaurantId", "restaurantName", "scannedAt", "tableId", "tableNumber"]);
    assert_eq!(object["scannedAt"], 42);
}

#[test]
fn save_then_load_returns_persisted_subset() {
    let path = temp_path();
    let saved = save(&path, &scan_result()).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("dining-secret"));
    assert!(!raw.contains("waiterPhone"));

    let loaded = load(&path).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.table_number, "7");
    assert!(loaded.scanned_at > 0);

    clear(&path).unwrap();
    assert!(load(&path).unwrap().is_none());
}

#[test]
fn clear_missing_file_is_ok() {
    assert!(clear(&temp_path()).is_ok());
}
