//! Persisted record format tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use extstats_core::{StatsRecord, Summary};

use vector_loader::load_raw;

#[test]
fn accepts_camel_case_legacy_names() {
    let rec: StatsRecord = serde_json::from_str(&load_raw("record_legacy_names.json")).unwrap();
    assert_eq!(rec.install_count(), 3);
    assert_eq!(rec.filtered_result_count(), 120);
    assert_eq!(rec.last_updated(), 1_700_000_000_000);
    assert!(rec.has_client("b"));
}

#[test]
fn accepts_snake_case_names() {
    let rec: StatsRecord = serde_json::from_str(&load_raw("record_snake_names.json")).unwrap();
    // install count follows the client set, not the stored number
    assert_eq!(rec.install_count(), 2);
    assert_eq!(rec.filtered_result_count(), 7);
    assert_eq!(rec.last_updated(), 1_700_000_000_123);
}

#[test]
fn missing_fields_default_to_zero() {
    let rec: StatsRecord = serde_json::from_str("{}").unwrap();
    assert_eq!(rec, StatsRecord::new());
    assert_eq!(rec.summary(), Summary::default());
}

#[test]
fn serialize_then_reload_keeps_summary() {
    let mut rec = StatsRecord::new();
    rec.record_install("a", 5).unwrap();
    rec.record_install("b", 6).unwrap();
    rec.record_filtered(11, 7).unwrap();

    let s = serde_json::to_string(&rec).unwrap();
    assert!(s.contains("\"installCount\":2"));
    assert!(s.contains("\"clients\":[\"a\",\"b\"]"));

    let back: StatsRecord = serde_json::from_str(&s).unwrap();
    assert_eq!(back.summary(), rec.summary());
    assert_eq!(back, rec);
}

#[test]
fn summary_never_carries_clients() {
    let mut rec = StatsRecord::new();
    rec.record_install("secret-client-id", 1).unwrap();
    let v = serde_json::to_value(rec.summary()).unwrap();
    let obj = v.as_object().unwrap();
    assert_eq!(obj.len(), 3);
    assert!(obj.get("clients").is_none());
    assert!(!v.to_string().contains("secret-client-id"));
    assert_eq!(v["installCount"], 1);
    assert_eq!(v["filteredResultCount"], 0);
    assert_eq!(v["lastUpdated"], 1);
}
