//! Tests for quote identifiers

use core_kernel::QuoteId;
use uuid::Uuid;

#[test]
fn test_new_generates_unique_ids() {
    let id1 = QuoteId::new();
    let id2 = QuoteId::new();
    assert_ne!(id1, id2);
}

#[test]
fn test_new_generates_time_ordered_ids() {
    let id1 = QuoteId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let id2 = QuoteId::new();
    assert!(id1 < id2);
}

#[test]
fn test_uses_uuid_v7() {
    let id = QuoteId::new();
    assert_eq!(id.as_uuid().get_version_num(), 7);
}

#[test]
fn test_parse_accepts_bare_uuid() {
    let uuid = Uuid::now_v7();
    let parsed: QuoteId = uuid.to_string().parse().unwrap();
    assert_eq!(*parsed.as_uuid(), uuid);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("QTE-not-a-uuid".parse::<QuoteId>().is_err());
}

#[test]
fn test_uuid_round_trip() {
    let uuid = Uuid::new_v4();
    let id = QuoteId::from(uuid);
    let back: Uuid = id.into();
    assert_eq!(uuid, back);
}

#[test]
fn test_serializes_as_plain_uuid() {
    let id = QuoteId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
}
