use super::*;
use crate::message::Response;
use crate::message::ResponseCode;

const SECOND: u64 = 1_000_000_000;
const MAX_SEQ: u32 = (1 << 24) - 1;

#[test]
fn test_higher_sequence_is_fresher() {
    let current = NotificationOrder::new(Some(10), 5 * SECOND);

    assert!(current.is_fresher(11, 5 * SECOND));
    assert!(current.is_fresher(10 + (1 << 23) - 1, 5 * SECOND));
    assert!(!current.is_fresher(10, 5 * SECOND));
    assert!(!current.is_fresher(9, 5 * SECOND));
}

#[test]
fn test_sequence_too_far_ahead_is_stale() {
    let current = NotificationOrder::new(Some(0), SECOND);

    assert!(!current.is_fresher(1 << 23, SECOND));
}

#[test]
fn test_wraparound_is_forward_progress() {
    let current = NotificationOrder::new(Some(MAX_SEQ), 100 * SECOND);
    assert!(current.is_fresher(0, 100 * SECOND + 1));

    let current = NotificationOrder::new(Some(0), 100 * SECOND);
    assert!(!current.is_fresher(MAX_SEQ, 100 * SECOND + 1));
}

#[test]
fn test_staleness_overrides_sequence() {
    let current = NotificationOrder::new(Some(1000), 10 * SECOND);

    assert!(!current.is_fresher(999, 10 * SECOND + 128 * SECOND));
    assert!(current.is_fresher(999, 10 * SECOND + 128 * SECOND + 1));
    assert!(current.is_fresher(0, 10 * SECOND + 500 * SECOND));
}

#[test]
fn test_earlier_timestamp_does_not_underflow() {
    let current = NotificationOrder::new(Some(1000), 500 * SECOND);

    assert!(!current.is_fresher(999, 0));
}

#[test]
fn test_extreme_timestamps_are_exact() {
    let current = NotificationOrder::new(Some(5), u64::MAX - 10);
    assert!(!current.is_fresher(4, u64::MAX));

    let current = NotificationOrder::new(Some(5), 0);
    assert!(current.is_fresher(4, u64::MAX));
}

#[test]
fn test_sequence_is_masked_to_24_bits() {
    let current = NotificationOrder::new(Some((1 << 24) + 3), SECOND);

    assert_eq!(current.sequence(), Some(3));
    assert!(current.is_fresher((1 << 25) + 4, SECOND));
}

#[test]
fn test_final_response_is_always_new() {
    let current = NotificationOrder::new(Some(42), 10 * SECOND);
    let final_response = Response::new(ResponseCode::NotFound);

    assert!(current.is_new(&final_response, 10 * SECOND));
}

#[test]
fn test_notification_response_is_ordered() {
    let current = NotificationOrder::new(Some(42), 10 * SECOND);

    let older = Response::new(ResponseCode::Content);
    older.set_observe(41);
    assert!(!current.is_new(&older, 11 * SECOND));

    let newer = Response::new(ResponseCode::Content);
    newer.set_observe(43);
    assert!(current.is_new(&newer, 11 * SECOND));
}

#[test]
fn test_order_without_sequence_accepts_any_notification() {
    let current = NotificationOrder::new(None, 10 * SECOND);
    let candidate = NotificationOrder::new(Some(0), 10 * SECOND);

    assert!(current.is_newer(&candidate));
}
