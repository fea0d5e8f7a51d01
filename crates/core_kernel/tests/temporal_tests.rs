//! Tests for inclusive date ranges

use chrono::NaiveDate;
use core_kernel::{CoreError, DateRange, TemporalError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_single_day_range() {
    let range = DateRange::new(date(2024, 1, 15), date(2024, 1, 15)).unwrap();
    assert!(range.contains(date(2024, 1, 15)));
    assert!(!range.contains(date(2024, 1, 14)));
    assert!(!range.contains(date(2024, 1, 16)));
}

#[test]
fn test_invalid_range_carries_bounds() {
    let err = DateRange::new(date(2024, 2, 10), date(2024, 2, 1)).unwrap_err();
    assert_eq!(
        err,
        TemporalError::InvalidRange {
            from: date(2024, 2, 10),
            to: date(2024, 2, 1),
        }
    );
    assert!(err.to_string().contains("2024-02-10"));
}

#[test]
fn test_range_across_leap_day() {
    let range = DateRange::new(date(2024, 2, 28), date(2024, 3, 1)).unwrap();
    assert!(range.contains(date(2024, 2, 29)));
}

#[test]
fn test_temporal_error_converts_to_core_error() {
    let err = DateRange::new(date(2024, 2, 10), date(2024, 2, 1)).unwrap_err();
    let core: CoreError = err.into();
    assert!(matches!(core, CoreError::Temporal(_)));
}

#[test]
fn test_range_serialization() {
    let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
    let json = serde_json::to_string(&range).unwrap();
    assert_eq!(json, r#"{"from":"2024-01-01","to":"2024-01-31"}"#);
}
