//! Calendar date ranges
//!
//! Invoices and statistics select deliveries by delivery date. Both ends of a
//! [`DateRange`] are inclusive, matching how billing periods are written on
//! paper ("1 Jan to 31 Jan").

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid range: from {from} must not be after to {to}")]
    InvalidRange {
        from: NaiveDate,
        to: NaiveDate,
    },
}

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a new inclusive range
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::InvalidRange` if `from` is after `to`
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, TemporalError> {
        if from > to {
            return Err(TemporalError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// First day of the range
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day of the range
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Returns true if `date` falls within the range (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = DateRange::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidRange { .. })));
    }
}
