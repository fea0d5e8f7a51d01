//! Delivery records and the over-delivery check
//!
//! The ceiling rule lives here as plain functions so that every store runs
//! exactly the same arithmetic inside its own transaction or lock.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{round_quantity, DcNumber, DeliveryId, ItemName};

use crate::error::DeliveryError;

/// A recorded physical delivery against a planned row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: DeliveryId,
    pub dc_number: DcNumber,
    pub item: ItemName,
    pub date: NaiveDate,
    pub boxes: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Builds a new record with a fresh id, normalising `boxes`
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `boxes` is negative
    pub fn new(
        dc_number: DcNumber,
        item: ItemName,
        date: NaiveDate,
        boxes: Decimal,
    ) -> Result<Self, DeliveryError> {
        Ok(Self {
            id: DeliveryId::new(),
            dc_number,
            item,
            date,
            boxes: normalize_boxes(boxes)?,
            recorded_at: Utc::now(),
        })
    }

}

/// Request for recording a delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDeliveryRequest {
    pub dc_number: DcNumber,
    pub item: ItemName,
    pub date: NaiveDate,
    pub boxes: Decimal,
}

/// The natural key a delivery is addressed by on paper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryKey {
    pub dc_number: DcNumber,
    pub item: ItemName,
    pub date: NaiveDate,
}

impl std::fmt::Display for DeliveryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.dc_number, self.item, self.date)
    }
}

/// Replacement values for an existing delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryChange {
    pub boxes: Decimal,
    /// Leaves the date unchanged when `None`
    pub date: Option<NaiveDate>,
}

impl DeliveryChange {
    /// Normalises the new box count
    pub fn normalized(self) -> Result<Self, DeliveryError> {
        Ok(Self {
            boxes: normalize_boxes(self.boxes)?,
            date: self.date,
        })
    }
}

/// Rejects negative counts and rounds to two decimal places
pub fn normalize_boxes(boxes: Decimal) -> Result<Decimal, DeliveryError> {
    if boxes.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if boxes.is_sign_negative() {
        return Err(DeliveryError::validation(format!(
            "Delivered boxes must not be negative, got {boxes}"
        )));
    }
    Ok(round_quantity(boxes))
}

/// Checks that adding `incoming` boxes keeps the pair within its plan
///
/// `already_delivered` must exclude any record being replaced. Returns the
/// new cumulative total.
///
/// # Errors
///
/// Returns `OverDelivery` with the would-be total and the planned boxes
pub fn ensure_within_plan(
    planned: Decimal,
    already_delivered: Decimal,
    incoming: Decimal,
) -> Result<Decimal, DeliveryError> {
    let Some(attempted) = already_delivered.checked_add(incoming) else {
        return Err(DeliveryError::OverDelivery {
            attempted: Decimal::MAX,
            allowed: planned,
        });
    };
    if attempted > planned {
        return Err(DeliveryError::OverDelivery {
            attempted,
            allowed: planned,
        });
    }
    Ok(attempted)
}

/// Checks that a re-planned row still covers what was already delivered
pub fn ensure_plan_covers(new_planned: Decimal, delivered: Decimal) -> Result<(), DeliveryError> {
    if delivered > new_planned {
        return Err(DeliveryError::OverDelivery {
            attempted: delivered,
            allowed: new_planned,
        });
    }
    Ok(())
}

/// Picks the single record matching a natural key
///
/// # Errors
///
/// - `NotFound` when nothing matches
/// - `AmbiguousDelivery` when several records match
pub fn resolve_unique(
    key: &DeliveryKey,
    mut matches: Vec<DeliveryRecord>,
) -> Result<DeliveryRecord, DeliveryError> {
    match matches.len() {
        0 => Err(DeliveryError::not_found("Delivery", key)),
        1 => Ok(matches.remove(0)),
        count => Err(DeliveryError::AmbiguousDelivery {
            key: key.to_string(),
            count,
            candidates: matches.into_iter().map(|record| record.id).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn key() -> DeliveryKey {
        DeliveryKey {
            dc_number: DcNumber::parse("DC001").unwrap(),
            item: ItemName::parse("A").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        }
    }

    fn record() -> DeliveryRecord {
        let key = key();
        DeliveryRecord::new(key.dc_number, key.item, key.date, dec!(2)).unwrap()
    }

    #[test]
    fn test_within_plan_returns_total() {
        assert_eq!(ensure_within_plan(dec!(10), dec!(4), dec!(6)), Ok(dec!(10)));
    }

    #[test]
    fn test_over_plan_rejected() {
        assert_eq!(
            ensure_within_plan(dec!(10), dec!(4), dec!(7)),
            Err(DeliveryError::OverDelivery {
                attempted: dec!(11),
                allowed: dec!(10),
            })
        );
    }

    #[test]
    fn test_overflowing_total_rejected() {
        assert_eq!(
            ensure_within_plan(dec!(10), dec!(4), Decimal::MAX),
            Err(DeliveryError::OverDelivery {
                attempted: Decimal::MAX,
                allowed: dec!(10),
            })
        );
    }

    #[test]
    fn test_replan_below_delivered_rejected() {
        assert!(ensure_plan_covers(dec!(10), dec!(10)).is_ok());
        assert!(matches!(
            ensure_plan_covers(dec!(8), dec!(10)),
            Err(DeliveryError::OverDelivery { .. })
        ));
    }

    #[test]
    fn test_normalize_boxes() {
        assert_eq!(normalize_boxes(dec!(2.345)), Ok(dec!(2.35)));
        assert_eq!(normalize_boxes(dec!(0)), Ok(dec!(0)));
        assert!(normalize_boxes(dec!(-1)).is_err());
    }

    #[test]
    fn test_resolve_unique() {
        let only = record();
        assert_eq!(resolve_unique(&key(), vec![only.clone()]), Ok(only));

        assert!(resolve_unique(&key(), vec![]).unwrap_err().is_not_found());

        let err = resolve_unique(&key(), vec![record(), record()]).unwrap_err();
        match err {
            DeliveryError::AmbiguousDelivery { count, candidates, .. } => {
                assert_eq!(count, 2);
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
