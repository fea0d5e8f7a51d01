//! Derived completion state
//!
//! Nothing here is stored. Completion is recomputed from planned rows and
//! delivered totals on every read.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DateRange, DcNumber, ItemName, Money};
use domain_catalog::PricingCatalog;

use crate::challan::DcEntry;
use crate::delivery::DeliveryRecord;
use crate::error::DeliveryError;

/// Planned versus delivered boxes for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub item: ItemName,
    pub dozens: u32,
    pub planned: Decimal,
    pub delivered: Decimal,
}

impl ItemProgress {
    pub fn remaining(&self) -> Decimal {
        (self.planned - self.delivered).max(Decimal::ZERO)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining().is_zero()
    }
}

/// Completion of a whole challan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallanStatus {
    pub dc_number: DcNumber,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ItemProgress>,
}

impl ChallanStatus {
    /// Joins planned rows with delivered totals; missing totals count as zero
    pub fn from_entry(entry: &DcEntry, delivered: &BTreeMap<ItemName, Decimal>) -> Self {
        let items = entry
            .rows
            .iter()
            .map(|row| ItemProgress {
                item: row.item.clone(),
                dozens: row.dozens,
                planned: row.boxes,
                delivered: delivered.get(&row.item).copied().unwrap_or_default(),
            })
            .collect();

        Self {
            dc_number: entry.dc_number.clone(),
            created_at: entry.created_at,
            items,
        }
    }

    /// A challan is complete once every planned item is fully delivered
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(ItemProgress::is_complete)
    }

    pub fn pending(&self) -> impl Iterator<Item = PendingItem> + '_ {
        self.items
            .iter()
            .filter(|progress| !progress.is_complete())
            .map(|progress| PendingItem {
                dc_number: self.dc_number.clone(),
                item: progress.item.clone(),
                planned: progress.planned,
                delivered: progress.delivered,
                created_at: self.created_at,
            })
    }
}

/// A (challan, item) pair that still has boxes outstanding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingItem {
    pub dc_number: DcNumber,
    pub item: ItemName,
    pub planned: Decimal,
    pub delivered: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Delivered totals for one item over a range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub item: ItemName,
    pub boxes: Decimal,
    pub dozens: Decimal,
    pub amount: Money,
}

/// Activity report for a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeStatistics {
    pub range: DateRange,
    pub total_dozens: Decimal,
    pub total_amount: Money,
    /// Per-item totals in catalog order; items without deliveries are omitted
    pub items: Vec<ItemSummary>,
    /// DCs with at least one delivery in range
    pub challans_delivered: usize,
    pub challans_completed: usize,
    pub challans_pending: usize,
}

impl RangeStatistics {
    /// Aggregates deliveries in `range` and classifies the DCs they belong to
    ///
    /// A DC counts as pending when it appears in `pending`, regardless of
    /// whether the outstanding item was delivered inside the range.
    pub fn compute(
        range: DateRange,
        deliveries: &[DeliveryRecord],
        pending: &[PendingItem],
        catalog: &PricingCatalog,
    ) -> Result<Self, DeliveryError> {
        let mut per_item: BTreeMap<&ItemName, Decimal> = BTreeMap::new();
        let mut challans: BTreeSet<&DcNumber> = BTreeSet::new();
        for record in deliveries.iter().filter(|record| range.contains(record.date)) {
            *per_item.entry(&record.item).or_default() += record.boxes;
            challans.insert(&record.dc_number);
        }

        // Unknown items must fail even if they are not in catalog order
        for item in per_item.keys() {
            catalog.item(item)?;
        }

        let mut items = Vec::with_capacity(per_item.len());
        let mut total_dozens = Decimal::ZERO;
        let mut total_amount = Money::zero(catalog.currency());
        for name in catalog.item_names() {
            let Some(&boxes) = per_item.get(name) else {
                continue;
            };
            let priced = catalog.price(name, boxes)?;
            total_dozens += priced.dozens;
            total_amount = total_amount
                .checked_add(&priced.amount)
                .map_err(|err| DeliveryError::validation(err.to_string()))?;
            items.push(ItemSummary {
                item: name.clone(),
                boxes,
                dozens: priced.dozens,
                amount: priced.amount,
            });
        }

        let pending_dcs: BTreeSet<&DcNumber> = pending.iter().map(|p| &p.dc_number).collect();
        let challans_pending = challans.iter().filter(|dc| pending_dcs.contains(*dc)).count();

        Ok(Self {
            range,
            total_dozens,
            total_amount,
            items,
            challans_delivered: challans.len(),
            challans_completed: challans.len() - challans_pending,
            challans_pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{Currency, DeliveryId};
    use domain_catalog::CatalogItem;
    use rust_decimal_macros::dec;

    use crate::challan::DcRow;

    fn item(name: &str) -> ItemName {
        ItemName::parse(name).unwrap()
    }

    fn dc(number: &str) -> DcNumber {
        DcNumber::parse(number).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn entry() -> DcEntry {
        DcEntry {
            dc_number: dc("DC001"),
            created_at: Utc::now(),
            rows: vec![
                DcRow {
                    item: item("A"),
                    dozens: 5,
                    boxes: dec!(10),
                },
                DcRow {
                    item: item("B"),
                    dozens: 7,
                    boxes: dec!(8.40),
                },
            ],
        }
    }

    fn delivery(number: &str, name: &str, day: u32, boxes: Decimal) -> DeliveryRecord {
        DeliveryRecord {
            id: DeliveryId::new(),
            dc_number: dc(number),
            item: item(name),
            date: date(day),
            boxes,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_counts_missing_totals_as_zero() {
        let delivered = BTreeMap::from([(item("A"), dec!(10))]);
        let status = ChallanStatus::from_entry(&entry(), &delivered);

        assert!(status.items[0].is_complete());
        assert_eq!(status.items[1].delivered, Decimal::ZERO);
        assert_eq!(status.items[1].remaining(), dec!(8.40));
        assert!(!status.is_complete());

        let pending: Vec<_> = status.pending().collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].item, item("B"));
    }

    #[test]
    fn test_status_complete_when_all_delivered() {
        let delivered = BTreeMap::from([(item("A"), dec!(10)), (item("B"), dec!(8.40))]);
        let status = ChallanStatus::from_entry(&entry(), &delivered);
        assert!(status.is_complete());
        assert_eq!(status.pending().count(), 0);
    }

    #[test]
    fn test_range_statistics() {
        let catalog = PricingCatalog::new(
            Currency::INR,
            vec![
                CatalogItem::new(item("A"), 6, dec!(100)),
                CatalogItem::new(item("B"), 10, dec!(50)),
            ],
        )
        .unwrap();
        let deliveries = vec![
            delivery("DC001", "A", 2, dec!(4)),
            delivery("DC001", "A", 3, dec!(6)),
            delivery("DC002", "B", 3, dec!(6)),
            delivery("DC003", "B", 28, dec!(1)),
        ];
        let pending = vec![PendingItem {
            dc_number: dc("DC002"),
            item: item("B"),
            planned: dec!(8.40),
            delivered: dec!(6),
            created_at: Utc::now(),
        }];
        let range = DateRange::new(date(1), date(10)).unwrap();

        let stats = RangeStatistics::compute(range, &deliveries, &pending, &catalog).unwrap();

        // A: 10 boxes -> 5.00 dozens -> 500.00; B: 6 boxes -> 5.00 dozens -> 250.00
        assert_eq!(stats.items.len(), 2);
        assert_eq!(stats.total_dozens, dec!(10.00));
        assert_eq!(stats.total_amount.amount(), dec!(750.00));
        assert_eq!(stats.challans_delivered, 2);
        assert_eq!(stats.challans_completed, 1);
        assert_eq!(stats.challans_pending, 1);
    }
}
