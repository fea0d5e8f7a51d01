//! Invoices: date-range bindings and the statements derived from them
//!
//! An [`InvoiceBinding`] only stores a number and a range. Every time an
//! invoice is read the matching deliveries are priced again, so edits to the
//! ledger after the invoice was raised show up in its statement.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DateRange, DcNumber, InvoiceNumber, ItemName, Money};
use domain_catalog::PricingCatalog;

use crate::delivery::DeliveryRecord;
use crate::error::DeliveryError;

/// A stored invoice: number plus inclusive date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBinding {
    pub number: InvoiceNumber,
    pub range: DateRange,
    pub created_at: DateTime<Utc>,
}

impl InvoiceBinding {
    pub fn new(number: InvoiceNumber, range: DateRange) -> Self {
        Self {
            number,
            range,
            created_at: Utc::now(),
        }
    }
}

/// One priced delivery on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub dc_number: DcNumber,
    pub date: NaiveDate,
    pub item: ItemName,
    pub boxes: Decimal,
    pub packing_mode: u32,
    pub dozens: Decimal,
    pub rate: Money,
    pub amount: Money,
}

/// Everything a print or export layer needs to render an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStatement {
    pub number: InvoiceNumber,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub created_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLine>,
    pub total: Money,
}

impl InvoiceStatement {
    /// Prices `deliveries` against the catalog
    ///
    /// Deliveries are sorted by date, DC number, item and id before pricing,
    /// so the caller may pass them in any order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` if a delivered item is missing from the catalog
    pub fn build(
        binding: &InvoiceBinding,
        mut deliveries: Vec<DeliveryRecord>,
        catalog: &PricingCatalog,
    ) -> Result<Self, DeliveryError> {
        deliveries.sort_by(|a, b| {
            (a.date, &a.dc_number, &a.item, a.id).cmp(&(b.date, &b.dc_number, &b.item, b.id))
        });

        let lines = price_lines(&deliveries, catalog)?;
        let total = sum_amounts(&lines, catalog)?;

        Ok(Self {
            number: binding.number.clone(),
            from_date: binding.range.from(),
            to_date: binding.range.to(),
            created_on: binding.created_at.date_naive(),
            created_at: binding.created_at,
            lines,
            total,
        })
    }
}

/// Prices each delivery as one invoice line, preserving order
pub fn price_lines(
    deliveries: &[DeliveryRecord],
    catalog: &PricingCatalog,
) -> Result<Vec<InvoiceLine>, DeliveryError> {
    deliveries
        .iter()
        .map(|record| {
            let priced = catalog.price(&record.item, record.boxes)?;
            Ok(InvoiceLine {
                dc_number: record.dc_number.clone(),
                date: record.date,
                item: record.item.clone(),
                boxes: record.boxes,
                packing_mode: priced.packing_mode,
                dozens: priced.dozens,
                rate: priced.rate,
                amount: priced.amount,
            })
        })
        .collect()
}

fn sum_amounts(lines: &[InvoiceLine], catalog: &PricingCatalog) -> Result<Money, DeliveryError> {
    lines
        .iter()
        .try_fold(Money::zero(catalog.currency()), |total, line| {
            total.checked_add(&line.amount)
        })
        .map_err(|err| DeliveryError::validation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, DeliveryId};
    use domain_catalog::CatalogItem;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(name: &str) -> ItemName {
        ItemName::parse(name).unwrap()
    }

    fn catalog() -> PricingCatalog {
        PricingCatalog::new(
            Currency::INR,
            vec![
                CatalogItem::new(item("A"), 6, dec!(100)),
                CatalogItem::new(item("B"), 10, dec!(42.50)),
                CatalogItem::new(item("C"), 24, dec!(100)),
            ],
        )
        .unwrap()
    }

    fn delivery(dc: &str, name: &str, on: NaiveDate, boxes: Decimal) -> DeliveryRecord {
        DeliveryRecord {
            id: DeliveryId::new(),
            dc_number: DcNumber::parse(dc).unwrap(),
            item: item(name),
            date: on,
            boxes,
            recorded_at: Utc::now(),
        }
    }

    fn january() -> InvoiceBinding {
        InvoiceBinding::new(
            InvoiceNumber::parse("INV-001").unwrap(),
            DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap(),
        )
    }

    #[test]
    fn test_single_line_statement() {
        // 10 boxes of 24 pieces = 240 pieces = 20 dozens
        let statement = InvoiceStatement::build(
            &january(),
            vec![delivery("DC001", "C", date(2024, 1, 15), dec!(10))],
            &catalog(),
        )
        .unwrap();

        assert_eq!(statement.lines.len(), 1);
        assert_eq!(statement.lines[0].dozens, dec!(20.00));
        assert_eq!(statement.lines[0].amount.amount(), dec!(2000.00));
        assert_eq!(statement.total.amount(), dec!(2000.00));
    }

    #[test]
    fn test_lines_sorted_by_date_then_dc() {
        let statement = InvoiceStatement::build(
            &january(),
            vec![
                delivery("DC002", "A", date(2024, 1, 20), dec!(1)),
                delivery("DC002", "A", date(2024, 1, 3), dec!(1)),
                delivery("DC001", "B", date(2024, 1, 20), dec!(1)),
            ],
            &catalog(),
        )
        .unwrap();

        let order: Vec<_> = statement
            .lines
            .iter()
            .map(|line| (line.date.to_string(), line.dc_number.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2024-01-03".to_string(), "DC002".to_string()),
                ("2024-01-20".to_string(), "DC001".to_string()),
                ("2024-01-20".to_string(), "DC002".to_string()),
            ]
        );
    }

    #[test]
    fn test_total_is_sum_of_rounded_lines() {
        // Each B box is 0.83 dozens -> 35.28; three lines total 105.84
        let deliveries = (1..=3)
            .map(|day| delivery("DC001", "B", date(2024, 1, day), dec!(1)))
            .collect();
        let statement = InvoiceStatement::build(&january(), deliveries, &catalog()).unwrap();
        assert_eq!(statement.total.amount(), dec!(105.84));
    }

    #[test]
    fn test_empty_range_totals_zero() {
        let statement = InvoiceStatement::build(&january(), vec![], &catalog()).unwrap();
        assert!(statement.lines.is_empty());
        assert!(statement.total.is_zero());
    }

    #[test]
    fn test_item_missing_from_catalog_fails() {
        let result = InvoiceStatement::build(
            &january(),
            vec![delivery("DC001", "Retired", date(2024, 1, 2), dec!(1))],
            &catalog(),
        );
        assert_eq!(result, Err(DeliveryError::UnknownItem("Retired".to_string())));
    }
}
