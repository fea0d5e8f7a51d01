//! Delivery challans and their planned rows

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DcNumber, ItemName};
use domain_catalog::PricingCatalog;

use crate::error::DeliveryError;

/// One planned line of a challan
///
/// `boxes` is derived from `dozens` through the catalog's packing mode at the
/// time the row is written and is never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcRow {
    pub item: ItemName,
    pub dozens: u32,
    pub boxes: Decimal,
}

impl DcRow {
    /// Prices a planned row against the catalog
    ///
    /// # Errors
    ///
    /// - `UnknownItem` if the item is not in the catalog
    /// - `Validation` if `dozens` is zero
    pub fn planned(
        catalog: &PricingCatalog,
        item: ItemName,
        dozens: u32,
    ) -> Result<Self, DeliveryError> {
        if dozens == 0 {
            return Err(DeliveryError::validation(format!(
                "Planned dozens for {item} must be positive"
            )));
        }
        let boxes = catalog.planned_boxes(&item, dozens)?;
        Ok(Self { item, dozens, boxes })
    }
}

/// A delivery challan with its planned rows in entry order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcEntry {
    pub dc_number: DcNumber,
    pub created_at: DateTime<Utc>,
    pub rows: Vec<DcRow>,
}

impl DcEntry {
    /// Returns the planned row for an item
    pub fn row(&self, item: &ItemName) -> Option<&DcRow> {
        self.rows.iter().find(|row| &row.item == item)
    }

    /// Total planned boxes across all rows
    pub fn planned_boxes(&self) -> Decimal {
        self.rows.iter().map(|row| row.boxes).sum()
    }

    pub fn summary(&self) -> DcSummary {
        DcSummary {
            dc_number: self.dc_number.clone(),
            created_at: self.created_at,
            item_count: self.rows.len(),
        }
    }
}

/// Listing view of a challan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcSummary {
    pub dc_number: DcNumber,
    pub created_at: DateTime<Utc>,
    pub item_count: usize,
}

/// An item and planned dozens as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLine {
    pub item: ItemName,
    pub dozens: u32,
}

/// Request for creating a challan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChallanRequest {
    pub dc_number: DcNumber,
    pub lines: Vec<PlannedLine>,
}

impl CreateChallanRequest {
    pub fn new(dc_number: DcNumber) -> Self {
        Self {
            dc_number,
            lines: Vec::new(),
        }
    }

    /// Adds a planned line
    pub fn with_line(mut self, item: ItemName, dozens: u32) -> Self {
        self.lines.push(PlannedLine { item, dozens });
        self
    }

    /// Validates the request and prices every line
    ///
    /// # Errors
    ///
    /// - `Validation` if there are no lines, an item repeats, or dozens is zero
    /// - `UnknownItem` if an item is not in the catalog
    pub fn into_entry(
        self,
        catalog: &PricingCatalog,
        created_at: DateTime<Utc>,
    ) -> Result<DcEntry, DeliveryError> {
        if self.lines.is_empty() {
            return Err(DeliveryError::validation(format!(
                "Challan {} has no planned items",
                self.dc_number
            )));
        }

        let mut rows: Vec<DcRow> = Vec::with_capacity(self.lines.len());
        for line in self.lines {
            if rows.iter().any(|row| row.item == line.item) {
                return Err(DeliveryError::validation(format!(
                    "Item {} appears more than once on challan {}",
                    line.item, self.dc_number
                )));
            }
            rows.push(DcRow::planned(catalog, line.item, line.dozens)?);
        }

        Ok(DcEntry {
            dc_number: self.dc_number,
            created_at,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use domain_catalog::CatalogItem;
    use rust_decimal_macros::dec;

    fn item(name: &str) -> ItemName {
        ItemName::parse(name).unwrap()
    }

    fn catalog() -> PricingCatalog {
        PricingCatalog::new(
            Currency::INR,
            vec![
                CatalogItem::new(item("A"), 6, dec!(100)),
                CatalogItem::new(item("B"), 10, dec!(50)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_are_priced_in_entry_order() {
        let entry = CreateChallanRequest::new(DcNumber::parse("DC001").unwrap())
            .with_line(item("B"), 7)
            .with_line(item("A"), 5)
            .into_entry(&catalog(), Utc::now())
            .unwrap();

        assert_eq!(entry.rows[0].item, item("B"));
        assert_eq!(entry.rows[0].boxes, dec!(8.40));
        assert_eq!(entry.rows[1].boxes, dec!(10));
        assert_eq!(entry.planned_boxes(), dec!(18.40));
    }

    #[test]
    fn test_repeated_item_rejected() {
        let result = CreateChallanRequest::new(DcNumber::parse("DC001").unwrap())
            .with_line(item("A"), 1)
            .with_line(item("A"), 2)
            .into_entry(&catalog(), Utc::now());

        assert!(matches!(result, Err(DeliveryError::Validation(_))));
    }

    #[test]
    fn test_empty_challan_rejected() {
        let result = CreateChallanRequest::new(DcNumber::parse("DC001").unwrap())
            .into_entry(&catalog(), Utc::now());
        assert!(matches!(result, Err(DeliveryError::Validation(_))));
    }

    #[test]
    fn test_zero_dozens_rejected() {
        let result = DcRow::planned(&catalog(), item("A"), 0);
        assert!(matches!(result, Err(DeliveryError::Validation(_))));
    }

    #[test]
    fn test_unknown_item_rejected() {
        let result = DcRow::planned(&catalog(), item("Z"), 3);
        assert_eq!(result, Err(DeliveryError::UnknownItem("Z".to_string())));
    }
}
