//! The in-memory pricing catalog

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::{boxes_for_dozens, dozens_for_boxes, Currency, ItemName, Money};

use crate::error::CatalogError;

/// Column heading used for box quantities when the catalog does not name one
pub const DEFAULT_BOX_LABEL: &str = "Boxes";

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    /// Item name as it appears on challans and invoices
    pub name: ItemName,
    /// Pieces per box
    pub packing_mode: u32,
    /// Rate charged per dozen pieces
    pub rate_per_dozen: Decimal,
}

impl CatalogItem {
    /// Creates a catalog entry
    pub fn new(name: ItemName, packing_mode: u32, rate_per_dozen: Decimal) -> Self {
        Self {
            name,
            packing_mode,
            rate_per_dozen,
        }
    }
}

/// A billable quantity priced against the catalog
///
/// `dozens` and `amount` are already rounded; `amount` is computed from the
/// rounded `dozens` so a printed line always multiplies out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedQuantity {
    pub packing_mode: u32,
    pub dozens: Decimal,
    pub rate: Money,
    pub amount: Money,
}

/// Read-only catalog of items, packing modes and rates
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    currency: Currency,
    box_label: String,
    items: Vec<CatalogItem>,
    index: HashMap<ItemName, usize>,
}

impl PricingCatalog {
    /// Builds a catalog, validating every entry
    ///
    /// # Errors
    ///
    /// - `Empty` if no items are given
    /// - `DuplicateItem` if a name appears twice
    /// - `InvalidPackingMode` for a zero packing mode
    /// - `NegativeRate` for a negative rate
    pub fn new(currency: Currency, items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if item.packing_mode == 0 {
                return Err(CatalogError::InvalidPackingMode(item.name.to_string()));
            }
            if item.rate_per_dozen.is_sign_negative() && !item.rate_per_dozen.is_zero() {
                return Err(CatalogError::NegativeRate(item.name.to_string()));
            }
            if index.insert(item.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateItem(item.name.to_string()));
            }
        }

        Ok(Self {
            currency,
            box_label: DEFAULT_BOX_LABEL.to_string(),
            items,
            index,
        })
    }

    /// Overrides the heading used for box quantities
    pub fn with_box_label(mut self, label: impl Into<String>) -> Self {
        self.box_label = label.into();
        self
    }

    /// Currency of every rate in the catalog
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Heading for box quantities on reports
    pub fn box_label(&self) -> &str {
        &self.box_label
    }

    /// Item names in catalog order
    pub fn item_names(&self) -> impl Iterator<Item = &ItemName> {
        self.items.iter().map(|item| &item.name)
    }

    /// All entries in catalog order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Returns true if the item is in the catalog
    pub fn contains(&self, item: &ItemName) -> bool {
        self.index.contains_key(item)
    }

    /// Looks up an entry
    pub fn item(&self, item: &ItemName) -> Result<&CatalogItem, CatalogError> {
        self.index
            .get(item)
            .map(|&position| &self.items[position])
            .ok_or_else(|| CatalogError::UnknownItem(item.to_string()))
    }

    /// Pieces per box for an item
    pub fn packing_mode(&self, item: &ItemName) -> Result<u32, CatalogError> {
        self.item(item).map(|entry| entry.packing_mode)
    }

    /// Rate per dozen for an item
    pub fn rate_per_dozen(&self, item: &ItemName) -> Result<Money, CatalogError> {
        self.item(item)
            .map(|entry| Money::new(entry.rate_per_dozen, self.currency))
    }

    /// Planned boxes for `dozens` of an item: `round(dozens * 12 / packing_mode, 2)`
    pub fn planned_boxes(&self, item: &ItemName, dozens: u32) -> Result<Decimal, CatalogError> {
        let packing_mode = self.packing_mode(item)?;
        boxes_for_dozens(dozens, packing_mode)
            .ok_or_else(|| CatalogError::InvalidPackingMode(item.to_string()))
    }

    /// Prices a number of delivered boxes
    pub fn price(&self, item: &ItemName, boxes: Decimal) -> Result<PricedQuantity, CatalogError> {
        let entry = self.item(item)?;
        let dozens = dozens_for_boxes(boxes, entry.packing_mode);
        let rate = Money::new(entry.rate_per_dozen, self.currency);
        let amount = rate.multiply(dozens).round_to_currency();

        Ok(PricedQuantity {
            packing_mode: entry.packing_mode,
            dozens,
            rate,
            amount,
        })
    }
}
