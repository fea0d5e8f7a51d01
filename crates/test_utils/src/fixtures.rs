//! Pre-built Test Fixtures
//!
//! A fixed catalog plus helpers for codes and dates, so tests across crates
//! share the same arithmetic.
//!
//! | Item | Packing mode | Rate / dozen |
//! |------|--------------|--------------|
//! | A    | 6            | 100          |
//! | B    | 10           | 50           |
//! | C    | 24           | 100          |

use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Currency, DcNumber, InvoiceNumber, ItemName};
use domain_catalog::{CatalogItem, PricingCatalog};
use domain_delivery::{DeliveryEngine, InMemoryDeliveryStore};

static STANDARD_CATALOG: Lazy<Arc<PricingCatalog>> = Lazy::new(|| {
    Arc::new(
        PricingCatalog::new(
            Currency::INR,
            vec![
                CatalogItem::new(CodeFixtures::item("A"), 6, dec!(100)),
                CatalogItem::new(CodeFixtures::item("B"), 10, dec!(50)),
                CatalogItem::new(CodeFixtures::item("C"), 24, dec!(100)),
            ],
        )
        .expect("standard catalog is valid"),
    )
});

/// Fixture for the pricing catalog
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// The three-item catalog shown in the module docs
    pub fn standard() -> Arc<PricingCatalog> {
        STANDARD_CATALOG.clone()
    }

    /// TOML source equivalent to `standard()`
    pub fn standard_toml() -> &'static str {
        r#"
currency = "INR"

[[items]]
name = "A"
packing_mode = 6
rate_per_dozen = "100"

[[items]]
name = "B"
packing_mode = 10
rate_per_dozen = "50"

[[items]]
name = "C"
packing_mode = 24
rate_per_dozen = "100"
"#
    }
}

/// Fixture for validated codes
pub struct CodeFixtures;

impl CodeFixtures {
    pub fn dc(number: &str) -> DcNumber {
        DcNumber::parse(number).expect("fixture dc number")
    }

    pub fn item(name: &str) -> ItemName {
        ItemName::parse(name).expect("fixture item name")
    }

    pub fn invoice(number: &str) -> InvoiceNumber {
        InvoiceNumber::parse(number).expect("fixture invoice number")
    }
}

/// Fixture for delivery dates
pub struct DateFixtures;

impl DateFixtures {
    /// A day in January 2024
    pub fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).expect("valid January day")
    }

    /// A day in February 2024
    pub fn feb(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).expect("valid February day")
    }
}

/// An engine over a fresh in-memory store and the standard catalog
pub fn memory_engine() -> DeliveryEngine {
    DeliveryEngine::new(Arc::new(InMemoryDeliveryStore::new()), CatalogFixtures::standard())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_box_math() {
        let catalog = CatalogFixtures::standard();
        assert_eq!(catalog.planned_boxes(&CodeFixtures::item("A"), 5).unwrap(), dec!(10.00));
        assert_eq!(catalog.planned_boxes(&CodeFixtures::item("B"), 7).unwrap(), dec!(8.40));
        assert_eq!(catalog.planned_boxes(&CodeFixtures::item("C"), 10).unwrap(), dec!(5.00));
    }

    #[test]
    fn test_toml_matches_standard() {
        let parsed = PricingCatalog::from_toml_str(CatalogFixtures::standard_toml()).unwrap();
        assert_eq!(parsed.items(), CatalogFixtures::standard().items());
    }
}
