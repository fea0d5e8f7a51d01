//! Pricing Catalog Domain
//!
//! The catalog is the read-only reference data the ledger prices against:
//!
//! - the ordered set of item names a DC may plan
//! - the **packing mode** of each item (pieces per box)
//! - the **rate per dozen** charged for each item
//!
//! It is loaded once at startup (see [`PricingCatalog::from_file`]) and shared
//! behind an `Arc` for the lifetime of the process. Every lookup for an item
//! outside the catalog fails with [`CatalogError::UnknownItem`]; nothing
//! silently defaults to zero.
//!
//! # Example
//!
//! ```rust
//! use domain_catalog::{CatalogItem, PricingCatalog};
//! use core_kernel::{Currency, ItemName};
//! use rust_decimal_macros::dec;
//!
//! let catalog = PricingCatalog::new(
//!     Currency::INR,
//!     vec![CatalogItem::new(ItemName::parse("Shirt").unwrap(), 6, dec!(100))],
//! ).unwrap();
//!
//! let shirt = ItemName::parse("Shirt").unwrap();
//! assert_eq!(catalog.planned_boxes(&shirt, 5).unwrap(), dec!(10));
//! ```

pub mod catalog;
pub mod loader;
pub mod error;

pub use catalog::{CatalogItem, PricingCatalog, PricedQuantity, DEFAULT_BOX_LABEL};
pub use loader::{CatalogFile, CatalogFileItem};
pub use error::CatalogError;
