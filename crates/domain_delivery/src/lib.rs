//! Delivery Ledger Domain
//!
//! Tracks job-work delivery obligations. A delivery challan (DC) plans a
//! number of dozens per item; deliveries are recorded against that plan in
//! boxes; invoices price the deliveries that fall inside a date range.
//!
//! # Components
//!
//! - [`DcRegistry`]: challans and their planned rows
//! - [`DeliveryLedger`]: deliveries, with the ceiling
//!   `sum(delivered boxes) <= planned boxes` enforced per (challan, item)
//! - [`InvoiceAggregator`]: invoice bindings and the statements priced from them
//!
//! All three run against a [`DeliveryStore`]. [`InMemoryDeliveryStore`] ships
//! here; the PostgreSQL store lives in `infra_db`.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use core_kernel::{Currency, DcNumber, ItemName};
//! use domain_catalog::{CatalogItem, PricingCatalog};
//! use domain_delivery::{
//!     CreateChallanRequest, DeliveryEngine, InMemoryDeliveryStore, RecordDeliveryRequest,
//! };
//!
//! # tokio_test_block(async {
//! let shirt = ItemName::parse("Shirt").unwrap();
//! let catalog = PricingCatalog::new(
//!     Currency::INR,
//!     vec![CatalogItem::new(shirt.clone(), 6, dec!(100))],
//! ).unwrap();
//! let engine = DeliveryEngine::new(Arc::new(InMemoryDeliveryStore::new()), Arc::new(catalog));
//!
//! let dc = DcNumber::parse("DC001").unwrap();
//! // 5 dozen shirts packed 6 to a box: 10 boxes planned
//! let request = CreateChallanRequest::new(dc.clone()).with_line(shirt.clone(), 5);
//! engine.registry.create(request).await.unwrap();
//!
//! let over = engine.ledger.record_delivery(RecordDeliveryRequest {
//!     dc_number: dc.clone(),
//!     item: shirt.clone(),
//!     date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
//!     boxes: dec!(11),
//! }).await;
//! assert!(over.is_err());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod adapters;
pub mod aggregator;
pub mod challan;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod ports;
pub mod registry;
pub mod status;

pub use adapters::InMemoryDeliveryStore;
pub use aggregator::InvoiceAggregator;
pub use challan::{CreateChallanRequest, DcEntry, DcRow, DcSummary, PlannedLine};
pub use delivery::{
    ensure_plan_covers, ensure_within_plan, normalize_boxes, DeliveryChange, DeliveryKey,
    DeliveryRecord, RecordDeliveryRequest,
};
pub use engine::DeliveryEngine;
pub use error::DeliveryError;
pub use invoice::{InvoiceBinding, InvoiceLine, InvoiceStatement};
pub use ledger::DeliveryLedger;
pub use ports::DeliveryStore;
pub use registry::DcRegistry;
pub use status::{ChallanStatus, ItemProgress, ItemSummary, PendingItem, RangeStatistics};
