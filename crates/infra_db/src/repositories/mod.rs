//! Repository implementations for the ledger tables
//!
//! Repositories are stateless. Each method borrows a `PgConnection`, which
//! is either a pooled connection or an open transaction, so the adapter
//! decides where the unit-of-work boundary sits.
//!
//! Queries are checked at runtime (`sqlx::query_as` with `FromRow` rows),
//! so building the workspace does not need a live database.

pub mod challan;
pub mod delivery;
pub mod invoice;

pub use challan::ChallanRepository;
pub use delivery::DeliveryRepository;
pub use invoice::InvoiceRepository;
