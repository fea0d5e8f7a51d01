//! Core Kernel - Foundational types for the job-work delivery ledger
//!
//! This crate provides the building blocks shared by every other crate:
//! - Quantity conversions between dozens and boxes with one rounding rule
//! - Money types with precise decimal arithmetic
//! - Inclusive calendar date ranges
//! - Strongly-typed identifiers and document numbers
//! - Port marker traits and health checks for storage adapters

pub mod quantity;
pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use quantity::{
    round_quantity, boxes_for_dozens, dozens_for_boxes,
    PIECES_PER_DOZEN, QUANTITY_DECIMAL_PLACES,
};
pub use money::{Money, Currency, MoneyError};
pub use temporal::{DateRange, TemporalError};
pub use identifiers::{DeliveryId, DcNumber, InvoiceNumber, ItemName};
pub use ports::{DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
