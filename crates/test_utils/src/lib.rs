//! Test Utilities Crate
//!
//! Shared test infrastructure, fixtures, and helpers for the delivery ledger
//! test suite.
//!
//! # Modules
//!
//! - `fixtures`: the standard catalog and fixed codes and dates
//! - `builders`: builders for challan and delivery requests
//! - `database`: PostgreSQL test containers
//! - `assertions`: assertion helpers for ledger types
//! - `generators`: proptest strategies

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
