//! Delivery Domain Ports
//!
//! [`DeliveryStore`] is everything the registry, ledger and aggregator need
//! from persistence. Two adapters implement it:
//!
//! - **In-memory**: [`crate::adapters::InMemoryDeliveryStore`], one
//!   `tokio::sync::RwLock` around the whole ledger
//! - **PostgreSQL**: `infra_db::adapters::PostgresDeliveryStore`
//!
//! # Atomicity
//!
//! Every method is one unit of work. Methods that check the over-delivery
//! ceiling before writing (`insert_delivery`, `update_delivery`,
//! `update_planned_row`) must run the check and the write under the same
//! lock or transaction, using [`crate::delivery::ensure_within_plan`] and
//! [`crate::delivery::ensure_plan_covers`] for the arithmetic. A failed call
//! leaves no partial state behind.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store: Arc<dyn DeliveryStore> = match config.storage {
//!     StorageBackend::Memory => Arc::new(InMemoryDeliveryStore::new()),
//!     StorageBackend::Postgres => Arc::new(PostgresDeliveryStore::new(pool)),
//! };
//! let ledger = DeliveryLedger::new(store.clone());
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{
    DateRange, DcNumber, DeliveryId, DomainPort, HealthCheckable, InvoiceNumber, ItemName,
};

use crate::challan::{DcEntry, DcRow, DcSummary};
use crate::delivery::{DeliveryChange, DeliveryKey, DeliveryRecord};
use crate::error::DeliveryError;
use crate::invoice::InvoiceBinding;
use crate::status::{ChallanStatus, PendingItem};

/// Persistence port for challans, deliveries and invoices
#[async_trait]
pub trait DeliveryStore: DomainPort + HealthCheckable {
    // ========================================================================
    // Challans
    // ========================================================================

    /// Stores a challan and all its rows
    ///
    /// Fails with `DuplicateEntry` if the number is taken.
    async fn insert_challan(&self, entry: DcEntry) -> Result<DcEntry, DeliveryError>;

    /// Loads a challan with rows in entry order
    async fn get_challan(&self, dc_number: &DcNumber) -> Result<DcEntry, DeliveryError>;

    /// Every challan, ordered by number
    async fn list_challans(&self) -> Result<Vec<DcSummary>, DeliveryError>;

    /// Overwrites the dozens and boxes of an existing row
    ///
    /// Fails with `NotFound` if the row does not exist and with
    /// `OverDelivery` if `row.boxes` is below what is already delivered.
    async fn update_planned_row(
        &self,
        dc_number: &DcNumber,
        row: DcRow,
    ) -> Result<DcRow, DeliveryError>;

    /// Removes a row and its deliveries; returns the number of deliveries removed
    async fn delete_row(&self, dc_number: &DcNumber, item: &ItemName)
        -> Result<u64, DeliveryError>;

    /// Removes a challan, its rows and its deliveries; returns the number of
    /// deliveries removed
    async fn delete_challan(&self, dc_number: &DcNumber) -> Result<u64, DeliveryError>;

    // ========================================================================
    // Deliveries
    // ========================================================================

    /// Checks the ceiling and appends a delivery
    ///
    /// Fails with `UnknownItem` if the (challan, item) pair is not planned
    /// and with `OverDelivery` if the new total would exceed the plan.
    async fn insert_delivery(&self, record: DeliveryRecord)
        -> Result<DeliveryRecord, DeliveryError>;

    /// Replaces the boxes (and optionally the date) of one delivery
    ///
    /// The ceiling is checked against the total of every other delivery for
    /// the pair plus `change.boxes`.
    async fn update_delivery(
        &self,
        id: DeliveryId,
        change: DeliveryChange,
    ) -> Result<DeliveryRecord, DeliveryError>;

    /// Removes one delivery and returns it
    async fn delete_delivery(&self, id: DeliveryId) -> Result<DeliveryRecord, DeliveryError>;

    async fn get_delivery(&self, id: DeliveryId) -> Result<DeliveryRecord, DeliveryError>;

    /// All deliveries sharing a natural key, ordered by id
    async fn find_deliveries(&self, key: &DeliveryKey)
        -> Result<Vec<DeliveryRecord>, DeliveryError>;

    /// Delivery history of one challan ordered by item, date and id
    ///
    /// Fails with `NotFound` if the challan does not exist.
    async fn deliveries_for_challan(
        &self,
        dc_number: &DcNumber,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError>;

    /// Delivered boxes per planned item; items with no deliveries map to zero
    async fn delivered_totals(
        &self,
        dc_number: &DcNumber,
    ) -> Result<BTreeMap<ItemName, Decimal>, DeliveryError>;

    /// Planned rows joined with delivered totals, read as one snapshot
    async fn challan_status(&self, dc_number: &DcNumber) -> Result<ChallanStatus, DeliveryError>;

    /// Every (challan, item) pair with delivered < planned, ordered by
    /// challan number then item name
    async fn pending_items(&self) -> Result<Vec<PendingItem>, DeliveryError>;

    /// Deliveries dated within the range, across all challans
    async fn deliveries_between(&self, range: DateRange)
        -> Result<Vec<DeliveryRecord>, DeliveryError>;

    // ========================================================================
    // Invoices
    // ========================================================================

    /// Stores an invoice binding; fails with `DuplicateInvoice` if the number is taken
    async fn insert_invoice(&self, invoice: InvoiceBinding)
        -> Result<InvoiceBinding, DeliveryError>;

    /// Loads an invoice binding together with the deliveries in its range,
    /// read as one snapshot
    async fn invoice_with_deliveries(
        &self,
        number: &InvoiceNumber,
    ) -> Result<(InvoiceBinding, Vec<DeliveryRecord>), DeliveryError>;

    /// Every invoice binding, ordered by number descending
    async fn list_invoices(&self) -> Result<Vec<InvoiceBinding>, DeliveryError>;
}
