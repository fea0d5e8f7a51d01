//! Delivery ledger
//!
//! Records physical deliveries against planned rows. The over-delivery
//! ceiling is enforced by the store inside the same lock or transaction as
//! the write; this service normalises input, resolves natural keys and logs.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use core_kernel::{DcNumber, DeliveryId, ItemName};

use crate::delivery::{
    resolve_unique, DeliveryChange, DeliveryKey, DeliveryRecord, RecordDeliveryRequest,
};
use crate::error::DeliveryError;
use crate::ports::DeliveryStore;
use crate::status::{ChallanStatus, PendingItem};

/// Service for recording and correcting deliveries
#[derive(Clone)]
pub struct DeliveryLedger {
    store: Arc<dyn DeliveryStore>,
}

impl DeliveryLedger {
    pub fn new(store: Arc<dyn DeliveryStore>) -> Self {
        Self { store }
    }

    /// Records a delivery if it keeps the pair within its plan
    ///
    /// Nothing is written when the delivery is rejected.
    ///
    /// # Errors
    ///
    /// - `Validation` for negative boxes
    /// - `NotFound` if the challan does not exist
    /// - `UnknownItem` if the item is not planned on the challan
    /// - `OverDelivery` with the would-be total and the planned boxes
    #[instrument(
        skip(self, request),
        fields(dc_number = %request.dc_number, item = %request.item, date = %request.date)
    )]
    pub async fn record_delivery(
        &self,
        request: RecordDeliveryRequest,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let record =
            DeliveryRecord::new(request.dc_number, request.item, request.date, request.boxes)?;
        let record = self
            .store
            .insert_delivery(record)
            .await
            .map_err(log_rejection)?;
        info!(delivery_id = %record.id, boxes = %record.boxes, "Delivery recorded");
        Ok(record)
    }

    /// Corrects the delivery addressed by (challan, item, date)
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing matches the key, `AmbiguousDelivery` when
    /// several records do, otherwise as [`DeliveryLedger::update_delivery_by_id`]
    #[instrument(skip(self, change), fields(key = %key))]
    pub async fn update_delivery(
        &self,
        key: &DeliveryKey,
        change: DeliveryChange,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let target = self.resolve(key).await?;
        self.update_delivery_by_id(target.id, change).await
    }

    /// Replaces the boxes (and optionally the date) of one delivery
    ///
    /// The ceiling is re-checked with the replaced record excluded.
    #[instrument(skip(self, change), fields(delivery_id = %id))]
    pub async fn update_delivery_by_id(
        &self,
        id: DeliveryId,
        change: DeliveryChange,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let change = change.normalized()?;
        let record = self
            .store
            .update_delivery(id, change)
            .await
            .map_err(log_rejection)?;
        info!(boxes = %record.boxes, date = %record.date, "Delivery updated");
        Ok(record)
    }

    /// Deletes the delivery addressed by (challan, item, date)
    ///
    /// Several matching records are rejected rather than all deleted.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn delete_delivery(
        &self,
        key: &DeliveryKey,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let target = self.resolve(key).await?;
        self.delete_delivery_by_id(target.id).await
    }

    #[instrument(skip(self), fields(delivery_id = %id))]
    pub async fn delete_delivery_by_id(
        &self,
        id: DeliveryId,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let record = self.store.delete_delivery(id).await?;
        info!(dc_number = %record.dc_number, item = %record.item, "Delivery deleted");
        Ok(record)
    }

    pub async fn get_delivery(&self, id: DeliveryId) -> Result<DeliveryRecord, DeliveryError> {
        self.store.get_delivery(id).await
    }

    /// Delivery history of one challan ordered by item, date and id
    #[instrument(skip(self), fields(dc_number = %dc_number))]
    pub async fn deliveries(
        &self,
        dc_number: &DcNumber,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let records = self.store.deliveries_for_challan(dc_number).await?;
        debug!(count = records.len(), "Loaded delivery history");
        Ok(records)
    }

    /// Delivered boxes per planned item of a challan
    pub async fn cumulative_delivered(
        &self,
        dc_number: &DcNumber,
    ) -> Result<BTreeMap<ItemName, Decimal>, DeliveryError> {
        self.store.delivered_totals(dc_number).await
    }

    /// Per-item and whole-challan completion
    pub async fn challan_status(
        &self,
        dc_number: &DcNumber,
    ) -> Result<ChallanStatus, DeliveryError> {
        self.store.challan_status(dc_number).await
    }

    /// Every (challan, item) pair with boxes still outstanding
    #[instrument(skip(self))]
    pub async fn pending_items(&self) -> Result<Vec<PendingItem>, DeliveryError> {
        let pending = self.store.pending_items().await?;
        debug!(count = pending.len(), "Computed pending items");
        Ok(pending)
    }

    async fn resolve(&self, key: &DeliveryKey) -> Result<DeliveryRecord, DeliveryError> {
        let matches = self.store.find_deliveries(key).await?;
        resolve_unique(key, matches)
    }
}

fn log_rejection(err: DeliveryError) -> DeliveryError {
    if let DeliveryError::OverDelivery { attempted, allowed } = &err {
        warn!(%attempted, %allowed, "Over-delivery rejected");
    }
    err
}
