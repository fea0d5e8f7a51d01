//! In-memory delivery store
//!
//! The whole ledger sits behind one `tokio::sync::RwLock`. Writers hold the
//! write guard from the ceiling check through the mutation, so two
//! concurrent deliveries against the same pair can never both pass the check.
//! Readers take the read guard and see a consistent snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{
    DateRange, DcNumber, DeliveryId, DomainPort, HealthCheckResult, HealthCheckable,
    InvoiceNumber, ItemName,
};

use crate::challan::{DcEntry, DcRow, DcSummary};
use crate::delivery::{
    ensure_plan_covers, ensure_within_plan, DeliveryChange, DeliveryKey, DeliveryRecord,
};
use crate::error::DeliveryError;
use crate::invoice::InvoiceBinding;
use crate::ports::DeliveryStore;
use crate::status::{ChallanStatus, PendingItem};

#[derive(Debug, Default)]
struct LedgerState {
    challans: BTreeMap<DcNumber, DcEntry>,
    deliveries: BTreeMap<DeliveryId, DeliveryRecord>,
    invoices: BTreeMap<InvoiceNumber, InvoiceBinding>,
}

impl LedgerState {
    fn challan(&self, dc_number: &DcNumber) -> Result<&DcEntry, DeliveryError> {
        self.challans
            .get(dc_number)
            .ok_or_else(|| DeliveryError::not_found("Challan", dc_number))
    }

    /// Planned boxes for a pair; an unplanned item is `UnknownItem`
    fn planned_boxes(
        &self,
        dc_number: &DcNumber,
        item: &ItemName,
    ) -> Result<Decimal, DeliveryError> {
        self.challan(dc_number)?
            .row(item)
            .map(|row| row.boxes)
            .ok_or_else(|| {
                DeliveryError::UnknownItem(format!("{item} is not planned on {dc_number}"))
            })
    }

    fn delivered(
        &self,
        dc_number: &DcNumber,
        item: &ItemName,
        excluding: Option<DeliveryId>,
    ) -> Decimal {
        self.deliveries
            .values()
            .filter(|record| &record.dc_number == dc_number && &record.item == item)
            .filter(|record| Some(record.id) != excluding)
            .map(|record| record.boxes)
            .sum()
    }

    fn delivered_totals(&self, entry: &DcEntry) -> BTreeMap<ItemName, Decimal> {
        entry
            .rows
            .iter()
            .map(|row| (row.item.clone(), self.delivered(&entry.dc_number, &row.item, None)))
            .collect()
    }

    fn status(&self, entry: &DcEntry) -> ChallanStatus {
        ChallanStatus::from_entry(entry, &self.delivered_totals(entry))
    }

    fn remove_deliveries(&mut self, keep: impl Fn(&DeliveryRecord) -> bool) -> u64 {
        let before = self.deliveries.len();
        self.deliveries.retain(|_, record| keep(record));
        (before - self.deliveries.len()) as u64
    }
}

/// Delivery store backed by process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeliveryStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryDeliveryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored deliveries across all challans
    pub async fn delivery_count(&self) -> usize {
        self.state.read().await.deliveries.len()
    }
}

impl DomainPort for InMemoryDeliveryStore {}

#[async_trait]
impl HealthCheckable for InMemoryDeliveryStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-delivery-store", 0)
    }
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    #[instrument(skip(self, entry), fields(dc_number = %entry.dc_number))]
    async fn insert_challan(&self, entry: DcEntry) -> Result<DcEntry, DeliveryError> {
        let mut state = self.state.write().await;
        if state.challans.contains_key(&entry.dc_number) {
            return Err(DeliveryError::DuplicateEntry(entry.dc_number.to_string()));
        }
        state
            .challans
            .insert(entry.dc_number.clone(), entry.clone());
        Ok(entry)
    }

    async fn get_challan(&self, dc_number: &DcNumber) -> Result<DcEntry, DeliveryError> {
        self.state.read().await.challan(dc_number).cloned()
    }

    async fn list_challans(&self) -> Result<Vec<DcSummary>, DeliveryError> {
        let state = self.state.read().await;
        Ok(state.challans.values().map(DcEntry::summary).collect())
    }

    #[instrument(skip(self, row), fields(dc_number = %dc_number, item = %row.item))]
    async fn update_planned_row(
        &self,
        dc_number: &DcNumber,
        row: DcRow,
    ) -> Result<DcRow, DeliveryError> {
        let mut state = self.state.write().await;
        let delivered = state.delivered(dc_number, &row.item, None);

        let entry = state
            .challans
            .get_mut(dc_number)
            .ok_or_else(|| DeliveryError::not_found("Challan", dc_number))?;
        let existing = entry
            .rows
            .iter_mut()
            .find(|existing| existing.item == row.item)
            .ok_or_else(|| {
                DeliveryError::not_found("Challan row", format!("{dc_number}/{}", row.item))
            })?;

        ensure_plan_covers(row.boxes, delivered)?;
        *existing = row.clone();
        Ok(row)
    }

    #[instrument(skip(self), fields(dc_number = %dc_number, item = %item))]
    async fn delete_row(
        &self,
        dc_number: &DcNumber,
        item: &ItemName,
    ) -> Result<u64, DeliveryError> {
        let mut state = self.state.write().await;
        let entry = state
            .challans
            .get_mut(dc_number)
            .ok_or_else(|| DeliveryError::not_found("Challan", dc_number))?;
        let position = entry
            .rows
            .iter()
            .position(|row| &row.item == item)
            .ok_or_else(|| {
                DeliveryError::not_found("Challan row", format!("{dc_number}/{item}"))
            })?;
        entry.rows.remove(position);

        let removed = state.remove_deliveries(|record| {
            !(&record.dc_number == dc_number && &record.item == item)
        });
        debug!(removed, "Removed row deliveries");
        Ok(removed)
    }

    #[instrument(skip(self), fields(dc_number = %dc_number))]
    async fn delete_challan(&self, dc_number: &DcNumber) -> Result<u64, DeliveryError> {
        let mut state = self.state.write().await;
        if state.challans.remove(dc_number).is_none() {
            return Err(DeliveryError::not_found("Challan", dc_number));
        }
        let removed = state.remove_deliveries(|record| &record.dc_number != dc_number);
        debug!(removed, "Removed challan deliveries");
        Ok(removed)
    }

    #[instrument(
        skip(self, record),
        fields(dc_number = %record.dc_number, item = %record.item)
    )]
    async fn insert_delivery(
        &self,
        record: DeliveryRecord,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let mut state = self.state.write().await;
        let planned = state.planned_boxes(&record.dc_number, &record.item)?;
        let delivered = state.delivered(&record.dc_number, &record.item, None);
        ensure_within_plan(planned, delivered, record.boxes)?;

        state.deliveries.insert(record.id, record.clone());
        Ok(record)
    }

    #[instrument(skip(self, change), fields(delivery_id = %id))]
    async fn update_delivery(
        &self,
        id: DeliveryId,
        change: DeliveryChange,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let mut state = self.state.write().await;
        let current = state
            .deliveries
            .get(&id)
            .cloned()
            .ok_or_else(|| DeliveryError::not_found("Delivery", id))?;

        let planned = state.planned_boxes(&current.dc_number, &current.item)?;
        let others = state.delivered(&current.dc_number, &current.item, Some(id));
        ensure_within_plan(planned, others, change.boxes)?;

        let updated = DeliveryRecord {
            boxes: change.boxes,
            date: change.date.unwrap_or(current.date),
            ..current
        };
        state.deliveries.insert(id, updated.clone());
        Ok(updated)
    }

    #[instrument(skip(self), fields(delivery_id = %id))]
    async fn delete_delivery(&self, id: DeliveryId) -> Result<DeliveryRecord, DeliveryError> {
        self.state
            .write()
            .await
            .deliveries
            .remove(&id)
            .ok_or_else(|| DeliveryError::not_found("Delivery", id))
    }

    async fn get_delivery(&self, id: DeliveryId) -> Result<DeliveryRecord, DeliveryError> {
        self.state
            .read()
            .await
            .deliveries
            .get(&id)
            .cloned()
            .ok_or_else(|| DeliveryError::not_found("Delivery", id))
    }

    async fn find_deliveries(
        &self,
        key: &DeliveryKey,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let state = self.state.read().await;
        // BTreeMap iteration is already in id order
        Ok(state
            .deliveries
            .values()
            .filter(|record| {
                record.dc_number == key.dc_number
                    && record.item == key.item
                    && record.date == key.date
            })
            .cloned()
            .collect())
    }

    async fn deliveries_for_challan(
        &self,
        dc_number: &DcNumber,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let state = self.state.read().await;
        state.challan(dc_number)?;

        let mut records: Vec<_> = state
            .deliveries
            .values()
            .filter(|record| &record.dc_number == dc_number)
            .cloned()
            .collect();
        records.sort_by(|a, b| (&a.item, a.date, a.id).cmp(&(&b.item, b.date, b.id)));
        Ok(records)
    }

    async fn delivered_totals(
        &self,
        dc_number: &DcNumber,
    ) -> Result<BTreeMap<ItemName, Decimal>, DeliveryError> {
        let state = self.state.read().await;
        let entry = state.challan(dc_number)?;
        Ok(state.delivered_totals(entry))
    }

    async fn challan_status(
        &self,
        dc_number: &DcNumber,
    ) -> Result<ChallanStatus, DeliveryError> {
        let state = self.state.read().await;
        let entry = state.challan(dc_number)?;
        Ok(state.status(entry))
    }

    async fn pending_items(&self) -> Result<Vec<PendingItem>, DeliveryError> {
        let state = self.state.read().await;
        let mut pending = Vec::new();
        for entry in state.challans.values() {
            let mut items: Vec<_> = state.status(entry).pending().collect();
            items.sort_by(|a, b| a.item.cmp(&b.item));
            pending.extend(items);
        }
        Ok(pending)
    }

    async fn deliveries_between(
        &self,
        range: DateRange,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let state = self.state.read().await;
        Ok(state
            .deliveries
            .values()
            .filter(|record| range.contains(record.date))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.number))]
    async fn insert_invoice(
        &self,
        invoice: InvoiceBinding,
    ) -> Result<InvoiceBinding, DeliveryError> {
        let mut state = self.state.write().await;
        if state.invoices.contains_key(&invoice.number) {
            return Err(DeliveryError::DuplicateInvoice(invoice.number.to_string()));
        }
        state
            .invoices
            .insert(invoice.number.clone(), invoice.clone());
        Ok(invoice)
    }

    async fn invoice_with_deliveries(
        &self,
        number: &InvoiceNumber,
    ) -> Result<(InvoiceBinding, Vec<DeliveryRecord>), DeliveryError> {
        let state = self.state.read().await;
        let binding = state
            .invoices
            .get(number)
            .cloned()
            .ok_or_else(|| DeliveryError::not_found("Invoice", number))?;
        let deliveries = state
            .deliveries
            .values()
            .filter(|record| binding.range.contains(record.date))
            .cloned()
            .collect();
        Ok((binding, deliveries))
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceBinding>, DeliveryError> {
        let state = self.state.read().await;
        Ok(state.invoices.values().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn dc() -> DcNumber {
        DcNumber::parse("DC001").unwrap()
    }

    fn item() -> ItemName {
        ItemName::parse("A").unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    async fn store_with_plan(boxes: Decimal) -> InMemoryDeliveryStore {
        let store = InMemoryDeliveryStore::new();
        store
            .insert_challan(DcEntry {
                dc_number: dc(),
                created_at: Utc::now(),
                rows: vec![DcRow {
                    item: item(),
                    dozens: 5,
                    boxes,
                }],
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_update_excludes_replaced_record() {
        let store = store_with_plan(dec!(10)).await;
        let first = DeliveryRecord::new(dc(), item(), date(1), dec!(4)).unwrap();
        store.insert_delivery(first.clone()).await.unwrap();
        store
            .insert_delivery(DeliveryRecord::new(dc(), item(), date(2), dec!(6)).unwrap())
            .await
            .unwrap();

        // 6 others + 4 replaced by 4 stays at 10
        let change = DeliveryChange {
            boxes: dec!(4),
            date: Some(date(3)),
        };
        let updated = store.update_delivery(first.id, change).await.unwrap();
        assert_eq!(updated.date, date(3));

        let too_many = DeliveryChange {
            boxes: dec!(5),
            date: None,
        };
        assert!(matches!(
            store.update_delivery(first.id, too_many).await,
            Err(DeliveryError::OverDelivery { .. })
        ));
        assert_eq!(store.get_delivery(first.id).await.unwrap().boxes, dec!(4));
    }

    #[tokio::test]
    async fn test_unplanned_pair_is_unknown_item() {
        let store = store_with_plan(dec!(10)).await;
        let other = ItemName::parse("B").unwrap();
        let result = store
            .insert_delivery(DeliveryRecord::new(dc(), other, date(1), dec!(1)).unwrap())
            .await;
        assert!(matches!(result, Err(DeliveryError::UnknownItem(_))));
    }

    #[tokio::test]
    async fn test_missing_challan_is_not_found() {
        let store = InMemoryDeliveryStore::new();
        let result = store
            .insert_delivery(DeliveryRecord::new(dc(), item(), date(1), dec!(1)).unwrap())
            .await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_health_check() {
        let result = InMemoryDeliveryStore::new().health_check().await;
        assert!(result.is_operational());
    }
}
