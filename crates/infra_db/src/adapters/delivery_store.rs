//! PostgreSQL Delivery Store
//!
//! Implements the `DeliveryStore` port on top of the ledger repositories.
//!
//! # Concurrency
//!
//! Every write that is bounded by a planned row (recording or correcting a
//! delivery, re-planning a row) opens a transaction and first takes
//! `SELECT ... FOR UPDATE` on that `dc_rows` row. Concurrent writers against
//! the same (challan, item) therefore run their sum-check-write one after
//! another, while writers on other pairs proceed in parallel. Multi-statement
//! reads run in a `REPEATABLE READ, READ ONLY` transaction so they see one
//! snapshot.
//!
//! # Error Handling
//!
//! - Unique violations on `dc_entries` / `invoices` -> `DuplicateEntry` / `DuplicateInvoice`
//! - Missing rows -> `NotFound`
//! - Everything else -> `Storage`

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{
    DateRange, DcNumber, DeliveryId, DomainPort, HealthCheckResult, HealthCheckable,
    InvoiceNumber, ItemName,
};
use domain_delivery::{
    ensure_plan_covers, ensure_within_plan, ChallanStatus, DcEntry, DcRow, DcSummary,
    DeliveryChange, DeliveryError, DeliveryKey, DeliveryRecord, DeliveryStore, InvoiceBinding,
    ItemProgress, PendingItem,
};

use crate::error::DatabaseError;
use crate::repositories::challan::{DcEntryRow, DcRowRow, DcSummaryRow, PendingRow, ProgressRow};
use crate::repositories::delivery::DeliveryRow;
use crate::repositories::invoice::InvoiceRow;
use crate::repositories::{ChallanRepository, DeliveryRepository, InvoiceRepository};

const ADAPTER_ID: &str = "postgres-delivery-store";

/// PostgreSQL-backed implementation of the `DeliveryStore` port
#[derive(Debug, Clone)]
pub struct PostgresDeliveryStore {
    pool: PgPool,
    challans: ChallanRepository,
    deliveries: DeliveryRepository,
    invoices: InvoiceRepository,
}

impl PostgresDeliveryStore {
    /// Creates a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            challans: ChallanRepository,
            deliveries: DeliveryRepository,
            invoices: InvoiceRepository,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        Ok(self.pool.begin().await?)
    }

    /// Read-only transaction over a single snapshot
    async fn snapshot(&self) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn planned_boxes_for_update(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        dc_number: &str,
        item: &str,
    ) -> Result<Decimal, DeliveryError> {
        if let Some(boxes) = self.challans.lock_planned_boxes(tx, dc_number, item).await? {
            return Ok(boxes);
        }
        if self.challans.entry_exists(tx, dc_number).await? {
            Err(DeliveryError::UnknownItem(format!("{item} is not planned on {dc_number}")))
        } else {
            Err(DeliveryError::not_found("Challan", dc_number))
        }
    }
}

async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), DatabaseError> {
    Ok(tx.commit().await?)
}

/// Maps a repository `NotFound` onto a domain `NotFound` for `entity`
fn missing(
    entity: &'static str,
    key: impl std::fmt::Display,
) -> impl FnOnce(DatabaseError) -> DeliveryError {
    let key = key.to_string();
    move |err| {
        if err.is_not_found() {
            DeliveryError::NotFound { entity, key }
        } else {
            err.into()
        }
    }
}

impl DomainPort for PostgresDeliveryStore {}

#[async_trait]
impl HealthCheckable for PostgresDeliveryStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => {
                HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {e}"))
            }
        }
    }
}

#[async_trait]
impl DeliveryStore for PostgresDeliveryStore {
    #[instrument(skip(self, entry), fields(dc_number = %entry.dc_number))]
    async fn insert_challan(&self, entry: DcEntry) -> Result<DcEntry, DeliveryError> {
        let mut tx = self.begin().await?;
        self.challans
            .insert_entry(&mut tx, entry.dc_number.as_str(), entry.created_at)
            .await
            .map_err(|err| {
                if err.is_duplicate() {
                    DeliveryError::DuplicateEntry(entry.dc_number.to_string())
                } else {
                    err.into()
                }
            })?;

        for (position, row) in entry.rows.iter().enumerate() {
            let db_row = DcRowRow {
                dc_number: entry.dc_number.to_string(),
                item: row.item.to_string(),
                line_no: i32::try_from(position)
                    .map_err(|_| DeliveryError::validation("Too many rows on one challan"))?,
                dozens: dozens_to_db(row.dozens)?,
                boxes: row.boxes,
            };
            self.challans.insert_row(&mut tx, &db_row).await?;
        }

        commit(tx).await?;
        debug!(rows = entry.rows.len(), "Inserted challan");
        Ok(entry)
    }

    async fn get_challan(&self, dc_number: &DcNumber) -> Result<DcEntry, DeliveryError> {
        let mut tx = self.snapshot().await?;
        let header = self
            .challans
            .get_entry(&mut tx, dc_number.as_str())
            .await
            .map_err(missing("Challan", dc_number))?;
        let rows = self.challans.get_rows(&mut tx, dc_number.as_str()).await?;
        commit(tx).await?;
        Ok(entry_from_rows(header, rows)?)
    }

    async fn list_challans(&self) -> Result<Vec<DcSummary>, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let rows = self.challans.list_summaries(&mut conn).await?;
        Ok(rows.into_iter().map(summary_from_row).collect::<Result<_, _>>()?)
    }

    #[instrument(skip(self, row), fields(dc_number = %dc_number, item = %row.item))]
    async fn update_planned_row(
        &self,
        dc_number: &DcNumber,
        row: DcRow,
    ) -> Result<DcRow, DeliveryError> {
        let mut tx = self.begin().await?;
        let (dc, item) = (dc_number.as_str(), row.item.as_str());

        if self.challans.lock_planned_boxes(&mut tx, dc, item).await?.is_none() {
            return Err(DeliveryError::not_found("Challan row", format!("{dc}/{item}")));
        }
        let delivered = self
            .deliveries
            .delivered_total(&mut tx, dc, item, None)
            .await?;
        ensure_plan_covers(row.boxes, delivered)?;

        self.challans
            .update_row(&mut tx, dc, item, dozens_to_db(row.dozens)?, row.boxes)
            .await?;
        commit(tx).await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(dc_number = %dc_number, item = %item))]
    async fn delete_row(
        &self,
        dc_number: &DcNumber,
        item: &ItemName,
    ) -> Result<u64, DeliveryError> {
        let mut tx = self.begin().await?;
        let (dc, item) = (dc_number.as_str(), item.as_str());

        // Deliveries against the row queue behind this lock, so the count is exact
        if self.challans.lock_planned_boxes(&mut tx, dc, item).await?.is_none() {
            return Err(DeliveryError::not_found("Challan row", format!("{dc}/{item}")));
        }
        let removed = self
            .deliveries
            .delete_for_challan(&mut tx, dc, Some(item))
            .await?;
        self.challans.delete_row(&mut tx, dc, item).await?;
        commit(tx).await?;
        Ok(removed)
    }

    #[instrument(skip(self), fields(dc_number = %dc_number))]
    async fn delete_challan(&self, dc_number: &DcNumber) -> Result<u64, DeliveryError> {
        let mut tx = self.begin().await?;
        if !self.challans.lock_entry(&mut tx, dc_number.as_str()).await? {
            return Err(DeliveryError::not_found("Challan", dc_number));
        }
        let removed = self
            .deliveries
            .delete_for_challan(&mut tx, dc_number.as_str(), None)
            .await?;
        self
            .challans
            .delete_entry(&mut tx, dc_number.as_str())
            .await?;
        commit(tx).await?;
        Ok(removed)
    }

    #[instrument(skip(self, record), fields(dc_number = %record.dc_number, item = %record.item))]
    async fn insert_delivery(
        &self,
        record: DeliveryRecord,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let mut tx = self.begin().await?;
        let (dc, item) = (record.dc_number.as_str(), record.item.as_str());

        let planned = self.planned_boxes_for_update(&mut tx, dc, item).await?;
        let delivered = self
            .deliveries
            .delivered_total(&mut tx, dc, item, None)
            .await?;
        ensure_within_plan(planned, delivered, record.boxes)?;

        self
            .deliveries
            .insert(&mut tx, &record_to_row(&record))
            .await?;
        commit(tx).await?;
        Ok(record)
    }

    #[instrument(skip(self, change), fields(delivery_id = %id))]
    async fn update_delivery(
        &self,
        id: DeliveryId,
        change: DeliveryChange,
    ) -> Result<DeliveryRecord, DeliveryError> {
        let mut tx = self.begin().await?;
        let current = self
            .deliveries
            .get(&mut tx, id.into())
            .await
            .map_err(missing("Delivery", id))?;

        // Lock the planned row before re-reading the pair's total
        let planned = self
            .challans
            .lock_planned_boxes(&mut tx, &current.dc_number, &current.item)
            .await?
            .ok_or_else(|| DeliveryError::not_found("Delivery", id))?;
        let others = self
            .deliveries
            .delivered_total(&mut tx, &current.dc_number, &current.item, Some(id.into()))
            .await?;
        ensure_within_plan(planned, others, change.boxes)?;

        let updated = self
            .deliveries
            .update(&mut tx, id.into(), change.boxes, change.date.unwrap_or(current.delivery_date))
            .await
            .map_err(missing("Delivery", id))?;
        commit(tx).await?;
        Ok(record_from_row(updated)?)
    }

    #[instrument(skip(self), fields(delivery_id = %id))]
    async fn delete_delivery(&self, id: DeliveryId) -> Result<DeliveryRecord, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let row = self
            .deliveries
            .delete(&mut conn, id.into())
            .await
            .map_err(missing("Delivery", id))?;
        Ok(record_from_row(row)?)
    }

    async fn get_delivery(&self, id: DeliveryId) -> Result<DeliveryRecord, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let row = self
            .deliveries
            .get(&mut conn, id.into())
            .await
            .map_err(missing("Delivery", id))?;
        Ok(record_from_row(row)?)
    }

    async fn find_deliveries(
        &self,
        key: &DeliveryKey,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let rows = self
            .deliveries
            .find_by_key(&mut conn, key.dc_number.as_str(), key.item.as_str(), key.date)
            .await?;
        Ok(records_from_rows(rows)?)
    }

    async fn deliveries_for_challan(
        &self,
        dc_number: &DcNumber,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let mut tx = self.snapshot().await?;
        if !self.challans.entry_exists(&mut tx, dc_number.as_str()).await? {
            return Err(DeliveryError::not_found("Challan", dc_number));
        }
        let rows = self
            .deliveries
            .for_challan(&mut tx, dc_number.as_str())
            .await?;
        commit(tx).await?;
        Ok(records_from_rows(rows)?)
    }

    async fn delivered_totals(
        &self,
        dc_number: &DcNumber,
    ) -> Result<BTreeMap<ItemName, Decimal>, DeliveryError> {
        let status = self.challan_status(dc_number).await?;
        Ok(status
            .items
            .into_iter()
            .map(|progress| (progress.item, progress.delivered))
            .collect())
    }

    async fn challan_status(&self, dc_number: &DcNumber) -> Result<ChallanStatus, DeliveryError> {
        let mut tx = self.snapshot().await?;
        let header = self
            .challans
            .get_entry(&mut tx, dc_number.as_str())
            .await
            .map_err(missing("Challan", dc_number))?;
        let progress = self.challans.progress(&mut tx, dc_number.as_str()).await?;
        commit(tx).await?;

        Ok(ChallanStatus {
            dc_number: parse_code(header.dc_number)?,
            created_at: header.created_at,
            items: progress
                .into_iter()
                .map(progress_from_row)
                .collect::<Result<_, _>>()?,
        })
    }

    async fn pending_items(&self) -> Result<Vec<PendingItem>, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let rows = self.challans.pending(&mut conn).await?;
        Ok(rows.into_iter().map(pending_from_row).collect::<Result<_, _>>()?)
    }

    async fn deliveries_between(
        &self,
        range: DateRange,
    ) -> Result<Vec<DeliveryRecord>, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let rows = self
            .deliveries
            .between(&mut conn, range.from(), range.to())
            .await?;
        Ok(records_from_rows(rows)?)
    }

    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.number))]
    async fn insert_invoice(
        &self,
        invoice: InvoiceBinding,
    ) -> Result<InvoiceBinding, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let row = InvoiceRow {
            invoice_number: invoice.number.to_string(),
            from_date: invoice.range.from(),
            to_date: invoice.range.to(),
            created_at: invoice.created_at,
        };
        self.invoices.insert(&mut conn, &row).await.map_err(|err| {
            if err.is_duplicate() {
                DeliveryError::DuplicateInvoice(invoice.number.to_string())
            } else {
                err.into()
            }
        })?;
        Ok(invoice)
    }

    async fn invoice_with_deliveries(
        &self,
        number: &InvoiceNumber,
    ) -> Result<(InvoiceBinding, Vec<DeliveryRecord>), DeliveryError> {
        let mut tx = self.snapshot().await?;
        let row = self
            .invoices
            .get(&mut tx, number.as_str())
            .await
            .map_err(missing("Invoice", number))?;
        let deliveries = self
            .deliveries
            .between(&mut tx, row.from_date, row.to_date)
            .await?;
        commit(tx).await?;
        Ok((binding_from_row(row)?, records_from_rows(deliveries)?))
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceBinding>, DeliveryError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let rows = self.invoices.list(&mut conn).await?;
        Ok(rows.into_iter().map(binding_from_row).collect::<Result<_, _>>()?)
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn parse_code<T>(value: String) -> Result<T, DatabaseError>
where
    T: TryFrom<String, Error = core_kernel::CoreError>,
{
    T::try_from(value).map_err(|err| DatabaseError::corrupt(err.to_string()))
}

fn dozens_to_db(dozens: u32) -> Result<i32, DeliveryError> {
    i32::try_from(dozens)
        .map_err(|_| DeliveryError::validation(format!("{dozens} dozens is out of range")))
}

fn dozens_from_db(dozens: i32) -> Result<u32, DatabaseError> {
    u32::try_from(dozens).map_err(|_| DatabaseError::corrupt(format!("negative dozens {dozens}")))
}

fn entry_from_rows(header: DcEntryRow, rows: Vec<DcRowRow>) -> Result<DcEntry, DatabaseError> {
    let rows = rows
        .into_iter()
        .map(|row| {
            Ok(DcRow {
                item: parse_code(row.item)?,
                dozens: dozens_from_db(row.dozens)?,
                boxes: row.boxes,
            })
        })
        .collect::<Result<_, DatabaseError>>()?;

    Ok(DcEntry {
        dc_number: parse_code(header.dc_number)?,
        created_at: header.created_at,
        rows,
    })
}

fn summary_from_row(row: DcSummaryRow) -> Result<DcSummary, DatabaseError> {
    Ok(DcSummary {
        dc_number: parse_code(row.dc_number)?,
        created_at: row.created_at,
        item_count: usize::try_from(row.item_count).unwrap_or_default(),
    })
}

fn progress_from_row(row: ProgressRow) -> Result<ItemProgress, DatabaseError> {
    Ok(ItemProgress {
        item: parse_code(row.item)?,
        dozens: dozens_from_db(row.dozens)?,
        planned: row.planned,
        delivered: row.delivered,
    })
}

fn pending_from_row(row: PendingRow) -> Result<PendingItem, DatabaseError> {
    Ok(PendingItem {
        dc_number: parse_code(row.dc_number)?,
        item: parse_code(row.item)?,
        planned: row.planned,
        delivered: row.delivered,
        created_at: row.created_at,
    })
}

fn record_to_row(record: &DeliveryRecord) -> DeliveryRow {
    DeliveryRow {
        delivery_id: record.id.into(),
        dc_number: record.dc_number.to_string(),
        item: record.item.to_string(),
        delivery_date: record.date,
        boxes: record.boxes,
        recorded_at: record.recorded_at,
    }
}

fn record_from_row(row: DeliveryRow) -> Result<DeliveryRecord, DatabaseError> {
    Ok(DeliveryRecord {
        id: DeliveryId::from(row.delivery_id),
        dc_number: parse_code(row.dc_number)?,
        item: parse_code(row.item)?,
        date: row.delivery_date,
        boxes: row.boxes,
        recorded_at: row.recorded_at,
    })
}

fn records_from_rows(rows: Vec<DeliveryRow>) -> Result<Vec<DeliveryRecord>, DatabaseError> {
    rows.into_iter().map(record_from_row).collect()
}

fn binding_from_row(row: InvoiceRow) -> Result<InvoiceBinding, DatabaseError> {
    let range = DateRange::new(row.from_date, row.to_date)
        .map_err(|err| DatabaseError::corrupt(err.to_string()))?;
    Ok(InvoiceBinding {
        number: parse_code(row.invoice_number)?,
        range,
        created_at: row.created_at,
    })
}
