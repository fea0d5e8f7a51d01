//! Delivery repository
//!
//! Queries over `dc_deliveries`. The ceiling check itself happens in the
//! adapter, after the planned row has been locked.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Database row for a delivery
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeliveryRow {
    pub delivery_id: Uuid,
    pub dc_number: String,
    pub item: String,
    pub delivery_date: NaiveDate,
    pub boxes: Decimal,
    pub recorded_at: DateTime<Utc>,
}

const COLUMNS: &str = "delivery_id, dc_number, item, delivery_date, boxes, recorded_at";

/// Repository for recorded deliveries
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryRepository;

impl DeliveryRepository {
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        row: &DeliveryRow,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO dc_deliveries
                (delivery_id, dc_number, item, delivery_date, boxes, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.delivery_id)
        .bind(&row.dc_number)
        .bind(&row.item)
        .bind(row.delivery_date)
        .bind(row.boxes)
        .bind(row.recorded_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn get(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<DeliveryRow, DatabaseError> {
        sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {COLUMNS} FROM dc_deliveries WHERE delivery_id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Delivery", id))
    }

    /// Sum of delivered boxes for a pair, optionally leaving one record out
    pub async fn delivered_total(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
        item: &str,
        excluding: Option<Uuid>,
    ) -> Result<Decimal, DatabaseError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(boxes), 0)
            FROM dc_deliveries
            WHERE dc_number = $1 AND item = $2
              AND ($3::uuid IS NULL OR delivery_id <> $3)
            "#,
        )
        .bind(dc_number)
        .bind(item)
        .bind(excluding)
        .fetch_one(&mut *conn)
        .await?;
        Ok(total)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        boxes: Decimal,
        delivery_date: NaiveDate,
    ) -> Result<DeliveryRow, DatabaseError> {
        sqlx::query_as::<_, DeliveryRow>(&format!(
            r#"
            UPDATE dc_deliveries SET boxes = $2, delivery_date = $3
            WHERE delivery_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(boxes)
        .bind(delivery_date)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Delivery", id))
    }

    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<DeliveryRow, DatabaseError> {
        sqlx::query_as::<_, DeliveryRow>(&format!(
            "DELETE FROM dc_deliveries WHERE delivery_id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Delivery", id))
    }

    /// Deletes every delivery of a challan, or of one of its items
    ///
    /// Returns the number of deliveries removed.
    pub async fn delete_for_challan(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
        item: Option<&str>,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM dc_deliveries WHERE dc_number = $1 AND ($2::text IS NULL OR item = $2)",
        )
        .bind(dc_number)
        .bind(item)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Deliveries sharing a natural key, in id order
    pub async fn find_by_key(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
        item: &str,
        delivery_date: NaiveDate,
    ) -> Result<Vec<DeliveryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM dc_deliveries
            WHERE dc_number = $1 AND item = $2 AND delivery_date = $3
            ORDER BY delivery_id
            "#
        ))
        .bind(dc_number)
        .bind(item)
        .bind(delivery_date)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Delivery history of a challan ordered by item, date and id
    pub async fn for_challan(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
    ) -> Result<Vec<DeliveryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM dc_deliveries
            WHERE dc_number = $1
            ORDER BY item COLLATE "C", delivery_date, delivery_id
            "#
        ))
        .bind(dc_number)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Deliveries dated within an inclusive range
    pub async fn between(
        &self,
        conn: &mut PgConnection,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DeliveryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM dc_deliveries
            WHERE delivery_date BETWEEN $1 AND $2
            ORDER BY delivery_date, dc_number COLLATE "C", item COLLATE "C", delivery_id
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}
