//! Challan repository
//!
//! Queries over `dc_entries` and `dc_rows`. Every method borrows a
//! connection so the adapter can run several of them inside one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::error::DatabaseError;

/// Database row for a challan header
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DcEntryRow {
    pub dc_number: String,
    pub created_at: DateTime<Utc>,
}

/// Database row for a planned line
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DcRowRow {
    pub dc_number: String,
    pub item: String,
    pub line_no: i32,
    pub dozens: i32,
    pub boxes: Decimal,
}

/// Challan header with its row count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DcSummaryRow {
    pub dc_number: String,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
}

/// Planned row joined with its delivered total
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub item: String,
    pub dozens: i32,
    pub planned: Decimal,
    pub delivered: Decimal,
}

/// Pending (challan, item) pair
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingRow {
    pub dc_number: String,
    pub item: String,
    pub planned: Decimal,
    pub delivered: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Repository for challans and their planned rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ChallanRepository;

impl ChallanRepository {
    pub async fn insert_entry(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO dc_entries (dc_number, created_at) VALUES ($1, $2)")
            .bind(dc_number)
            .bind(created_at)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn insert_row(
        &self,
        conn: &mut PgConnection,
        row: &DcRowRow,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO dc_rows (dc_number, item, line_no, dozens, boxes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&row.dc_number)
        .bind(&row.item)
        .bind(row.line_no)
        .bind(row.dozens)
        .bind(row.boxes)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn get_entry(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
    ) -> Result<DcEntryRow, DatabaseError> {
        sqlx::query_as::<_, DcEntryRow>(
            "SELECT dc_number, created_at FROM dc_entries WHERE dc_number = $1",
        )
        .bind(dc_number)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Challan", dc_number))
    }

    /// Planned rows in entry order
    pub async fn get_rows(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
    ) -> Result<Vec<DcRowRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, DcRowRow>(
            r#"
            SELECT dc_number, item, line_no, dozens, boxes
            FROM dc_rows
            WHERE dc_number = $1
            ORDER BY line_no
            "#,
        )
        .bind(dc_number)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn list_summaries(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Vec<DcSummaryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, DcSummaryRow>(
            r#"
            SELECT e.dc_number, e.created_at, COUNT(r.item) AS item_count
            FROM dc_entries e
            LEFT JOIN dc_rows r ON r.dc_number = e.dc_number
            GROUP BY e.dc_number, e.created_at
            ORDER BY e.dc_number COLLATE "C"
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Locks a planned row for the rest of the transaction and returns its boxes
    ///
    /// Concurrent writers against the same (challan, item) queue up here.
    pub async fn lock_planned_boxes(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
        item: &str,
    ) -> Result<Option<Decimal>, DatabaseError> {
        let boxes = sqlx::query_scalar::<_, Decimal>(
            "SELECT boxes FROM dc_rows WHERE dc_number = $1 AND item = $2 FOR UPDATE",
        )
        .bind(dc_number)
        .bind(item)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(boxes)
    }

    /// Locks a challan header and every planned row under it
    ///
    /// Returns false when the challan does not exist. Held until the
    /// transaction ends, so no delivery against the challan can commit
    /// in between.
    pub async fn lock_entry(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
    ) -> Result<bool, DatabaseError> {
        let header = sqlx::query_scalar::<_, String>(
            "SELECT dc_number FROM dc_entries WHERE dc_number = $1 FOR UPDATE",
        )
        .bind(dc_number)
        .fetch_optional(&mut *conn)
        .await?;
        if header.is_none() {
            return Ok(false);
        }

        sqlx::query("SELECT item FROM dc_rows WHERE dc_number = $1 FOR UPDATE")
            .bind(dc_number)
            .fetch_all(&mut *conn)
            .await?;
        Ok(true)
    }

    pub async fn entry_exists(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
    ) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM dc_entries WHERE dc_number = $1)",
        )
        .bind(dc_number)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    pub async fn update_row(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
        item: &str,
        dozens: i32,
        boxes: Decimal,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE dc_rows SET dozens = $3, boxes = $4 WHERE dc_number = $1 AND item = $2",
        )
        .bind(dc_number)
        .bind(item)
        .bind(dozens)
        .bind(boxes)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(
                "Challan row",
                format!("{dc_number}/{item}"),
            ));
        }
        Ok(())
    }

    /// Deletes a planned row; its deliveries go with it through the foreign key
    pub async fn delete_row(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
        item: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM dc_rows WHERE dc_number = $1 AND item = $2")
            .bind(dc_number)
            .bind(item)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes a challan; rows and deliveries cascade
    pub async fn delete_entry(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM dc_entries WHERE dc_number = $1")
            .bind(dc_number)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Planned rows of one challan with delivered totals, in entry order
    pub async fn progress(
        &self,
        conn: &mut PgConnection,
        dc_number: &str,
    ) -> Result<Vec<ProgressRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT r.item, r.dozens, r.boxes AS planned,
                   COALESCE(SUM(d.boxes), 0) AS delivered
            FROM dc_rows r
            LEFT JOIN dc_deliveries d ON d.dc_number = r.dc_number AND d.item = r.item
            WHERE r.dc_number = $1
            GROUP BY r.item, r.line_no, r.dozens, r.boxes
            ORDER BY r.line_no
            "#,
        )
        .bind(dc_number)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Every pair with delivered < planned
    pub async fn pending(&self, conn: &mut PgConnection) -> Result<Vec<PendingRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PendingRow>(
            r#"
            SELECT r.dc_number, r.item, r.boxes AS planned,
                   COALESCE(SUM(d.boxes), 0) AS delivered,
                   e.created_at
            FROM dc_rows r
            JOIN dc_entries e ON e.dc_number = r.dc_number
            LEFT JOIN dc_deliveries d ON d.dc_number = r.dc_number AND d.item = r.item
            GROUP BY r.dc_number, r.item, r.boxes, e.created_at
            HAVING COALESCE(SUM(d.boxes), 0) < r.boxes
            ORDER BY r.dc_number COLLATE "C", r.item COLLATE "C"
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}
