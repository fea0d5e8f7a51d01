//! Invoice repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgConnection;

use crate::error::DatabaseError;

/// Database row for an invoice binding
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub invoice_number: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Repository for invoice bindings
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceRepository;

impl InvoiceRepository {
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        row: &InvoiceRow,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (invoice_number, from_date, to_date, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&row.invoice_number)
        .bind(row.from_date)
        .bind(row.to_date)
        .bind(row.created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn get(
        &self,
        conn: &mut PgConnection,
        number: &str,
    ) -> Result<InvoiceRow, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_number, from_date, to_date, created_at
            FROM invoices
            WHERE invoice_number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Invoice", number))
    }

    /// All invoices, highest number first
    pub async fn list(&self, conn: &mut PgConnection) -> Result<Vec<InvoiceRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_number, from_date, to_date, created_at
            FROM invoices
            ORDER BY invoice_number COLLATE "C" DESC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}
