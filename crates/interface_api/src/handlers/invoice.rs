//! Invoice and statistics handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::InvoiceNumber;
use domain_delivery::{InvoiceStatement, RangeStatistics};

use crate::dto::invoice::*;
use crate::{error::ApiError, AppState};

/// Binds a date range to a new invoice number
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(body): Json<CreateInvoiceBody>,
) -> Result<(StatusCode, Json<InvoiceSummaryResponse>), ApiError> {
    body.validate()?;
    let binding = state
        .engine
        .aggregator
        .create_invoice(InvoiceNumber::parse(&body.invoice_number)?, body.from_date, body.to_date)
        .await?;
    Ok((StatusCode::CREATED, Json(binding.into())))
}

/// Lists invoices, highest number first
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceSummaryResponse>>, ApiError> {
    let invoices = state.engine.aggregator.list_invoices().await?;
    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

/// Priced statement of an invoice as the ledger stands now
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<InvoiceStatement>, ApiError> {
    let statement = state
        .engine
        .aggregator
        .get_invoice(&InvoiceNumber::parse(number)?)
        .await?;
    Ok(Json(statement))
}

/// Totals for deliveries dated within `from..=to`
pub async fn range_statistics(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<RangeStatistics>, ApiError> {
    Ok(Json(state.engine.aggregator.range_statistics(range.from, range.to).await?))
}
