//! Challan handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::{DcNumber, ItemName};
use domain_delivery::{ChallanStatus, DcRow, DcSummary, PendingItem};

use crate::dto::challan::*;
use crate::{error::ApiError, AppState};

/// Creates a challan with its planned rows
pub async fn create_challan(
    State(state): State<AppState>,
    Json(body): Json<CreateChallanBody>,
) -> Result<(StatusCode, Json<ChallanResponse>), ApiError> {
    body.validate()?;
    let entry = state.engine.registry.create(body.into_request()?).await?;
    let response = ChallanResponse::from_entry(entry, state.engine.catalog());
    Ok((StatusCode::CREATED, Json(response)))
}

/// Lists challans ordered by number
pub async fn list_challans(
    State(state): State<AppState>,
) -> Result<Json<Vec<DcSummary>>, ApiError> {
    Ok(Json(state.engine.registry.list().await?))
}

/// Gets a challan with its rows
pub async fn get_challan(
    State(state): State<AppState>,
    Path(dc_number): Path<String>,
) -> Result<Json<ChallanResponse>, ApiError> {
    let entry = state
        .engine
        .registry
        .fetch(&DcNumber::parse(dc_number)?)
        .await?;
    Ok(Json(ChallanResponse::from_entry(entry, state.engine.catalog())))
}

/// Deletes a challan and everything recorded against it
pub async fn delete_challan(
    State(state): State<AppState>,
    Path(dc_number): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .registry
        .delete_entry(&DcNumber::parse(dc_number)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Re-plans one row
pub async fn update_row(
    State(state): State<AppState>,
    Path((dc_number, item)): Path<(String, String)>,
    Json(body): Json<UpdateRowBody>,
) -> Result<Json<DcRow>, ApiError> {
    body.validate()?;
    let row = state
        .engine
        .registry
        .update_row(&DcNumber::parse(dc_number)?, &ItemName::parse(item)?, body.dozens)
        .await?;
    Ok(Json(row))
}

/// Deletes one row and its deliveries
pub async fn delete_row(
    State(state): State<AppState>,
    Path((dc_number, item)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .registry
        .delete_row(&DcNumber::parse(dc_number)?, &ItemName::parse(item)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Planned against delivered, per row
pub async fn challan_status(
    State(state): State<AppState>,
    Path(dc_number): Path<String>,
) -> Result<Json<ChallanStatus>, ApiError> {
    Ok(Json(state.engine.ledger.challan_status(&DcNumber::parse(dc_number)?).await?))
}

/// Every (challan, item) pair still short of its plan
pub async fn pending_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingItem>>, ApiError> {
    Ok(Json(state.engine.ledger.pending_items().await?))
}
