//! Delivery handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::{DcNumber, DeliveryId};
use domain_delivery::DeliveryRecord;

use crate::dto::delivery::*;
use crate::{error::ApiError, AppState};

fn parse_id(raw: &str) -> Result<DeliveryId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{raw}' is not a delivery id")))
}

/// Records a delivery against a challan row
pub async fn record_delivery(
    State(state): State<AppState>,
    Path(dc_number): Path<String>,
    Json(body): Json<RecordDeliveryBody>,
) -> Result<(StatusCode, Json<DeliveryRecord>), ApiError> {
    body.validate()?;
    let request = body.into_request(DcNumber::parse(dc_number)?)?;
    let record = state.engine.ledger.record_delivery(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delivery history of a challan
pub async fn list_deliveries(
    State(state): State<AppState>,
    Path(dc_number): Path<String>,
) -> Result<Json<Vec<DeliveryRecord>>, ApiError> {
    Ok(Json(state.engine.ledger.deliveries(&DcNumber::parse(dc_number)?).await?))
}

pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeliveryRecord>, ApiError> {
    Ok(Json(state.engine.ledger.get_delivery(parse_id(&id)?).await?))
}

/// Corrects the boxes (and optionally the date) of one delivery
pub async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateDeliveryBody>,
) -> Result<Json<DeliveryRecord>, ApiError> {
    let record = state
        .engine
        .ledger
        .update_delivery_by_id(parse_id(&id)?, body.into())
        .await?;
    Ok(Json(record))
}

pub async fn delete_delivery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .ledger
        .delete_delivery_by_id(parse_id(&id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
