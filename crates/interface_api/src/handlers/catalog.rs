//! Catalog handlers

use axum::{extract::State, Json};
use serde::Serialize;

use core_kernel::Currency;
use domain_catalog::CatalogItem;

use crate::AppState;

#[derive(Serialize)]
pub struct CatalogResponse {
    pub currency: Currency,
    pub box_label: String,
    pub items: Vec<CatalogItem>,
}

/// Lists catalog items in catalog order
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let catalog = state.engine.catalog();
    Json(CatalogResponse {
        currency: catalog.currency(),
        box_label: catalog.box_label().to_string(),
        items: catalog.items().to_vec(),
    })
}
