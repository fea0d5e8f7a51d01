//! HTTP API Layer
//!
//! REST API over the delivery challan ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one module per resource (catalog, challans, deliveries, invoices)
//! - **Middleware**: request logging
//! - **DTOs**: request bodies (validated with `validator`) and response shapes
//! - **Error Handling**: `DeliveryError` mapped onto status codes in one place
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(engine, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_delivery::DeliveryEngine;

use crate::config::ApiConfig;
use crate::handlers::{catalog, challan, delivery, health, invoice};
use crate::middleware::request_logging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: DeliveryEngine,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `engine` - Ledger services over the chosen store
/// * `config` - API configuration
pub fn create_router(engine: DeliveryEngine, config: ApiConfig) -> Router {
    let state = AppState { engine, config };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let challan_routes = Router::new()
        .route("/", post(challan::create_challan).get(challan::list_challans))
        .route("/:dc_number", get(challan::get_challan).delete(challan::delete_challan))
        .route("/:dc_number/status", get(challan::challan_status))
        .route(
            "/:dc_number/items/:item",
            put(challan::update_row).delete(challan::delete_row),
        )
        .route(
            "/:dc_number/deliveries",
            post(delivery::record_delivery).get(delivery::list_deliveries),
        );

    let delivery_routes = Router::new().route(
        "/:id",
        get(delivery::get_delivery)
            .put(delivery::update_delivery)
            .delete(delivery::delete_delivery),
    );

    let invoice_routes = Router::new()
        .route("/", post(invoice::create_invoice).get(invoice::list_invoices))
        .route("/:number", get(invoice::get_invoice));

    let api_routes = Router::new()
        .route("/catalog", get(catalog::get_catalog))
        .route("/pending", get(challan::pending_items))
        .route("/statistics", get(invoice::range_statistics))
        .nest("/challans", challan_routes)
        .nest("/deliveries", delivery_routes)
        .nest("/invoices", invoice_routes)
        .layer(axum_middleware::from_fn(request_logging));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
