//! API middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Request logging middleware
///
/// Emits one event per request with method, path, status and duration.
/// Rejected writes (4xx) are logged at `warn`.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let rejected = response.status().is_client_error();
    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    if rejected {
        warn!(method = %method, uri = %uri, status, duration_ms, "API request rejected");
    } else {
        info!(method = %method, uri = %uri, status, duration_ms, "API request");
    }

    response
}
