//! API middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use chrono::Utc;
use tracing::info;

use crate::AppState;

/// Audit logging middleware
///
/// Logs all API requests for compliance and debugging
pub async fn audit_middleware(
    State(_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
