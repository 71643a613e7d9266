//! Per-request metrics recording.

use crate::services::metrics::{ERRORS_TOTAL, HTTP_REQUESTS_TOTAL};
use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Count every request by matched route and status code. 4xx/5xx responses
/// also feed the error counter for alerting.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let status = response.status();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&route, status.as_str()])
        .inc();
    if status.is_client_error() {
        ERRORS_TOTAL.with_label_values(&["client_error"]).inc();
    } else if status.is_server_error() {
        ERRORS_TOTAL.with_label_values(&["server_error"]).inc();
    }

    response
}
