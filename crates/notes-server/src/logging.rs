//! Request logging middleware.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Log one line per request once the response is ready.
///
/// Skipped entirely when `request_logging` is off.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    log_completion(&method, &path, response.status(), started.elapsed());
    response
}

/// 5xx at `error`, 4xx at `warn`, everything else at `info`.
fn log_completion(method: &Method, path: &str, status: StatusCode, elapsed: Duration) {
    let status = status.as_u16();
    let elapsed_ms = elapsed.as_millis() as u64;

    match status {
        500.. => tracing::error!(%method, path, status, elapsed_ms, "request failed"),
        400..=499 => tracing::warn!(%method, path, status, elapsed_ms, "request rejected"),
        _ => tracing::info!(%method, path, status, elapsed_ms, "request served"),
    }
}
