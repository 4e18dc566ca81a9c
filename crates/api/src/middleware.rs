use std::time::Duration;

use axum::{extract::State, http::StatusCode, middleware::Next, response::Response};
use tracing::warn;

use crate::app::errors::json_error;

#[derive(Debug, Clone, Copy)]
pub struct DeadlineState {
    pub timeout: Duration,
}

/// Bound every request by the configured deadline.
///
/// On expiry the handler future is dropped, which cancels whatever storage
/// or hashing call it was awaiting; the caller gets a 504 and never a late
/// success.
///
/// Dropping is not a rollback. If the deadline lands after a Postgres
/// `INSERT` has committed but before its reply is read, the caller sees a
/// 504 while the user row exists; a retried registration then answers 409.
pub async fn deadline_middleware(
    State(state): State<DeadlineState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(state.timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(path = %path, timeout_ms = state.timeout.as_millis() as u64, "request deadline exceeded");
            json_error(
                StatusCode::GATEWAY_TIMEOUT,
                "deadline_exceeded",
                "request deadline exceeded",
            )
        }
    }
}
