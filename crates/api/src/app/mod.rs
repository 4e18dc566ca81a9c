//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage selection and auth service construction
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and input validation
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Versioned routes run under the request deadline; `/health` does not.
pub fn build_app(services: Arc<AppServices>, request_timeout: Duration) -> Router {
    let deadline = middleware::DeadlineState {
        timeout: request_timeout,
    };

    let v1 = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                deadline,
                middleware::deadline_middleware,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/v1", v1)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use keygate_auth::{AuthService, BcryptHasher};
    use keygate_infra::InMemoryStorage;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let storage = Arc::new(InMemoryStorage::new());
        let hasher = Arc::new(BcryptHasher::new(keygate_auth::hasher::MIN_COST).unwrap());
        let auth = AuthService::new(
            storage.clone(),
            storage.clone(),
            storage,
            hasher,
            chrono::Duration::minutes(5),
        );
        build_app(Arc::new(AppServices::new(auth)), Duration::from_secs(5))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, _) = send(test_app(), Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn register_returns_created_with_user_id() {
        let (status, body) = send(
            test_app(),
            post_json("/v1/register", r#"{"email":"a@x.com","password":"pw"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user_id"], 1);
    }

    #[tokio::test]
    async fn missing_login_field_is_a_validation_error() {
        let (status, body) = send(
            test_app(),
            post_json("/v1/login", r#"{"email":"a@x.com","password":"pw"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "app_id is required");
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_before_the_core() {
        let (status, body) = send(test_app(), post_json("/v1/register", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_body");
    }

    #[tokio::test]
    async fn non_numeric_user_id_is_a_validation_error() {
        let (status, body) = send(
            test_app(),
            Request::get("/v1/users/abc/admin").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}
