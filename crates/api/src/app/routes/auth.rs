//! Register, login and admin-query handlers.
//!
//! Handlers only shape and validate input; every decision is made by
//! [`keygate_auth::AuthService`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::dto::{
    parse_user_id, IsAdminResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use crate::app::{errors, services::AppServices};

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /v1/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    if let Err(e) = body.validate() {
        return errors::validation_error(e);
    }

    match services.auth().register(&body.email, &body.password).await {
        Ok(user_id) => (StatusCode::CREATED, Json(RegisterResponse { user_id })).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /v1/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let app_id = match body.validate() {
        Ok(app_id) => app_id,
        Err(e) => return errors::validation_error(e),
    };

    match services.auth().login(&body.email, &body.password, app_id).await {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /v1/users/:id/admin
pub async fn is_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw_id): Path<String>,
) -> axum::response::Response {
    let user_id = match parse_user_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return errors::validation_error(e),
    };

    match services.auth().is_admin(user_id).await {
        Ok(is_admin) => (StatusCode::OK, Json(IsAdminResponse { is_admin })).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
