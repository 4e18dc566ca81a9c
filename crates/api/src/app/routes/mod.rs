pub mod auth;
pub mod system;

use axum::{
    routing::{get, post},
    Router,
};

/// Versioned auth routes, mounted under `/v1`.
pub fn router() -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/users/:id/admin", get(auth::is_admin))
}
