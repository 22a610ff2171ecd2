//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/register`, `POST /api/auth/login` - credentials
/// - `POST /api/auth/refresh` - rotate the refresh token
/// - `POST /api/auth/logout`, `POST /api/auth/logout-all` - revoke sessions
/// - `GET /api/auth/google`, `GET /api/auth/google/callback`,
///   `GET /api/auth/google/status` - Google OAuth
/// - `GET /api/auth/demo` - demo account
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/logout-all", post(handlers::logout_all))
        .route("/api/auth/google", get(handlers::google_start))
        .route("/api/auth/google/callback", get(handlers::google_callback))
        .route("/api/auth/google/status", get(handlers::google_status))
        .route("/api/auth/demo", get(handlers::demo_login))
}

/// `GET /api/user/me`
pub fn user_routes() -> Router {
    Router::new().route("/api/user/me", get(handlers::me))
}
