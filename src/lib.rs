// src/lib.rs
//! Personal finance tracking API: categories, transactions, monthly budgets
//! and cookie-based JWT sessions on top of SQLite.

use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::any::Any;
use std::str::FromStr;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::error;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod client;
pub mod common;
pub mod logging_middleware;
pub mod reporting;
pub mod services;
pub mod transactions;

use common::{ApiError, AppConfig, AppState, SharedState};

// ============================================================================
// DATABASE
// ============================================================================

/// Opens the SQLite pool, creating the database file when missing.
pub async fn connect_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path = path_part.split('?').next().unwrap_or("");
        if !path.is_empty() && !path.starts_with(':') {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    Ok(pool)
}

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

/// Builds the full application router around `state`.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let shared: SharedState = state.into_shared();

    Router::new()
        .merge(auth::auth_routes())
        .merge(auth::user_routes())
        .merge(categories::categories_routes())
        .merge(transactions::transactions_routes())
        .merge(budgets::budgets_routes())
        .route("/health", get(health))
        .layer(middleware::from_fn(logging_middleware::log_failed_requests))
        .layer(Extension(shared))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// A panicking handler still answers with the generic 500 body.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::InternalServer(format!("handler panicked: {}", detail)).into_response()
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// GET /health
async fn health(Extension(state): Extension<SharedState>) -> impl IntoResponse {
    let db = state.read().await.db.clone();

    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&db).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            error!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_panicking_handler_answers_with_generic_500() {
        let app = Router::new()
            .route(
                "/boom",
                get(|| async {
                    let total: Option<i64> = None;
                    total.expect("total overflowed");
                }),
            )
            .layer(CatchPanicLayer::custom(panic_response));

        let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
        assert!(!String::from_utf8_lossy(&bytes).contains("overflowed"));
    }
}
