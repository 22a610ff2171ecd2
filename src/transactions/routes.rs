use super::handlers;
use axum::{routing::get, Router};

/// Creates the transactions router. The fixed `summary` and `chart-data`
/// paths take priority over `/:id`.
pub fn transactions_routes() -> Router {
    Router::new()
        .route(
            "/api/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/api/transactions/summary", get(handlers::get_summary))
        .route("/api/transactions/chart-data", get(handlers::get_chart_data))
        .route(
            "/api/transactions/:id",
            get(handlers::get_transaction)
                .patch(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
}
