use super::handlers;
use axum::{routing::get, Router};

/// Creates the budgets router
pub fn budgets_routes() -> Router {
    Router::new()
        .route(
            "/api/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/api/budgets/:id",
            get(handlers::get_budget)
                .patch(handlers::update_budget)
                .delete(handlers::delete_budget),
        )
}
