//! # Budgets Module
//!
//! Monthly spending limits per expense category. At most one budget exists
//! per user, category, month and year; `spent` and `remaining` are derived
//! from transactions whenever a budget is read.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::Budget;
pub use routes::budgets_routes;
pub use services::BudgetsService;
