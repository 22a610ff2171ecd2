//! # Transactions Module
//!
//! This module handles income and expense records including:
//! - Transaction CRUD with optional category
//! - Filtered, paginated listing
//! - Summary totals and weekly chart data

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use models::Transaction;
pub use routes::transactions_routes;
pub use services::TransactionsService;
