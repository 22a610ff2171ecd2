// Common module - shared types and utilities across all modules

pub mod config;
pub mod dates;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod money;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{safe_email_log, safe_token_log};
pub use id_generator::*;
pub use money::TransactionType;
pub use state::{AppState, SharedState};
pub use validation::{ValidationError, ValidationResult, Validator};
