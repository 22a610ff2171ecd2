//! # Categories Module
//!
//! Per-user income and expense categories. Names are unique per user and
//! type.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::Category;
pub use routes::categories_routes;
pub use services::CategoriesService;
