//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Email/password registration and login
//! - Access/refresh JWT issuing, rotation and revocation
//! - Google OAuth authorization-code flow
//! - Demo account login
//! - AuthedUser extractor for protected routes

pub mod cookies;
pub mod demo;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod tokens;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use routes::{auth_routes, user_routes};
pub use services::AuthService;
