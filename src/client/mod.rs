//! # Client Module
//!
//! A cookie-carrying HTTP client for the finance API. The server keeps the
//! session in `accessToken`/`refreshToken` cookies; this client stores them
//! in a cookie jar and transparently renews an expired access token once
//! per call.

pub mod api;
pub mod error;


pub use api::ApiClient;
pub use error::ClientError;
