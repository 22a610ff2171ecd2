// src/services/mod.rs
//
// Clients for external services

pub mod google;

pub use google::{GoogleError, GoogleProfile, GoogleService};
