// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::common::config::AppConfig;
use crate::services::GoogleService;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub google_service: Arc<GoogleService>,
}

/// The form in which handlers receive the state (`Extension<SharedState>`).
pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    /// `http` is the outbound client for the Google token and profile calls.
    pub fn new(db: SqlitePool, http: Client, config: AppConfig) -> Self {
        let google_service = Arc::new(GoogleService::new(http, config.google.clone()));
        Self {
            db,
            config,
            google_service,
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }
}
