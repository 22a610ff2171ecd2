// src/common/config.rs
//! Environment-driven server configuration

use std::env;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-only-access-secret-change-me";
const DEV_JWT_REFRESH_SECRET: &str = "dev-only-refresh-secret-change-me";

/// JWT lifetimes and signing secrets
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: DEV_JWT_SECRET.to_string(),
            refresh_secret: DEV_JWT_REFRESH_SECRET.to_string(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

/// Google OAuth client settings; both credentials must be present for the
/// callback to work.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub callback_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            callback_url: "http://localhost:3000/api/auth/google/callback".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub tokens: TokenConfig,
    /// When false, auth cookies drop `Secure` and use `SameSite=Lax`.
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub frontend_url: String,
    pub google: GoogleConfig,
    /// bcrypt work factor for credential passwords.
    pub bcrypt_cost: u32,
    pub reset_db: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://finance.db".to_string(),
            port: 3000,
            tokens: TokenConfig::default(),
            cookie_secure: true,
            cors_origins: vec!["http://localhost:5173".to_string()],
            frontend_url: "http://localhost:3001".to_string(),
            google: GoogleConfig::default(),
            bcrypt_cost: 10,
            reset_db: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => config.tokens.access_secret = secret,
            _ => warn!("JWT_SECRET not set, using development secret"),
        }

        match env::var("JWT_REFRESH_SECRET") {
            Ok(secret) if !secret.is_empty() => config.tokens.refresh_secret = secret,
            _ => warn!("JWT_REFRESH_SECRET not set, using development secret"),
        }

        if let Some(ttl) = parse_env::<i64>("ACCESS_TOKEN_TTL_SECS") {
            config.tokens.access_ttl_secs = ttl;
        }

        if let Some(ttl) = parse_env::<i64>("REFRESH_TOKEN_TTL_SECS") {
            config.tokens.refresh_ttl_secs = ttl;
        }

        if let Ok(secure) = env::var("COOKIE_SECURE") {
            config.cookie_secure = secure.to_lowercase() != "false";
        }

        if let Ok(origins) = env::var("CORS_ORIGIN") {
            config.cors_origins = split_list(&origins);
        }

        if let Ok(url) = env::var("FRONTEND_URL") {
            config.frontend_url = url.trim_end_matches('/').to_string();
        }

        config.google.client_id = non_empty_env("GOOGLE_CLIENT_ID");
        config.google.client_secret = non_empty_env("GOOGLE_CLIENT_SECRET");
        if let Some(url) = non_empty_env("GOOGLE_CALLBACK_URL") {
            config.google.callback_url = url;
        }

        if let Some(cost) = parse_env::<u32>("BCRYPT_COST") {
            config.bcrypt_cost = cost;
        }

        config.reset_db = env::var("RESET_DB").map(|v| v == "true").unwrap_or(false);

        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
