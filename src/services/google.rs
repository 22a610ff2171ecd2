// src/services/google.rs
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::common::config::GoogleConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Google account has no email address")]
    MissingEmail,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// Profile returned by the userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub email: Option<String>,
    pub verified_email: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// What the status endpoint reports about the OAuth setup
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleStatus {
    pub client_id_set: bool,
    pub client_secret_set: bool,
    pub callback_url: String,
}

impl GoogleStatus {
    pub fn configured(&self) -> bool {
        self.client_id_set && self.client_secret_set
    }
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    client: Client,
    config: GoogleConfig,
}

impl GoogleService {
    pub fn new(client: Client, config: GoogleConfig) -> Self {
        Self { client, config }
    }

    pub fn status(&self) -> GoogleStatus {
        GoogleStatus {
            client_id_set: self.config.client_id.is_some(),
            client_secret_set: self.config.client_secret.is_some(),
            callback_url: self.config.callback_url.clone(),
        }
    }

    /// Consent screen URL the browser is redirected to.
    pub fn authorization_url(&self) -> Result<String, GoogleError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(GoogleError::NotConfigured)?;

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            AUTH_ENDPOINT,
            urlencoding::encode(client_id),
            urlencoding::encode(&self.config.callback_url),
            urlencoding::encode("email profile")
        );

        debug!("Generated Google OAuth authorization URL");
        Ok(auth_url)
    }

    /// Exchange authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, GoogleError> {
        let (client_id, client_secret) = match (&self.config.client_id, &self.config.client_secret)
        {
            (Some(id), Some(secret)) => (id.as_str(), secret.as_str()),
            _ => return Err(GoogleError::NotConfigured),
        };

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(GoogleError::OAuthFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, GoogleError> {
        let response = self
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleError::RequestFailed(
                "Failed to get user info".to_string(),
            ));
        }

        let profile = response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

        if profile.email.as_deref().map_or(true, str::is_empty) {
            return Err(GoogleError::MissingEmail);
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> GoogleConfig {
        GoogleConfig {
            client_id: Some("test_client_id".to_string()),
            client_secret: Some("test_secret".to_string()),
            callback_url: "http://localhost:3000/api/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_not_configured() {
        let google_service = GoogleService::new(Client::new(), GoogleConfig::default());
        let result = google_service.authorization_url();
        assert!(matches!(result.unwrap_err(), GoogleError::NotConfigured));
    }

    #[test]
    fn test_get_authorization_url() {
        let google_service = GoogleService::new(Client::new(), configured());
        let auth_url = google_service.authorization_url().unwrap();

        assert!(auth_url.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
        assert!(auth_url.contains("client_id=test_client_id"));
        assert!(auth_url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fapi%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(auth_url.contains("scope=email%20profile"));
        assert!(auth_url.contains("access_type=offline"));
        assert!(auth_url.contains("prompt=consent"));
    }

    #[test]
    fn test_status() {
        let status = GoogleService::new(Client::new(), GoogleConfig::default()).status();
        assert!(!status.configured());

        let mut config = configured();
        config.client_secret = None;
        let status = GoogleService::new(Client::new(), config).status();
        assert!(status.client_id_set);
        assert!(!status.client_secret_set);
        assert!(!status.configured());

        assert!(GoogleService::new(Client::new(), configured())
            .status()
            .configured());
    }

    #[tokio::test]
    async fn test_exchange_code_requires_secret() {
        let mut config = configured();
        config.client_secret = None;
        let google_service = GoogleService::new(Client::new(), config);
        let result = google_service.exchange_code("code").await;
        assert!(matches!(result.unwrap_err(), GoogleError::NotConfigured));
    }
}
