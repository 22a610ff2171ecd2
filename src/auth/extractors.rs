//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use super::cookies::ACCESS_COOKIE;
use super::services::AuthService;
use super::tokens::verify_access_token;
use crate::common::{safe_email_log, ApiError, SharedState};

/// Authenticated user extractor
///
/// Reads the access token from `Authorization: Bearer <token>`, falling back
/// to the `accessToken` cookie, verifies it and checks that the user still
/// exists.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<SharedState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match bearer_token(parts).or_else(|| cookie_token(parts)) {
            Some(t) => t,
            None => {
                debug!("Authentication failed: no access token");
                return Err(ApiError::Unauthorized("Access token required".into()));
            }
        };

        let (db, config) = {
            let app_state = state_lock.read().await;
            (app_state.db.clone(), app_state.config.clone())
        };

        let claims = verify_access_token(&config.tokens, &token)?;

        let user = AuthService::new(db, config)
            .find_user_by_id(&claims.sub)
            .await?;

        match user {
            Some(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                })
            }
            None => {
                warn!(user_id = %claims.sub, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("User not found".into()))
            }
        }
    }
}
