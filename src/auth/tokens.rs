//! JWT issuing and stateless verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error};

use super::models::{Claims, TokenKind, TokenPair};
use crate::common::config::TokenConfig;
use crate::common::{generate_raw_id, ApiError};

const JTI_LENGTH: usize = 16;

fn secret_for(config: &TokenConfig, kind: TokenKind) -> &[u8] {
    match kind {
        TokenKind::Access => config.access_secret.as_bytes(),
        TokenKind::Refresh => config.refresh_secret.as_bytes(),
    }
}

fn ttl_for(config: &TokenConfig, kind: TokenKind) -> i64 {
    match kind {
        TokenKind::Access => config.access_ttl_secs,
        TokenKind::Refresh => config.refresh_ttl_secs,
    }
}

/// Sign a single token of `kind` for the given user.
pub fn issue_token(
    config: &TokenConfig,
    kind: TokenKind,
    user_id: &str,
    email: &str,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(ttl_for(config, kind));
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        kind,
        jti: generate_raw_id(JTI_LENGTH),
        iat: now.timestamp().max(0) as usize,
        exp: exp.timestamp().max(0) as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret_for(config, kind)),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error");
        ApiError::InternalServer("jwt error".to_string())
    })
}

pub fn issue_token_pair(
    config: &TokenConfig,
    user_id: &str,
    email: &str,
) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
        access_token: issue_token(config, TokenKind::Access, user_id, email)?,
        refresh_token: issue_token(config, TokenKind::Refresh, user_id, email)?,
    })
}

/// Signature, expiry and `type` check. No database involved.
pub fn verify_token(
    config: &TokenConfig,
    kind: TokenKind,
    token: &str,
) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret_for(config, kind)),
        &validation,
    )
    .map_err(|e| {
        debug!(error = %e, kind = ?kind, "JWT validation failed");
        match kind {
            TokenKind::Access => ApiError::Unauthorized("Invalid or expired access token".into()),
            TokenKind::Refresh => ApiError::Unauthorized("Invalid refresh token".into()),
        }
    })?;

    if decoded.claims.kind != kind {
        debug!(expected = ?kind, actual = ?decoded.claims.kind, "JWT type mismatch");
        return Err(ApiError::Unauthorized("Invalid token type".into()));
    }

    Ok(decoded.claims)
}

pub fn verify_access_token(config: &TokenConfig, token: &str) -> Result<Claims, ApiError> {
    verify_token(config, TokenKind::Access, token)
}

pub fn verify_refresh_token(config: &TokenConfig, token: &str) -> Result<Claims, ApiError> {
    verify_token(config, TokenKind::Refresh, token)
}
