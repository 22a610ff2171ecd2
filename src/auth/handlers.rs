//! Authentication handlers

use axum::{
    extract::{Extension, Json, Query},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use super::cookies::{clear_auth_cookies, set_auth_cookies, REFRESH_COOKIE};
use super::extractors::AuthedUser;
use super::models::{
    GoogleCallbackQuery, GoogleStatusResponse, LoginRequest, MessageResponse, RefreshRequest,
    RefreshResponse, RegisterRequest,
};
use super::services::AuthService;
use super::validators::{LoginValidator, RegisterValidator};
use crate::common::{ApiError, SharedState, Validator};

/// POST /api/auth/register
pub async fn register(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    RegisterValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let auth_service = AuthService::new(app_state.db.clone(), app_state.config.clone());

    let response = auth_service.register(request).await?;
    let jar = set_auth_cookies(jar, &response.tokens, &app_state.config);

    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// POST /api/auth/login
pub async fn login(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    LoginValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let auth_service = AuthService::new(app_state.db.clone(), app_state.config.clone());

    let response = auth_service.login(request).await?;
    let jar = set_auth_cookies(jar, &response.tokens, &app_state.config);

    Ok((jar, Json(response)))
}

/// POST /api/auth/refresh
///
/// Reads the refresh token from the `refreshToken` cookie, falling back to a
/// `{ "refreshToken": "..." }` body.
pub async fn refresh(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| body.and_then(|Json(b)| b.refresh_token))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Refresh token required".to_string()))?;

    let app_state = state.read().await;
    let auth_service = AuthService::new(app_state.db.clone(), app_state.config.clone());

    let tokens = auth_service.refresh(&refresh_token).await?;
    let jar = set_auth_cookies(jar, &tokens, &app_state.config);

    Ok((jar, Json(RefreshResponse { tokens })))
}

/// POST /api/auth/logout
///
/// Revokes the refresh token in the cookie, if any, and clears both cookies.
pub async fn logout(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;

    if let Some(token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()) {
        if !token.is_empty() {
            AuthService::new(app_state.db.clone(), app_state.config.clone())
                .logout(&token)
                .await?;
        }
    }

    let jar = clear_auth_cookies(jar, &app_state.config);

    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// POST /api/auth/logout-all
pub async fn logout_all(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;

    AuthService::new(app_state.db.clone(), app_state.config.clone())
        .logout_all(&user.id)
        .await?;

    let jar = clear_auth_cookies(jar, &app_state.config);

    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out from all devices successfully".to_string(),
        }),
    ))
}

/// GET /api/auth/demo
pub async fn demo_login(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let auth_service = AuthService::new(app_state.db.clone(), app_state.config.clone());

    let response = auth_service.demo_login().await?;
    let jar = set_auth_cookies(jar, &response.tokens, &app_state.config);

    Ok((jar, Json(response)))
}

// ============================================================================
// Google OAuth
// ============================================================================

/// 302 with a `Location` header
fn found(url: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, url.to_string())]).into_response()
}

/// GET /api/auth/google - redirect to Google's consent screen
pub async fn google_start(
    Extension(state): Extension<SharedState>,
) -> Result<Response, ApiError> {
    let app_state = state.read().await;

    let url = app_state.google_service.authorization_url().map_err(|e| {
        warn!(error = %e, "Google OAuth requested but not configured");
        ApiError::BadRequest("Google OAuth is not configured".to_string())
    })?;

    info!("Redirecting to Google OAuth consent screen");
    Ok(found(&url))
}

/// GET /api/auth/google/callback
///
/// Always answers with a redirect to the frontend; failures travel in the
/// `error` query parameter.
pub async fn google_callback(
    Extension(state): Extension<SharedState>,
    jar: CookieJar,
    Query(query): Query<GoogleCallbackQuery>,
) -> Response {
    let app_state = state.read().await;
    let callback_base = format!("{}/auth/callback", app_state.config.frontend_url);
    let failure = |message: &str| {
        found(&format!(
            "{}?error={}",
            callback_base,
            urlencoding::encode(message)
        ))
    };

    if let Some(err) = query.error.as_deref() {
        warn!(error = %err, "Google OAuth returned an error");
        return (jar, failure(err)).into_response();
    }

    let code = match query.code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => {
            warn!("Google OAuth callback without code");
            return (jar, failure("Missing authorization code")).into_response();
        }
    };

    let google = app_state.google_service.clone();
    let google_tokens = match google.exchange_code(code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!(error = %e, "Google code exchange failed");
            return (jar, failure("Google authentication failed")).into_response();
        }
    };

    let profile = match google.fetch_profile(&google_tokens.access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            error!(error = %e, "Failed to fetch Google profile");
            return (jar, failure("Failed to fetch Google profile")).into_response();
        }
    };

    let auth_service = AuthService::new(app_state.db.clone(), app_state.config.clone());
    match auth_service.google_login(&profile, &google_tokens).await {
        Ok(response) => {
            let jar = set_auth_cookies(jar, &response.tokens, &app_state.config);
            (jar, found(&format!("{}?success=true", callback_base))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Google login failed");
            (jar, failure("Authentication failed")).into_response()
        }
    }
}

/// GET /api/auth/google/status
pub async fn google_status(Extension(state): Extension<SharedState>) -> impl IntoResponse {
    let app_state = state.read().await;
    let status = app_state.google_service.status();

    Json(GoogleStatusResponse {
        configured: status.configured(),
        client_id_set: status.client_id_set,
        client_secret_set: status.client_secret_set,
        callback_url: status.callback_url,
        frontend_url: app_state.config.frontend_url.clone(),
    })
}

// ============================================================================
// Current user
// ============================================================================

/// GET /api/user/me
pub async fn me(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;

    let user = AuthService::new(app_state.db.clone(), app_state.config.clone())
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(serde_json::json!({ "user": user })))
}
