use chrono::{Duration, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::demo::{self, DEMO_EMAIL, DEMO_NAME, DEMO_PASSWORD};
use super::models::{
    Account, AuthResponse, LoginRequest, PublicUser, RegisterRequest, TokenPair, User,
};
use super::password::{hash_password, verify_password};
use super::tokens::{issue_token_pair, verify_refresh_token};
use crate::common::config::AppConfig;
use crate::common::dates::{format_timestamp, now_timestamp};
use crate::common::{
    generate_account_id, generate_refresh_token_id, generate_user_id, safe_email_log,
    safe_token_log, ApiError,
};
use crate::services::google::{GoogleProfile, TokenResponse};

pub const CREDENTIALS_PROVIDER: &str = "credentials";
pub const GOOGLE_PROVIDER: &str = "google";

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService {
    db: SqlitePool,
    config: AppConfig,
}

impl AuthService {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self { db, config }
    }

    // ============================================================================
    // User lookup
    // ============================================================================

    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, image, email_verified, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, image, email_verified, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_account(
        &self,
        user_id: &str,
        provider_id: &str,
    ) -> Result<Option<Account>, ApiError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, user_id, provider_id, account_id, password
            FROM accounts
            WHERE user_id = ? AND provider_id = ?
            "#,
        )
        .bind(user_id)
        .bind(provider_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    // ============================================================================
    // Credentials
    // ============================================================================

    /// Creates a user with a `credentials` account and starts a session.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let email = request.email.trim().to_string();

        if self.find_user_by_email(&email).await?.is_some() {
            warn!(email = %safe_email_log(&email), "Registration rejected: email already in use");
            return Err(ApiError::Conflict("User with this email already exists".to_string()));
        }

        let password_hash = hash_password(&request.password, self.config.bcrypt_cost).await?;
        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let mut tx = self.db.begin().await?;
        let user = insert_user(&mut tx, name.as_deref(), &email, None, None).await?;
        insert_credentials_account(&mut tx, &user.id, &email, &password_hash).await?;
        tx.commit().await?;

        info!(user_id = %user.id, email = %safe_email_log(&email), "User registered");

        self.start_session(&user).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        let email = request.email.trim();

        let user = match self.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!(email = %safe_email_log(email), "Login failed: unknown email");
                return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let hash = self
            .find_account(&user.id, CREDENTIALS_PROVIDER)
            .await?
            .and_then(|account| account.password);

        let hash = match hash {
            Some(hash) => hash,
            None => {
                debug!(user_id = %user.id, "Login failed: no credentials account");
                return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&request.password, &hash).await? {
            debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User logged in");

        self.start_session(&user).await
    }

    // ============================================================================
    // Sessions
    // ============================================================================

    /// Issues a token pair and persists the refresh token.
    pub async fn issue_session(&self, user: &User) -> Result<TokenPair, ApiError> {
        let tokens = issue_token_pair(&self.config.tokens, &user.id, &user.email)?;
        self.store_refresh_token(&user.id, &tokens.refresh_token)
            .await?;
        Ok(tokens)
    }

    async fn start_session(&self, user: &User) -> Result<AuthResponse, ApiError> {
        let tokens = self.issue_session(user).await?;
        Ok(AuthResponse {
            user: PublicUser::from(user),
            tokens,
        })
    }

    async fn store_refresh_token(&self, user_id: &str, token: &str) -> Result<(), ApiError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.tokens.refresh_ttl_secs);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, token, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_refresh_token_id())
        .bind(token)
        .bind(user_id)
        .bind(format_timestamp(&expires_at))
        .bind(format_timestamp(&now))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Rotates a refresh token: the presented token is revoked and a new pair
    /// is issued. A token that is unknown, expired, already revoked or signed
    /// with the wrong secret is rejected with 401.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let claims = verify_refresh_token(&self.config.tokens, refresh_token)?;
        let now = now_timestamp();

        // Conditional update so two concurrent refreshes cannot both succeed.
        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = ?
            WHERE token = ? AND user_id = ? AND revoked_at IS NULL AND expires_at > ?
            "#,
        )
        .bind(&now)
        .bind(refresh_token)
        .bind(&claims.sub)
        .bind(&now)
        .execute(&self.db)
        .await?
        .rows_affected();

        if revoked == 0 {
            warn!(
                user_id = %claims.sub,
                token = %safe_token_log(refresh_token),
                "Refresh rejected: token revoked, expired or unknown"
            );
            return Err(ApiError::Unauthorized("Invalid refresh token".to_string()));
        }

        let user = self
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

        debug!(user_id = %user.id, "Refresh token rotated");

        self.issue_session(&user).await
    }

    /// Revokes a single refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = ? WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(now_timestamp())
        .bind(refresh_token)
        .execute(&self.db)
        .await?;

        debug!(revoked = result.rows_affected(), "Logout processed");
        Ok(())
    }

    /// Revokes every outstanding refresh token of the user.
    pub async fn logout_all(&self, user_id: &str) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = ? WHERE user_id = ? AND revoked_at IS NULL",
        )
        .bind(now_timestamp())
        .bind(user_id)
        .execute(&self.db)
        .await?;

        info!(user_id = %user_id, revoked = result.rows_affected(), "Logged out all sessions");
        Ok(result.rows_affected())
    }

    // ============================================================================
    // Google and demo
    // ============================================================================

    /// Finds or creates the user behind a Google profile, records the provider
    /// tokens and starts a session.
    pub async fn google_login(
        &self,
        profile: &GoogleProfile,
        google_tokens: &TokenResponse,
    ) -> Result<AuthResponse, ApiError> {
        let email = profile
            .email
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("Google account has no email".to_string()))?;

        let now = Utc::now();
        let verified_at = match profile.verified_email {
            Some(true) => Some(format_timestamp(&now)),
            _ => None,
        };

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, image, email_verified, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;

        let user = match existing {
            Some(user) => user,
            None => {
                let user = insert_user(
                    &mut tx,
                    profile.name.as_deref(),
                    email,
                    profile.picture.as_deref(),
                    verified_at.as_deref(),
                )
                .await?;
                info!(user_id = %user.id, email = %safe_email_log(email), "Created user from Google profile");
                user
            }
        };

        let token_expires_at = google_tokens
            .expires_in
            .map(|secs| format_timestamp(&(now + Duration::seconds(secs))));
        let timestamp = format_timestamp(&now);

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, user_id, provider_id, account_id, access_token, refresh_token,
                access_token_expires_at, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, provider_id) DO UPDATE SET
                account_id = excluded.account_id,
                access_token = excluded.access_token,
                refresh_token = COALESCE(excluded.refresh_token, accounts.refresh_token),
                access_token_expires_at = excluded.access_token_expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(generate_account_id())
        .bind(&user.id)
        .bind(GOOGLE_PROVIDER)
        .bind(&profile.id)
        .bind(&google_tokens.access_token)
        .bind(&google_tokens.refresh_token)
        .bind(&token_expires_at)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user_id = %user.id, "Google login");

        self.start_session(&user).await
    }

    /// Logs in as the shared demo user, creating and seeding it on first use.
    pub async fn demo_login(&self) -> Result<AuthResponse, ApiError> {
        let user = match self.find_user_by_email(DEMO_EMAIL).await? {
            Some(user) => user,
            None => {
                let password_hash = hash_password(DEMO_PASSWORD, self.config.bcrypt_cost).await?;

                let mut tx = self.db.begin().await?;
                let user = insert_user(&mut tx, Some(DEMO_NAME), DEMO_EMAIL, None, None).await?;
                insert_credentials_account(&mut tx, &user.id, DEMO_EMAIL, &password_hash).await?;
                demo::seed_demo_data(&mut tx, &user.id).await?;
                tx.commit().await?;

                info!(user_id = %user.id, "Created demo user");
                user
            }
        };

        self.start_session(&user).await
    }
}

async fn insert_user(
    tx: &mut Transaction<'_, Sqlite>,
    name: Option<&str>,
    email: &str,
    image: Option<&str>,
    email_verified: Option<&str>,
) -> Result<User, ApiError> {
    let now = now_timestamp();
    let user = User {
        id: generate_user_id(),
        name: name.map(str::to_string),
        email: email.to_string(),
        image: image.map(str::to_string),
        email_verified: email_verified.map(str::to_string),
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, image, email_verified, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.image)
    .bind(&user.email_verified)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| ApiError::from_unique_violation(e, "User with this email already exists"))?;

    Ok(user)
}

async fn insert_credentials_account(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
    email: &str,
    password_hash: &str,
) -> Result<(), ApiError> {
    let now = now_timestamp();
    sqlx::query(
        r#"
        INSERT INTO accounts (id, user_id, provider_id, account_id, password, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(generate_account_id())
    .bind(user_id)
    .bind(CREDENTIALS_PROVIDER)
    .bind(email)
    .bind(password_hash)
    .bind(&now)
    .bind(&now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
