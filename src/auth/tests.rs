//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - JWT issuing and verification
//! - Request validation
//! - Session lifecycle against an in-memory database

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::config::{AppConfig, TokenConfig};
    use crate::common::migrations::run_migrations;
    use crate::common::{ApiError, Validator};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    fn test_config() -> AppConfig {
        AppConfig {
            bcrypt_cost: 4,
            cookie_secure: false,
            ..AppConfig::default()
        }
    }

    async fn setup_service() -> (SqlitePool, AuthService) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool, false).await.unwrap();
        let service = AuthService::new(pool.clone(), test_config());
        (pool, service)
    }

    fn register_request(email: &str) -> models::RegisterRequest {
        models::RegisterRequest {
            name: Some("Test User".to_string()),
            email: email.to_string(),
            password: "secret123".to_string(),
        }
    }

    // ============================================================================
    // Tokens
    // ============================================================================

    #[test]
    fn test_token_pair_verifies() {
        let config = TokenConfig::default();
        let pair = tokens::issue_token_pair(&config, "U_TEST", "a@b.c").unwrap();

        let access = tokens::verify_access_token(&config, &pair.access_token).unwrap();
        assert_eq!(access.sub, "U_TEST");
        assert_eq!(access.email, "a@b.c");
        assert_eq!(access.kind, models::TokenKind::Access);
        assert_eq!(access.exp - access.iat, 900);

        let refresh = tokens::verify_refresh_token(&config, &pair.refresh_token).unwrap();
        assert_eq!(refresh.kind, models::TokenKind::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 604_800);
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let config = TokenConfig::default();
        let pair = tokens::issue_token_pair(&config, "U_TEST", "a@b.c").unwrap();

        assert!(tokens::verify_refresh_token(&config, &pair.access_token).is_err());
        assert!(tokens::verify_access_token(&config, &pair.refresh_token).is_err());
    }

    #[test]
    fn test_same_secret_still_checks_type() {
        let config = TokenConfig {
            refresh_secret: "shared".to_string(),
            access_secret: "shared".to_string(),
            ..TokenConfig::default()
        };
        let pair = tokens::issue_token_pair(&config, "U_TEST", "a@b.c").unwrap();

        let err = tokens::verify_access_token(&config, &pair.refresh_token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_pairs_issued_together_differ() {
        let config = TokenConfig::default();
        let a = tokens::issue_token_pair(&config, "U_TEST", "a@b.c").unwrap();
        let b = tokens::issue_token_pair(&config, "U_TEST", "a@b.c").unwrap();
        assert_ne!(a.access_token, b.access_token);
        assert_ne!(a.refresh_token, b.refresh_token);
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let config = TokenConfig::default();
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = models::Claims {
            sub: "U_TEST".to_string(),
            email: "a@b.c".to_string(),
            kind: models::TokenKind::Access,
            jti: "jti".to_string(),
            iat: now - 1000,
            exp: now - 10,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.access_secret.as_bytes()),
        )
        .unwrap();

        assert!(tokens::verify_access_token(&config, &token).is_err());
    }

    #[test]
    fn test_claims_serialize_type_field() {
        let claims = models::Claims {
            sub: "U_TEST".to_string(),
            email: "a@b.c".to_string(),
            kind: models::TokenKind::Refresh,
            jti: "jti".to_string(),
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "refresh");
    }

    // ============================================================================
    // Validators
    // ============================================================================

    #[test]
    fn test_register_validation() {
        let ok = register_request("user@example.com");
        assert!(validators::RegisterValidator.validate(&ok).is_valid);

        let bad_email = register_request("not-an-email");
        let result = validators::RegisterValidator.validate(&bad_email);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "email");

        let short_password = models::RegisterRequest {
            password: "12345".to_string(),
            ..register_request("user@example.com")
        };
        let result = validators::RegisterValidator.validate(&short_password);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "password");
    }

    #[test]
    fn test_login_validation() {
        let empty = models::LoginRequest {
            email: " ".to_string(),
            password: String::new(),
        };
        assert_eq!(validators::LoginValidator.validate(&empty).errors.len(), 2);
    }

    // ============================================================================
    // Service
    // ============================================================================

    #[tokio::test]
    async fn test_register_then_login() {
        let (_pool, service) = setup_service().await;

        let registered = service.register(register_request("user@example.com")).await.unwrap();
        assert!(registered.user.id.starts_with("U_"));
        assert_eq!(registered.user.name.as_deref(), Some("Test User"));

        let logged_in = service
            .login(models::LoginRequest {
                email: "user@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let (_pool, service) = setup_service().await;
        service.register(register_request("dup@example.com")).await.unwrap();

        let err = service
            .register(register_request("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (_pool, service) = setup_service().await;
        service.register(register_request("user@example.com")).await.unwrap();

        let err = service
            .login(models::LoginRequest {
                email: "user@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        match err {
            ApiError::Unauthorized(msg) => assert_eq!(msg, "Invalid email or password"),
            other => panic!("unexpected error {:?}", other),
        }

        let err = service
            .login(models::LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let (_pool, service) = setup_service().await;
        let session = service.register(register_request("user@example.com")).await.unwrap();

        let rotated = service.refresh(&session.tokens.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, session.tokens.refresh_token);

        let err = service
            .refresh(&session.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        assert!(service.refresh(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_requires_persisted_token() {
        let (_pool, service) = setup_service().await;
        let session = service.register(register_request("user@example.com")).await.unwrap();

        // Correctly signed but never stored.
        let forged = tokens::issue_token_pair(
            &test_config().tokens,
            &session.user.id,
            &session.user.email,
        )
        .unwrap();
        assert!(service.refresh(&forged.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_logout_and_logout_all() {
        let (_pool, service) = setup_service().await;
        let first = service.register(register_request("user@example.com")).await.unwrap();
        let second = service
            .login(models::LoginRequest {
                email: "user@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        let third = service
            .login(models::LoginRequest {
                email: "user@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        service.logout(&first.tokens.refresh_token).await.unwrap();
        assert!(service.refresh(&first.tokens.refresh_token).await.is_err());

        let revoked = service.logout_all(&first.user.id).await.unwrap();
        assert_eq!(revoked, 2);
        assert!(service.refresh(&second.tokens.refresh_token).await.is_err());
        assert!(service.refresh(&third.tokens.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_demo_login_seeds_once() {
        let (pool, service) = setup_service().await;

        let first = service.demo_login().await.unwrap();
        let second = service.demo_login().await.unwrap();
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(first.user.email, demo::DEMO_EMAIL);

        let (categories,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM categories WHERE user_id = ?")
                .bind(&first.user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        let (budgets,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM budgets WHERE user_id = ?")
            .bind(&first.user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        let (transactions,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE user_id = ?")
                .bind(&first.user.id)
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(categories, 6);
        assert_eq!(budgets, 3);
        assert_eq!(transactions, 11);

        let login = service
            .login(models::LoginRequest {
                email: demo::DEMO_EMAIL.to_string(),
                password: demo::DEMO_PASSWORD.to_string(),
            })
            .await;
        assert!(login.is_ok());
    }

    #[tokio::test]
    async fn test_google_login_links_existing_user() {
        use crate::services::google::{GoogleProfile, TokenResponse};

        let (pool, service) = setup_service().await;
        let registered = service.register(register_request("g@example.com")).await.unwrap();

        let profile = GoogleProfile {
            id: "google-sub-1".to_string(),
            email: Some("g@example.com".to_string()),
            verified_email: Some(true),
            name: Some("G User".to_string()),
            picture: None,
        };
        let google_tokens = TokenResponse {
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_in: Some(3600),
            token_type: Some("Bearer".to_string()),
            scope: None,
        };

        let first = service.google_login(&profile, &google_tokens).await.unwrap();
        let again = service.google_login(&profile, &google_tokens).await.unwrap();
        assert_eq!(first.user.id, registered.user.id);
        assert_eq!(again.user.id, registered.user.id);

        let (accounts,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE user_id = ? AND provider_id = 'google'")
                .bind(&registered.user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(accounts, 1);
    }
}
