//! Auth cookie helpers

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::models::TokenPair;
use crate::common::config::AppConfig;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

fn build_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .path("/")
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Adds both token cookies, replacing any existing ones.
pub fn set_auth_cookies(jar: CookieJar, tokens: &TokenPair, config: &AppConfig) -> CookieJar {
    jar.add(build_cookie(
        ACCESS_COOKIE,
        tokens.access_token.clone(),
        config.tokens.access_ttl_secs,
        config.cookie_secure,
    ))
    .add(build_cookie(
        REFRESH_COOKIE,
        tokens.refresh_token.clone(),
        config.tokens.refresh_ttl_secs,
        config.cookie_secure,
    ))
}

/// Expires both token cookies. Attributes must match the ones used when
/// setting them or browsers keep the originals.
pub fn clear_auth_cookies(jar: CookieJar, config: &AppConfig) -> CookieJar {
    jar.add(build_cookie(ACCESS_COOKIE, String::new(), 0, config.cookie_secure))
        .add(build_cookie(REFRESH_COOKIE, String::new(), 0, config.cookie_secure))
}
