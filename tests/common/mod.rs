// Shared harness for router-level tests: an in-memory database behind the
// full router, driven request by request with a tiny cookie jar.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tower::ServiceExt;

use finance_api::build_router;
use finance_api::common::{migrations::run_migrations, AppConfig, AppState};

pub fn test_config() -> AppConfig {
    AppConfig {
        cookie_secure: false,
        bcrypt_cost: 4,
        ..AppConfig::default()
    }
}

pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool, false).await.unwrap();
    pool
}

/// Serves the full router on an ephemeral local port and returns its base URL.
pub async fn spawn_server() -> String {
    let state = AppState::new(memory_pool().await, reqwest::Client::new(), test_config());
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    format!("http://{}", addr)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Every `Set-Cookie` header, raw.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub cookies: BTreeMap<String, String>,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = memory_pool().await;
        let state = AppState::new(pool.clone(), reqwest::Client::new(), test_config());
        Self {
            router: build_router(state),
            pool,
            cookies: BTreeMap::new(),
        }
    }

    /// A second session against the same server and database.
    pub fn fresh_session(&self) -> Self {
        Self {
            router: self.router.clone(),
            pool: self.pool.clone(),
            cookies: BTreeMap::new(),
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None).await
    }

    pub async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        let response = TestResponse {
            status,
            headers,
            body,
        };
        self.store_cookies(&response);
        response
    }

    fn store_cookies(&mut self, response: &TestResponse) {
        for raw in response.set_cookies() {
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let expired = raw.to_ascii_lowercase().contains("max-age=0");
            if expired || value.is_empty() {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    /// Registers and signs in a fresh user, returning its id.
    pub async fn register(&mut self, email: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                serde_json::json!({ "name": "Test", "email": email, "password": "secret123" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["user"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_category(&mut self, name: &str, kind: &str) -> String {
        let response = self
            .post(
                "/api/categories",
                serde_json::json!({ "name": name, "type": kind }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_transaction(
        &mut self,
        amount: &str,
        kind: &str,
        date: &str,
        category_id: Option<&str>,
    ) -> Value {
        let response = self
            .post(
                "/api/transactions",
                serde_json::json!({
                    "amount": amount,
                    "type": kind,
                    "date": date,
                    "categoryId": category_id,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}
