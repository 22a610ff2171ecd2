// src/client/api.rs
use reqwest::{cookie::Jar, Client, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::ClientError;
use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::budgets::models::{BudgetQuery, CreateBudgetRequest, UpdateBudgetRequest};
use crate::budgets::Budget;
use crate::categories::models::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::categories::Category;
use crate::common::error::ErrorResponse;
use crate::reporting::{ChartPoint, Summary};
use crate::transactions::models::{
    CreateTransactionRequest, DateRangeQuery, TransactionPage, TransactionQuery,
    UpdateTransactionRequest,
};
use crate::transactions::Transaction;

/// One API call, kept whole so it can be replayed after a token refresh.
struct Call {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    /// Whether a 401 should trigger a refresh. Off for the auth endpoints,
    /// where 401 means bad credentials.
    renew: bool,
}

impl Call {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            renew: true,
        }
    }

    fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    fn query<Q: Serialize>(mut self, query: &Q) -> Result<Self, ClientError> {
        self.query = query_pairs(query)?;
        Ok(self)
    }

    fn without_renewal(mut self) -> Self {
        self.renew = false;
        self
    }
}

#[derive(serde::Deserialize)]
struct MeResponse {
    user: User,
}

/// HTTP client for the finance API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    cookies: Arc<Jar>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        let cookies = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(cookies.clone())
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            base_url,
            cookies,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Overrides a cookie in the jar, as if the server had set it.
    pub fn set_cookie(&self, name: &str, value: &str) {
        self.cookies
            .add_cookie_str(&format!("{}={}; Path=/", name, value), &self.base_url);
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))
    }

    async fn send(&self, call: &Call) -> Result<Response, ClientError> {
        let mut builder = self.http.request(call.method.clone(), self.url(&call.path)?);
        if !call.query.is_empty() {
            builder = builder.query(&call.query);
        }
        if let Some(body) = &call.body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    /// Sends `call`. A 401 on a renewable call triggers one refresh; when the
    /// refresh succeeds the call is replayed exactly once, otherwise the
    /// session is reported as expired.
    async fn request<T: DeserializeOwned>(&self, call: Call) -> Result<T, ClientError> {
        let response = self.send(&call).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !call.renew {
            return decode(response).await;
        }

        debug!(path = %call.path, "Access token rejected, refreshing session");
        if !self.try_refresh().await {
            return Err(ClientError::SessionExpired);
        }

        let retried = self.send(&call).await?;
        decode(retried).await
    }

    async fn try_refresh(&self) -> bool {
        let call = Call::new(Method::POST, "/api/auth/refresh");
        match self.send(&call).await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Session refresh rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "Session refresh request failed");
                false
            }
        }
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.request(
            Call::new(Method::POST, "/api/auth/register")
                .json(request)?
                .without_renewal(),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.request(
            Call::new(Method::POST, "/api/auth/login")
                .json(&request)?
                .without_renewal(),
        )
        .await
    }

    pub async fn demo_login(&self) -> Result<AuthResponse, ClientError> {
        self.request(Call::new(Method::GET, "/api/auth/demo").without_renewal())
            .await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let _: Value = self
            .request(Call::new(Method::POST, "/api/auth/logout").without_renewal())
            .await?;
        Ok(())
    }

    pub async fn logout_all(&self) -> Result<(), ClientError> {
        let _: Value = self
            .request(Call::new(Method::POST, "/api/auth/logout-all"))
            .await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        let response: MeResponse = self.request(Call::new(Method::GET, "/api/user/me")).await?;
        Ok(response.user)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.request(Call::new(Method::GET, "/api/categories")).await
    }

    pub async fn get_category(&self, id: &str) -> Result<Category, ClientError> {
        self.request(Call::new(Method::GET, format!("/api/categories/{}", id)))
            .await
    }

    pub async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<Category, ClientError> {
        self.request(Call::new(Method::POST, "/api/categories").json(request)?)
            .await
    }

    pub async fn update_category(
        &self,
        id: &str,
        request: &UpdateCategoryRequest,
    ) -> Result<Category, ClientError> {
        self.request(Call::new(Method::PATCH, format!("/api/categories/{}", id)).json(request)?)
            .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<Category, ClientError> {
        self.request(Call::new(Method::DELETE, format!("/api/categories/{}", id)))
            .await
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionPage, ClientError> {
        self.request(Call::new(Method::GET, "/api/transactions").query(query)?)
            .await
    }

    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, ClientError> {
        self.request(Call::new(Method::GET, format!("/api/transactions/{}", id)))
            .await
    }

    pub async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<Transaction, ClientError> {
        self.request(Call::new(Method::POST, "/api/transactions").json(request)?)
            .await
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        request: &UpdateTransactionRequest,
    ) -> Result<Transaction, ClientError> {
        self.request(
            Call::new(Method::PATCH, format!("/api/transactions/{}", id)).json(request)?,
        )
        .await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<Transaction, ClientError> {
        self.request(Call::new(Method::DELETE, format!("/api/transactions/{}", id)))
            .await
    }

    pub async fn summary(&self, range: &DateRangeQuery) -> Result<Summary, ClientError> {
        self.request(Call::new(Method::GET, "/api/transactions/summary").query(range)?)
            .await
    }

    pub async fn chart_data(&self, range: &DateRangeQuery) -> Result<Vec<ChartPoint>, ClientError> {
        self.request(Call::new(Method::GET, "/api/transactions/chart-data").query(range)?)
            .await
    }

    // ========================================================================
    // Budgets
    // ========================================================================

    pub async fn list_budgets(&self, query: &BudgetQuery) -> Result<Vec<Budget>, ClientError> {
        self.request(Call::new(Method::GET, "/api/budgets").query(query)?)
            .await
    }

    pub async fn get_budget(&self, id: &str) -> Result<Budget, ClientError> {
        self.request(Call::new(Method::GET, format!("/api/budgets/{}", id)))
            .await
    }

    pub async fn create_budget(&self, request: &CreateBudgetRequest) -> Result<Budget, ClientError> {
        self.request(Call::new(Method::POST, "/api/budgets").json(request)?)
            .await
    }

    pub async fn update_budget(
        &self,
        id: &str,
        request: &UpdateBudgetRequest,
    ) -> Result<Budget, ClientError> {
        self.request(Call::new(Method::PATCH, format!("/api/budgets/{}", id)).json(request)?)
            .await
    }

    pub async fn delete_budget(&self, id: &str) -> Result<Budget, ClientError> {
        self.request(Call::new(Method::DELETE, format!("/api/budgets/{}", id)))
            .await
    }
}

/// Turns a response into `T`, or into `ClientError::Api` carrying the
/// server's `error` message.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&bytes),
        });
    }

    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn error_message(bytes: &[u8]) -> String {
    match serde_json::from_slice::<ErrorResponse>(bytes) {
        Ok(body) => body.error,
        Err(_) => String::from_utf8_lossy(bytes).trim().to_string(),
    }
}

/// Flattens a query struct into string pairs, dropping unset fields.
pub(crate) fn query_pairs<Q: Serialize>(query: &Q) -> Result<Vec<(String, String)>, ClientError> {
    let pairs = match serde_json::to_value(query)? {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(pairs)
}
