use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::models::{
    CreateTransactionRequest, DateRangeQuery, TransactionQuery, UpdateTransactionRequest,
};
use super::services::TransactionsService;
use super::validators::{CreateTransactionValidator, UpdateTransactionValidator};
use crate::auth::AuthedUser;
use crate::common::{ApiError, SharedState, Validator};

/// GET /api/transactions
pub async fn list_transactions(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter()?;

    let app_state = state.read().await;
    let transactions_service = TransactionsService::new(app_state.db.clone());

    let page = transactions_service.list(&user.id, &filter).await?;

    Ok(Json(page))
}

/// POST /api/transactions
pub async fn create_transaction(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    CreateTransactionValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let transactions_service = TransactionsService::new(app_state.db.clone());

    let transaction = transactions_service.create(&user.id, request).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /api/transactions/summary
pub async fn get_summary(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.optional_range()?;

    let app_state = state.read().await;
    let transactions_service = TransactionsService::new(app_state.db.clone());

    let summary = transactions_service.summary(&user.id, &range).await?;

    Ok(Json(summary))
}

/// GET /api/transactions/chart-data
pub async fn get_chart_data(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (start, end) = query.required_range()?;

    let app_state = state.read().await;
    let transactions_service = TransactionsService::new(app_state.db.clone());

    let points = transactions_service.chart_data(&user.id, start, end).await?;

    Ok(Json(points))
}

/// GET /api/transactions/:id
pub async fn get_transaction(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let transactions_service = TransactionsService::new(app_state.db.clone());

    let transaction = transactions_service.get(&user.id, &transaction_id).await?;

    Ok(Json(transaction))
}

/// PATCH /api/transactions/:id
pub async fn update_transaction(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(transaction_id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    UpdateTransactionValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let transactions_service = TransactionsService::new(app_state.db.clone());

    let transaction = transactions_service
        .update(&user.id, &transaction_id, request)
        .await?;

    Ok(Json(transaction))
}

/// DELETE /api/transactions/:id
pub async fn delete_transaction(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let transactions_service = TransactionsService::new(app_state.db.clone());

    let transaction = transactions_service
        .delete(&user.id, &transaction_id)
        .await?;

    Ok(Json(transaction))
}
