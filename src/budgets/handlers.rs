use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::models::{BudgetQuery, CreateBudgetRequest, UpdateBudgetRequest};
use super::services::BudgetsService;
use super::validators::{BudgetQueryValidator, CreateBudgetValidator, UpdateBudgetValidator};
use crate::auth::AuthedUser;
use crate::common::{ApiError, SharedState, Validator};

/// GET /api/budgets
pub async fn list_budgets(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Query(query): Query<BudgetQuery>,
) -> Result<impl IntoResponse, ApiError> {
    BudgetQueryValidator.validate(&query).into_result()?;

    let app_state = state.read().await;
    let budgets_service = BudgetsService::new(app_state.db.clone());

    let budgets = budgets_service.list(&user.id, &query).await?;

    Ok(Json(budgets))
}

/// POST /api/budgets
pub async fn create_budget(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    CreateBudgetValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let budgets_service = BudgetsService::new(app_state.db.clone());

    let budget = budgets_service.create(&user.id, request).await?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// GET /api/budgets/:id
pub async fn get_budget(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(budget_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let budgets_service = BudgetsService::new(app_state.db.clone());

    let budget = budgets_service.get(&user.id, &budget_id).await?;

    Ok(Json(budget))
}

/// PATCH /api/budgets/:id
pub async fn update_budget(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(budget_id): Path<String>,
    Json(request): Json<UpdateBudgetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    UpdateBudgetValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let budgets_service = BudgetsService::new(app_state.db.clone());

    let budget = budgets_service.update(&user.id, &budget_id, request).await?;

    Ok(Json(budget))
}

/// DELETE /api/budgets/:id
pub async fn delete_budget(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(budget_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let budgets_service = BudgetsService::new(app_state.db.clone());

    let budget = budgets_service.delete(&user.id, &budget_id).await?;

    Ok(Json(budget))
}
