use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::models::{CreateCategoryRequest, UpdateCategoryRequest};
use super::services::CategoriesService;
use super::validators::{CreateCategoryValidator, UpdateCategoryValidator};
use crate::auth::AuthedUser;
use crate::common::{ApiError, SharedState, Validator};

/// GET /api/categories
pub async fn list_categories(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let categories = categories_service.list(&user.id).await?;

    Ok(Json(categories))
}

/// POST /api/categories
pub async fn create_category(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    CreateCategoryValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let category = categories_service.create(&user.id, request).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories/:id
pub async fn get_category(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let category = categories_service.get(&user.id, &category_id).await?;

    Ok(Json(category))
}

/// PATCH /api/categories/:id
pub async fn update_category(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(category_id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    UpdateCategoryValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let category = categories_service
        .update(&user.id, &category_id, request)
        .await?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let category = categories_service.delete(&user.id, &category_id).await?;

    Ok(Json(category))
}
