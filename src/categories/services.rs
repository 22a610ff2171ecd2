use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::info;

use super::models::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::common::dates::now_timestamp;
use crate::common::{generate_category_id, ApiError};

const DUPLICATE_CATEGORY: &str = "Category with this name already exists";

pub struct CategoriesService {
    db: SqlitePool,
}

impl CategoriesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All categories of the user, by name
    pub async fn list(&self, user_id: &str) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, type, icon, color, user_id, created_at, updated_at
            FROM categories
            WHERE user_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Categories of the user keyed by id, for embedding in other responses.
    pub async fn map_by_id(&self, user_id: &str) -> Result<HashMap<String, Category>, ApiError> {
        Ok(self
            .list(user_id)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect())
    }

    pub async fn find(&self, user_id: &str, category_id: &str) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, type, icon, color, user_id, created_at, updated_at
            FROM categories
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(category_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(category)
    }

    /// Another user's category is reported exactly like a missing one.
    pub async fn get(&self, user_id: &str, category_id: &str) -> Result<Category, ApiError> {
        self.find(user_id, category_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateCategoryRequest,
    ) -> Result<Category, ApiError> {
        let now = now_timestamp();
        let category = Category {
            id: generate_category_id(),
            name: request.name.trim().to_string(),
            kind: request.kind,
            icon: request.icon,
            color: request.color,
            user_id: user_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, type, icon, color, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.kind)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(&category.user_id)
        .bind(&category.created_at)
        .bind(&category.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_unique_violation(e, DUPLICATE_CATEGORY))?;

        info!(user_id = %user_id, category_id = %category.id, "Category created");
        Ok(category)
    }

    pub async fn update(
        &self,
        user_id: &str,
        category_id: &str,
        request: UpdateCategoryRequest,
    ) -> Result<Category, ApiError> {
        let mut category = self.get(user_id, category_id).await?;

        if let Some(name) = request.name {
            category.name = name.trim().to_string();
        }
        if let Some(kind) = request.kind {
            category.kind = kind;
        }
        if request.icon.is_some() {
            category.icon = request.icon;
        }
        if request.color.is_some() {
            category.color = request.color;
        }
        category.updated_at = now_timestamp();

        sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, type = ?, icon = ?, color = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&category.name)
        .bind(category.kind)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(&category.updated_at)
        .bind(&category.id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_unique_violation(e, DUPLICATE_CATEGORY))?;

        Ok(category)
    }

    /// Deletes the category and returns it. Its transactions keep existing
    /// without a category; its budgets are removed.
    pub async fn delete(&self, user_id: &str, category_id: &str) -> Result<Category, ApiError> {
        let category = self.get(user_id, category_id).await?;

        sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(category_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(user_id = %user_id, category_id = %category_id, "Category deleted");
        Ok(category)
    }
}
