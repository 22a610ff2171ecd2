use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::models::{Budget, BudgetQuery, BudgetRow, CreateBudgetRequest, UpdateBudgetRequest};
use crate::categories::{CategoriesService, Category};
use crate::common::dates::{month_bounds, now_timestamp, DateRange};
use crate::common::money::amount_to_storage;
use crate::common::{generate_budget_id, ApiError, TransactionType};
use crate::reporting::BudgetFigures;
use crate::transactions::TransactionsService;

const SELECT_BUDGET: &str = r#"
    SELECT id, amount, month, year, category_id, user_id, created_at, updated_at
    FROM budgets
"#;

const DUPLICATE_BUDGET: &str = "Budget for this category and period already exists";

pub struct BudgetsService {
    db: SqlitePool,
}

impl BudgetsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Spent and remaining for the budget's category over its calendar month,
    /// recomputed from the expense rows on every call.
    pub async fn figures(&self, row: &BudgetRow) -> Result<BudgetFigures, ApiError> {
        let (start, end) = u32::try_from(row.month)
            .ok()
            .zip(i32::try_from(row.year).ok())
            .and_then(|(month, year)| month_bounds(year, month))
            .ok_or_else(|| {
                ApiError::InternalServer(format!(
                    "budget {} has invalid period {}-{}",
                    row.id, row.year, row.month
                ))
            })?;

        let expenses = TransactionsService::new(self.db.clone())
            .ledger(
                &row.user_id,
                &DateRange::between(start, end),
                Some(TransactionType::Expense),
                Some(&row.category_id),
            )
            .await?;

        BudgetFigures::compute(row.amount()?, expenses.into_iter().map(|e| e.amount))
    }

    async fn with_figures(&self, row: BudgetRow, category: Option<Category>) -> Result<Budget, ApiError> {
        let figures = self.figures(&row).await?;
        row.into_budget(category, figures)
    }

    async fn find_row(&self, user_id: &str, budget_id: &str) -> Result<BudgetRow, ApiError> {
        sqlx::query_as::<_, BudgetRow>(&format!("{} WHERE id = ? AND user_id = ?", SELECT_BUDGET))
            .bind(budget_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Budget not found".to_string()))
    }

    async fn category_of(&self, row: &BudgetRow) -> Result<Option<Category>, ApiError> {
        CategoriesService::new(self.db.clone())
            .find(&row.user_id, &row.category_id)
            .await
    }

    /// Newest period first.
    pub async fn list(&self, user_id: &str, query: &BudgetQuery) -> Result<Vec<Budget>, ApiError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_BUDGET);
        qb.push(" WHERE user_id = ").push_bind(user_id.to_string());
        if let Some(month) = query.month {
            qb.push(" AND month = ").push_bind(month);
        }
        if let Some(year) = query.year {
            qb.push(" AND year = ").push_bind(year);
        }
        qb.push(" ORDER BY year DESC, month DESC, created_at ASC");

        let rows: Vec<BudgetRow> = qb.build_query_as().fetch_all(&self.db).await?;
        let categories = CategoriesService::new(self.db.clone())
            .map_by_id(user_id)
            .await?;

        let mut budgets = Vec::with_capacity(rows.len());
        for row in rows {
            let category = categories.get(&row.category_id).cloned();
            budgets.push(self.with_figures(row, category).await?);
        }

        debug!(user_id = %user_id, count = budgets.len(), "Listed budgets");
        Ok(budgets)
    }

    pub async fn get(&self, user_id: &str, budget_id: &str) -> Result<Budget, ApiError> {
        let row = self.find_row(user_id, budget_id).await?;
        let category = self.category_of(&row).await?;
        self.with_figures(row, category).await
    }

    pub async fn create(&self, user_id: &str, request: CreateBudgetRequest) -> Result<Budget, ApiError> {
        let category = CategoriesService::new(self.db.clone())
            .get(user_id, &request.category_id)
            .await?;

        let now = now_timestamp();
        let row = BudgetRow {
            id: generate_budget_id(),
            amount: amount_to_storage(&request.amount),
            month: request.month,
            year: request.year,
            category_id: category.id.clone(),
            user_id: user_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO budgets (id, amount, month, year, category_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.amount)
        .bind(row.month)
        .bind(row.year)
        .bind(&row.category_id)
        .bind(&row.user_id)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_unique_violation(e, DUPLICATE_BUDGET))?;

        info!(
            user_id = %user_id,
            budget_id = %row.id,
            month = row.month,
            year = row.year,
            "Budget created"
        );
        self.with_figures(row, Some(category)).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        budget_id: &str,
        request: UpdateBudgetRequest,
    ) -> Result<Budget, ApiError> {
        let mut row = self.find_row(user_id, budget_id).await?;

        if let Some(amount) = &request.amount {
            row.amount = amount_to_storage(amount);
            row.updated_at = now_timestamp();

            sqlx::query("UPDATE budgets SET amount = ?, updated_at = ? WHERE id = ? AND user_id = ?")
                .bind(&row.amount)
                .bind(&row.updated_at)
                .bind(&row.id)
                .bind(user_id)
                .execute(&self.db)
                .await?;
        }

        let category = self.category_of(&row).await?;
        self.with_figures(row, category).await
    }

    /// Deletes the budget and returns it as it was just before removal.
    pub async fn delete(&self, user_id: &str, budget_id: &str) -> Result<Budget, ApiError> {
        let budget = self.get(user_id, budget_id).await?;

        sqlx::query("DELETE FROM budgets WHERE id = ? AND user_id = ?")
            .bind(budget_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(user_id = %user_id, budget_id = %budget_id, "Budget deleted");
        Ok(budget)
    }
}
