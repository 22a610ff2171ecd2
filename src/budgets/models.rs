use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::categories::Category;
use crate::common::money::amount_from_storage;
use crate::common::ApiError;
use crate::reporting::BudgetFigures;

#[derive(FromRow, Debug, Clone)]
pub struct BudgetRow {
    pub id: String,
    pub amount: String,
    pub month: i64,
    pub year: i64,
    pub category_id: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl BudgetRow {
    pub fn amount(&self) -> Result<Decimal, ApiError> {
        amount_from_storage(&self.amount)
    }

    pub fn into_budget(
        self,
        category: Option<Category>,
        figures: BudgetFigures,
    ) -> Result<Budget, ApiError> {
        Ok(Budget {
            amount: self.amount()?,
            id: self.id,
            month: self.month,
            year: self.year,
            category_id: self.category_id,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            category,
            spent: figures.spent,
            remaining: figures.remaining,
        })
    }
}

/// Budget as returned by the API: the stored row, its category, and the
/// spent/remaining figures for its month.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub amount: Decimal,
    pub month: i64,
    pub year: i64,
    pub category_id: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub category: Option<Category>,
    #[serde(with = "rust_decimal::serde::float")]
    pub spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub amount: Decimal,
    pub month: i64,
    pub year: i64,
    pub category_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateBudgetRequest {
    pub amount: Option<Decimal>,
}

/// Query string of `GET /api/budgets`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BudgetQuery {
    pub month: Option<i64>,
    pub year: Option<i64>,
}
