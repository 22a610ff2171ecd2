use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::categories::Category;
use crate::common::dates::DateRange;
use crate::common::money::amount_from_storage;
use crate::common::{ApiError, TransactionType};

/// Transaction row as stored; `amount` is decimal text.
#[derive(FromRow, Debug, Clone)]
pub struct TransactionRow {
    pub id: String,
    pub amount: String,
    #[sqlx(rename = "type")]
    pub kind: TransactionType,
    pub description: Option<String>,
    pub date: String,
    pub category_id: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TransactionRow {
    pub fn into_transaction(self, category: Option<Category>) -> Result<Transaction, ApiError> {
        Ok(Transaction {
            amount: amount_from_storage(&self.amount)?,
            id: self.id,
            kind: self.kind,
            description: self.description,
            date: self.date,
            category_id: self.category_id,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            category,
        })
    }
}

/// Transaction as returned by the API, with its category embedded
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: Option<String>,
    pub date: String,
    pub category_id: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub category: Option<Category>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: Option<String>,
    /// Defaults to now
    pub date: Option<String>,
    pub category_id: Option<String>,
}

/// Absent fields are left alone. `description` and `categoryId` may also be
/// `null` (or an empty string) to clear them.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    #[serde(
        default,
        deserialize_with = "crate::common::helpers::deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::common::helpers::deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<Option<String>>,
}

/// Query string of `GET /api/transactions`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category_id: Option<String>,
    /// Whole UTC day; takes precedence over the range
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `startDate`/`endDate` query of the summary and chart endpoints
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parsed list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category_id: Option<String>,
    pub range: DateRange,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransactionPage {
    pub data: Vec<Transaction>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
