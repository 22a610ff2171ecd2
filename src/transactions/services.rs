use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::models::{
    CreateTransactionRequest, Transaction, TransactionFilter, TransactionPage, TransactionRow,
    UpdateTransactionRequest,
};
use crate::categories::{Category, CategoriesService};
use crate::common::dates::{format_timestamp, now_timestamp, parse_date_input, parse_timestamp, DateRange};
use crate::common::money::{amount_from_storage, amount_to_storage};
use crate::common::{generate_transaction_id, ApiError, TransactionType};
use crate::reporting::{bucket_by_week, summarize, ChartPoint, LedgerEntry, Summary};

const SELECT_TRANSACTION: &str = r#"
    SELECT id, amount, type, description, date, category_id, user_id, created_at, updated_at
    FROM transactions
"#;

#[derive(FromRow)]
struct LedgerRow {
    date: String,
    #[sqlx(rename = "type")]
    kind: TransactionType,
    amount: String,
}

impl LedgerRow {
    fn into_entry(self) -> Result<LedgerEntry, ApiError> {
        let date = parse_timestamp(&self.date).ok_or_else(|| {
            ApiError::InternalServer(format!("corrupt transaction date '{}'", self.date))
        })?;
        Ok(LedgerEntry {
            date,
            kind: self.kind,
            amount: amount_from_storage(&self.amount)?,
        })
    }
}

/// Appends `WHERE user_id = ?` plus the optional filters.
fn push_conditions(
    qb: &mut QueryBuilder<'_, Sqlite>,
    user_id: &str,
    kind: Option<TransactionType>,
    category_id: Option<&str>,
    range: &DateRange,
) {
    qb.push(" WHERE user_id = ").push_bind(user_id.to_string());
    if let Some(kind) = kind {
        qb.push(" AND type = ").push_bind(kind);
    }
    if let Some(category_id) = category_id {
        qb.push(" AND category_id = ").push_bind(category_id.to_string());
    }
    if let Some(from) = &range.from {
        qb.push(" AND date >= ").push_bind(format_timestamp(from));
    }
    if let Some(to) = &range.to {
        qb.push(" AND date <= ").push_bind(format_timestamp(to));
    }
}

pub struct TransactionsService {
    db: SqlitePool,
}

impl TransactionsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn categories(&self) -> CategoriesService {
        CategoriesService::new(self.db.clone())
    }

    /// The caller's category, or 404 when it belongs to someone else.
    async fn owned_category(
        &self,
        user_id: &str,
        category_id: Option<&str>,
    ) -> Result<Option<Category>, ApiError> {
        match category_id {
            Some(id) => Ok(Some(self.categories().get(user_id, id).await?)),
            None => Ok(None),
        }
    }

    async fn find_row(&self, user_id: &str, transaction_id: &str) -> Result<TransactionRow, ApiError> {
        sqlx::query_as::<_, TransactionRow>(&format!(
            "{} WHERE id = ? AND user_id = ?",
            SELECT_TRANSACTION
        ))
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))
    }

    // ============================================================================
    // CRUD
    // ============================================================================

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, ApiError> {
        let category_id = request.category_id.filter(|id| !id.is_empty());
        let category = self.owned_category(user_id, category_id.as_deref()).await?;

        let date = match request.date.as_deref() {
            Some(raw) => parse_date_input("date", raw)?,
            None => Utc::now(),
        };
        let now = now_timestamp();

        let row = TransactionRow {
            id: generate_transaction_id(),
            amount: amount_to_storage(&request.amount),
            kind: request.kind,
            description: request.description,
            date: format_timestamp(&date),
            category_id,
            user_id: user_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO transactions (id, amount, type, description, date, category_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.amount)
        .bind(row.kind)
        .bind(&row.description)
        .bind(&row.date)
        .bind(&row.category_id)
        .bind(&row.user_id)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .execute(&self.db)
        .await?;

        info!(user_id = %user_id, transaction_id = %row.id, kind = %row.kind, "Transaction created");
        row.into_transaction(category)
    }

    /// One page of the caller's transactions, newest first, with the total
    /// number of matches.
    pub async fn list(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<TransactionPage, ApiError> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM transactions");
        push_conditions(
            &mut count_qb,
            user_id,
            filter.kind,
            filter.category_id.as_deref(),
            &filter.range,
        );
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(&self.db).await?;

        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_TRANSACTION);
        push_conditions(
            &mut qb,
            user_id,
            filter.kind,
            filter.category_id.as_deref(),
            &filter.range,
        );
        qb.push(" ORDER BY date DESC, created_at DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let rows: Vec<TransactionRow> = qb.build_query_as().fetch_all(&self.db).await?;
        let categories = self.categories().map_by_id(user_id).await?;

        let data = rows
            .into_iter()
            .map(|row| {
                let category = row
                    .category_id
                    .as_ref()
                    .and_then(|id| categories.get(id))
                    .cloned();
                row.into_transaction(category)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(user_id = %user_id, total = total, returned = data.len(), "Listed transactions");

        Ok(TransactionPage {
            data,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    pub async fn get(&self, user_id: &str, transaction_id: &str) -> Result<Transaction, ApiError> {
        let row = self.find_row(user_id, transaction_id).await?;
        let category = match row.category_id.as_deref() {
            Some(id) => self.categories().find(user_id, id).await?,
            None => None,
        };
        row.into_transaction(category)
    }

    pub async fn update(
        &self,
        user_id: &str,
        transaction_id: &str,
        request: UpdateTransactionRequest,
    ) -> Result<Transaction, ApiError> {
        let mut row = self.find_row(user_id, transaction_id).await?;

        if let Some(amount) = &request.amount {
            row.amount = amount_to_storage(amount);
        }
        if let Some(kind) = request.kind {
            row.kind = kind;
        }
        if let Some(description) = request.description {
            row.description = description.filter(|text| !text.is_empty());
        }
        if let Some(raw) = request.date.as_deref() {
            row.date = format_timestamp(&parse_date_input("date", raw)?);
        }
        match request.category_id {
            Some(Some(category_id)) if !category_id.is_empty() => {
                self.owned_category(user_id, Some(&category_id)).await?;
                row.category_id = Some(category_id);
            }
            Some(_) => row.category_id = None,
            None => {}
        }
        row.updated_at = now_timestamp();

        sqlx::query(
            r#"
            UPDATE transactions
            SET amount = ?, type = ?, description = ?, date = ?, category_id = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&row.amount)
        .bind(row.kind)
        .bind(&row.description)
        .bind(&row.date)
        .bind(&row.category_id)
        .bind(&row.updated_at)
        .bind(&row.id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        let category = match row.category_id.as_deref() {
            Some(id) => self.categories().find(user_id, id).await?,
            None => None,
        };
        row.into_transaction(category)
    }

    /// Deletes and returns the transaction.
    pub async fn delete(&self, user_id: &str, transaction_id: &str) -> Result<Transaction, ApiError> {
        let transaction = self.get(user_id, transaction_id).await?;

        sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(transaction_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(user_id = %user_id, transaction_id = %transaction_id, "Transaction deleted");
        Ok(transaction)
    }

    // ============================================================================
    // Aggregations
    // ============================================================================

    /// Date, type and amount of every matching transaction.
    pub async fn ledger(
        &self,
        user_id: &str,
        range: &DateRange,
        kind: Option<TransactionType>,
        category_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, ApiError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT date, type, amount FROM transactions");
        push_conditions(&mut qb, user_id, kind, category_id, range);
        qb.push(" ORDER BY date ASC");

        let rows: Vec<LedgerRow> = qb.build_query_as().fetch_all(&self.db).await?;
        rows.into_iter().map(LedgerRow::into_entry).collect()
    }

    pub async fn summary(&self, user_id: &str, range: &DateRange) -> Result<Summary, ApiError> {
        let entries = self.ledger(user_id, range, None, None).await?;
        summarize(&entries)
    }

    pub async fn chart_data(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChartPoint>, ApiError> {
        let entries = self
            .ledger(user_id, &DateRange::between(start, end), None, None)
            .await?;
        bucket_by_week(start, end, &entries)
    }
}
