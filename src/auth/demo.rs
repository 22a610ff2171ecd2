//! Demo account and its sample ledger

use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::info;

use crate::common::dates::format_timestamp;
use crate::common::{
    generate_budget_id, generate_category_id, generate_transaction_id, ApiError, TransactionType,
};

pub const DEMO_EMAIL: &str = "demo@user.in";
pub const DEMO_PASSWORD: &str = "demo123456";
pub const DEMO_NAME: &str = "Demo User";

struct SeedCategory {
    name: &'static str,
    kind: TransactionType,
    icon: &'static str,
    color: &'static str,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory { name: "Groceries", kind: TransactionType::Expense, icon: "🛒", color: "#FF5733" },
    SeedCategory { name: "Transport", kind: TransactionType::Expense, icon: "🚗", color: "#3498DB" },
    SeedCategory { name: "Entertainment", kind: TransactionType::Expense, icon: "🎬", color: "#9B59B6" },
    SeedCategory { name: "Utilities", kind: TransactionType::Expense, icon: "💡", color: "#F39C12" },
    SeedCategory { name: "Salary", kind: TransactionType::Income, icon: "💰", color: "#27AE60" },
    SeedCategory { name: "Freelance", kind: TransactionType::Income, icon: "💻", color: "#2ECC71" },
];

/// (category, amount)
const BUDGETS: &[(&str, &str)] = &[
    ("Groceries", "500"),
    ("Transport", "200"),
    ("Entertainment", "150"),
];

/// (description, category, amount, day of month)
const TRANSACTIONS: &[(&str, &str, &str, u32)] = &[
    ("Monthly Salary", "Salary", "5000", 1),
    ("Freelance Project", "Freelance", "800", 10),
    ("Weekly groceries", "Groceries", "150", 3),
    ("Grocery shopping", "Groceries", "85", 10),
    ("Supermarket run", "Groceries", "120", 17),
    ("Gas refill", "Transport", "50", 5),
    ("Uber rides", "Transport", "35", 12),
    ("Movie tickets", "Entertainment", "45", 8),
    ("Netflix subscription", "Entertainment", "30", 1),
    ("Electricity bill", "Utilities", "95", 15),
    ("Internet bill", "Utilities", "45", 15),
];

/// Inserts the sample categories, budgets and transactions for the current
/// UTC month. Runs inside the caller's transaction so a half-seeded demo
/// user is never visible.
pub async fn seed_demo_data(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
) -> Result<(), ApiError> {
    let today = Utc::now().date_naive();
    let (year, month) = (today.year(), today.month());
    let now = format_timestamp(&Utc::now());

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for category in CATEGORIES {
        let id = generate_category_id();
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, type, icon, color, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(category.name)
        .bind(category.kind)
        .bind(category.icon)
        .bind(category.color)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut **tx)
        .await?;
        category_ids.push((category.name, category.kind, id));
    }

    let lookup = |name: &str| {
        category_ids
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, kind, id)| (*kind, id.clone()))
            .ok_or_else(|| ApiError::InternalServer(format!("unknown demo category {}", name)))
    };

    for (category, amount) in BUDGETS {
        let (_, category_id) = lookup(category)?;
        sqlx::query(
            r#"
            INSERT INTO budgets (id, amount, month, year, category_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_budget_id())
        .bind(*amount)
        .bind(month as i64)
        .bind(year as i64)
        .bind(&category_id)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut **tx)
        .await?;
    }

    for (description, category, amount, day) in TRANSACTIONS {
        let (kind, category_id) = lookup(category)?;
        let date = NaiveDate::from_ymd_opt(year, month, *day)
            .map(|d| format_timestamp(&Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))))
            .ok_or_else(|| ApiError::InternalServer("invalid demo date".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, amount, type, description, date, category_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_transaction_id())
        .bind(*amount)
        .bind(kind)
        .bind(*description)
        .bind(&date)
        .bind(&category_id)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut **tx)
        .await?;
    }

    info!(
        user_id = %user_id,
        categories = CATEGORIES.len(),
        budgets = BUDGETS.len(),
        transactions = TRANSACTIONS.len(),
        "Seeded demo data"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_references_known_categories() {
        for (category, _) in BUDGETS {
            assert!(CATEGORIES.iter().any(|c| c.name == *category));
        }
        for (_, category, _, day) in TRANSACTIONS {
            assert!(CATEGORIES.iter().any(|c| c.name == *category));
            assert!(*day >= 1 && *day <= 28);
        }
    }

    #[test]
    fn test_groceries_total() {
        let total: i64 = TRANSACTIONS
            .iter()
            .filter(|(_, category, _, _)| *category == "Groceries")
            .map(|(_, _, amount, _)| amount.parse::<i64>().unwrap())
            .sum();
        assert_eq!(total, 355);
    }
}
