use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LedgerEntry;
use crate::common::money::{add_amounts, sub_amounts};
use crate::common::{ApiError, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Totals per direction; `balance = total_income - total_expense`.
pub fn summarize<'a, I>(entries: I) -> Result<Summary, ApiError>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    for entry in entries {
        match entry.kind {
            TransactionType::Income => total_income = add_amounts(total_income, entry.amount)?,
            TransactionType::Expense => total_expense = add_amounts(total_expense, entry.amount)?,
        }
    }

    Ok(Summary {
        total_income,
        total_expense,
        balance: sub_amounts(total_income, total_expense)?,
    })
}
