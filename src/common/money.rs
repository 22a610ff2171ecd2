// src/common/money.rs
//! Transaction direction and decimal amount storage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ApiError;

/// Direction of money flow, shared by transactions and categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// Largest amount a transaction or budget may carry (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Amounts are kept to cents.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Why `amount` cannot be accepted as money, if it cannot.
pub fn amount_bounds_error(amount: &Decimal) -> Option<String> {
    if *amount > MAX_AMOUNT {
        Some(format!("Amount must not exceed {}", MAX_AMOUNT))
    } else if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        Some(format!(
            "Amount must have at most {} decimal places",
            MAX_AMOUNT_SCALE
        ))
    } else {
        None
    }
}

/// Adds an amount to a running total. Totals are only ever built from
/// stored rows, so an overflow means the data itself is out of range.
pub fn add_amounts(total: Decimal, amount: Decimal) -> Result<Decimal, ApiError> {
    total.checked_add(amount).ok_or_else(|| {
        ApiError::InternalServer(format!("amount total overflowed adding {}", amount))
    })
}

/// `minuend - subtrahend`, with the same overflow handling as [`add_amounts`].
pub fn sub_amounts(minuend: Decimal, subtrahend: Decimal) -> Result<Decimal, ApiError> {
    minuend.checked_sub(subtrahend).ok_or_else(|| {
        ApiError::InternalServer(format!(
            "amount difference overflowed: {} - {}",
            minuend, subtrahend
        ))
    })
}

/// Canonical text stored in the `amount` columns.
pub fn amount_to_storage(amount: &Decimal) -> String {
    amount.normalize().to_string()
}

/// Reads an `amount` column back. A malformed value is a server-side fault.
pub fn amount_from_storage(raw: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw.trim())
        .map_err(|e| ApiError::InternalServer(format!("corrupt amount '{}': {}", raw, e)))
}
