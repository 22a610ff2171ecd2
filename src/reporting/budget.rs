use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::money::{add_amounts, sub_amounts};
use crate::common::ApiError;

/// Derived budget figures. Never stored; rebuilt from transactions on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetFigures {
    #[serde(with = "rust_decimal::serde::float")]
    pub spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
}

impl BudgetFigures {
    /// `expenses` are the EXPENSE amounts in the budget's category and month.
    pub fn compute<I>(budget_amount: Decimal, expenses: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let spent = expenses.into_iter().try_fold(Decimal::ZERO, add_amounts)?;
        Ok(Self {
            spent,
            remaining: sub_amounts(budget_amount, spent)?,
        })
    }
}
