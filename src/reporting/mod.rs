//! # Reporting Module
//!
//! Aggregations over transaction rows that were already loaded for one user:
//! - Budget spent/remaining for a calendar month
//! - Income/expense totals and balance
//! - Weekly chart buckets relative to the start of a range
//!
//! Nothing here touches the database; the services fetch the rows and call in.

pub mod budget;
pub mod chart;
pub mod summary;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::common::TransactionType;

/// The parts of a transaction the aggregations care about.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub date: DateTime<Utc>,
    pub kind: TransactionType,
    pub amount: Decimal,
}

pub use budget::BudgetFigures;
pub use chart::{bucket_by_week, week_windows, ChartPoint, WeekWindow};
pub use summary::{summarize, Summary};
