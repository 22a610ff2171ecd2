use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LedgerEntry;
use crate::common::money::add_amounts;
use crate::common::{ApiError, TransactionType};

const WEEK: i64 = 7;

/// A 7-day slice of a chart range, counted from the range start rather than
/// calendar weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekWindow {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Only the final window includes its end instant; every other window
    /// stops just before the next one begins.
    pub closed: bool,
}

impl WeekWindow {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        if self.closed {
            *at >= self.start && *at <= self.end
        } else {
            *at >= self.start && *at < self.end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
}

/// Splits `[start, end]` into consecutive weeks labelled "Week 1", "Week 2", ...
/// The last week is cut short at `end` and includes it, so a range of exactly
/// N weeks yields N windows. Empty when `end < start`.
pub fn week_windows(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<WeekWindow> {
    let mut windows = Vec::new();
    let mut cursor = start;
    let mut number = 1;

    while cursor <= end {
        let next = cursor + Duration::days(WEEK);
        let closed = next >= end;
        windows.push(WeekWindow {
            name: format!("Week {}", number),
            start: cursor,
            end: if closed { end } else { next },
            closed,
        });
        if closed {
            break;
        }
        cursor = next;
        number += 1;
    }

    windows
}

/// Income and expense totals per week of `[start, end]`. Entries outside the
/// range are ignored.
pub fn bucket_by_week(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    entries: &[LedgerEntry],
) -> Result<Vec<ChartPoint>, ApiError> {
    let windows = week_windows(start, end);
    let mut totals = vec![(Decimal::ZERO, Decimal::ZERO); windows.len()];
    let last = windows.len().saturating_sub(1);

    for entry in entries {
        if entry.date < start || entry.date > end {
            continue;
        }
        // A range of whole weeks has no window past its end, so `end` itself
        // lands in the closed last one.
        let index = usize::try_from((entry.date - start).num_days() / WEEK)
            .map_or(last, |index| index.min(last));
        let (income, expense) = &mut totals[index];
        match entry.kind {
            TransactionType::Income => *income = add_amounts(*income, entry.amount)?,
            TransactionType::Expense => *expense = add_amounts(*expense, entry.amount)?,
        }
    }

    Ok(windows
        .into_iter()
        .zip(totals)
        .map(|(window, (income, expense))| ChartPoint {
            name: window.name,
            income,
            expense,
        })
        .collect())
}
