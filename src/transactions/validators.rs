use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::models::{
    CreateTransactionRequest, DateRangeQuery, TransactionFilter, TransactionQuery,
    UpdateTransactionRequest,
};
use crate::common::dates::{day_bounds, parse_date_input, DateRange};
use crate::common::money::amount_bounds_error;
use crate::common::{ApiError, ValidationResult, Validator};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 500;

/// Longest chart range, about five years of weekly points.
pub const MAX_CHART_DAYS: i64 = 366 * 5;

fn check_amount(result: &mut ValidationResult, amount: &Decimal) {
    if *amount <= Decimal::ZERO {
        result.add_error("amount", "Amount must be greater than 0");
    } else if let Some(message) = amount_bounds_error(amount) {
        result.add_error("amount", &message);
    }
}

fn check_date(result: &mut ValidationResult, field: &str, raw: Option<&str>) {
    if let Some(raw) = raw {
        if parse_date_input(field, raw).is_err() {
            result.add_error(field, "Must be an ISO 8601 date (YYYY-MM-DD) or timestamp");
        }
    }
}

pub struct CreateTransactionValidator;

impl Validator<CreateTransactionRequest> for CreateTransactionValidator {
    fn validate(&self, data: &CreateTransactionRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_amount(&mut result, &data.amount);
        check_date(&mut result, "date", data.date.as_deref());
        result
    }
}

pub struct UpdateTransactionValidator;

impl Validator<UpdateTransactionRequest> for UpdateTransactionValidator {
    fn validate(&self, data: &UpdateTransactionRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(amount) = &data.amount {
            check_amount(&mut result, amount);
        }
        check_date(&mut result, "date", data.date.as_deref());
        result
    }
}

/// Parses optional `startDate`/`endDate`. An inverted range is accepted and
/// simply matches nothing.
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, ApiError> {
    Ok(DateRange {
        from: start.map(|s| parse_date_input("startDate", s)).transpose()?,
        to: end.map(|s| parse_date_input("endDate", s)).transpose()?,
    })
}

impl DateRangeQuery {
    pub fn optional_range(&self) -> Result<DateRange, ApiError> {
        parse_range(self.start_date.as_deref(), self.end_date.as_deref())
    }

    /// Both bounds, in order and at most [`MAX_CHART_DAYS`] apart, as the
    /// chart needs a finite range.
    pub fn required_range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        match self.optional_range()? {
            DateRange {
                from: Some(start),
                to: Some(end),
            } => {
                if end < start {
                    return Err(ApiError::BadRequest(
                        "endDate must not be before startDate".to_string(),
                    ));
                }
                if (end - start).num_days() > MAX_CHART_DAYS {
                    return Err(ApiError::BadRequest(format!(
                        "Date range must not exceed {} days",
                        MAX_CHART_DAYS
                    )));
                }
                Ok((start, end))
            }
            _ => Err(ApiError::BadRequest(
                "startDate and endDate are required".to_string(),
            )),
        }
    }
}

impl TransactionQuery {
    pub fn into_filter(self) -> Result<TransactionFilter, ApiError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::BadRequest("offset must not be negative".to_string()));
        }

        let range = match self.date.as_deref() {
            Some(date) => {
                let (from, to) = day_bounds(&parse_date_input("date", date)?);
                DateRange::between(from, to)
            }
            None => parse_range(self.start_date.as_deref(), self.end_date.as_deref())?,
        };

        Ok(TransactionFilter {
            kind: self.kind,
            category_id: self.category_id.filter(|id| !id.is_empty()),
            range,
            limit,
            offset,
        })
    }
}
