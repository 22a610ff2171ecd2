use rust_decimal::Decimal;

use super::models::{BudgetQuery, CreateBudgetRequest, UpdateBudgetRequest};
use crate::common::money::amount_bounds_error;
use crate::common::{ValidationResult, Validator};

fn check_amount(result: &mut ValidationResult, amount: &Decimal) {
    if amount.is_sign_negative() {
        result.add_error("amount", "Amount must not be negative");
    } else if let Some(message) = amount_bounds_error(amount) {
        result.add_error("amount", &message);
    }
}

fn check_month(result: &mut ValidationResult, month: i64) {
    if !(1..=12).contains(&month) {
        result.add_error("month", "Month must be between 1 and 12");
    }
}

fn check_year(result: &mut ValidationResult, year: i64) {
    if !(1..=9999).contains(&year) {
        result.add_error("year", "Year must be between 1 and 9999");
    }
}

pub struct CreateBudgetValidator;

impl Validator<CreateBudgetRequest> for CreateBudgetValidator {
    fn validate(&self, data: &CreateBudgetRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_amount(&mut result, &data.amount);
        check_month(&mut result, data.month);
        check_year(&mut result, data.year);
        if data.category_id.trim().is_empty() {
            result.add_error("categoryId", "Category is required");
        }
        result
    }
}

pub struct UpdateBudgetValidator;

impl Validator<UpdateBudgetRequest> for UpdateBudgetValidator {
    fn validate(&self, data: &UpdateBudgetRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(amount) = &data.amount {
            check_amount(&mut result, amount);
        }
        result
    }
}

pub struct BudgetQueryValidator;

impl Validator<BudgetQuery> for BudgetQueryValidator {
    fn validate(&self, data: &BudgetQuery) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(month) = data.month {
            check_month(&mut result, month);
        }
        if let Some(year) = data.year {
            check_year(&mut result, year);
        }
        result
    }
}
