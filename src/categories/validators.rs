use super::models::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::common::{ValidationResult, Validator};

const MAX_NAME_LENGTH: usize = 100;

fn check_name(result: &mut ValidationResult, name: &str) {
    if name.trim().is_empty() {
        result.add_error("name", "Category name is required");
    } else if name.trim().chars().count() > MAX_NAME_LENGTH {
        result.add_error("name", "Category name must not exceed 100 characters");
    }
}

pub struct CreateCategoryValidator;

impl Validator<CreateCategoryRequest> for CreateCategoryValidator {
    fn validate(&self, data: &CreateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_name(&mut result, &data.name);
        result
    }
}

pub struct UpdateCategoryValidator;

impl Validator<UpdateCategoryRequest> for UpdateCategoryValidator {
    fn validate(&self, data: &UpdateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(name) = &data.name {
            check_name(&mut result, name);
        }
        result
    }
}
