use crate::error::AppError;
use uuid::Uuid;

pub fn required<'v>(field: &str, value: &'v str) -> Result<&'v str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Lengths are counted in characters, not bytes.
pub fn max_chars(field: &str, value: &str, limit: usize) -> Result<(), AppError> {
    if value.chars().count() > limit {
        return Err(AppError::validation(format!(
            "{field} must be at most {limit} characters"
        )));
    }
    Ok(())
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
