//! Request field validation helpers.
//!
//! Request bodies deserialize required fields as `Option<String>` so that a
//! missing or blank value surfaces as a 400 with a readable message instead
//! of a generic JSON rejection.

use crate::error::CoreError;

/// Return the trimmed-non-empty value of a required field.
///
/// The original (untrimmed) string is returned; only emptiness is judged on
/// the trimmed form.
pub fn require_field(name: &str, value: Option<String>) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{name} is required"))),
    }
}

/// Validate that a password meets the minimum length.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}
