//! Presence validation.
//!
//! A value is *blank* when it is empty or consists only of Unicode
//! whitespace. Required fields must not be blank at save time.

use crate::error::{ValidationError, ValidationResult};

/// Returns `true` for empty or whitespace-only text.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Fail with [`ValidationError::Presence`] when `value` is blank.
pub fn require_present(field: &'static str, value: &str) -> ValidationResult {
    if is_blank(value) {
        return Err(ValidationError::Presence(field));
    }
    Ok(())
}

/// Records that can check their own invariants before persistence.
///
/// `validate` must be pure: calling it repeatedly on an unchanged record
/// yields the same result.
pub trait Validate {
    fn validate(&self) -> ValidationResult;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
