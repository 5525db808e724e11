//! Write-time validation
//!
//! [`validators`] holds the individual pure checks. [`FieldChecks`] runs any
//! number of them and folds every failure into one
//! [`ValidationError::FieldErrors`], so a rejected write reports all offending
//! fields at once instead of the first one only.

pub mod validators;

use crate::core::error::{FieldValidationError, ValidationError};

pub use validators::{
    DESCRIPTION_MAX_LENGTH, RATING_MAX, RATING_MIN, TITLE_MAX_LENGTH, normalize_optional,
    validate_date_order, validate_email, validate_max_length, validate_non_negative,
    validate_not_future, validate_range, validate_required, validate_url, validate_username,
};

/// Collects the outcome of several validators
///
/// ```rust,ignore
/// let mut checks = FieldChecks::new();
/// checks.check(validate_required("title", &self.title));
/// checks.check(validate_max_length("title", &self.title, TITLE_MAX_LENGTH));
/// checks.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: Vec<FieldValidationError>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validator result; a field already reported is not reported twice
    pub fn check(&mut self, result: Result<(), FieldValidationError>) -> &mut Self {
        if let Err(error) = result {
            if !self.errors.iter().any(|e| e.field == error.field) {
                self.errors.push(error);
            }
        }
        self
    }

    /// Record a validator result only when `value` is present
    pub fn check_some<T>(
        &mut self,
        value: Option<T>,
        validator: impl FnOnce(T) -> Result<(), FieldValidationError>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.check(validator(value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(self.errors))
        }
    }
}
