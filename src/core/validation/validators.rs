//! Reusable field validators
//!
//! Each validator is a pure function of its inputs: no clock reads, no storage
//! access. The caller passes `now` where time matters so the same check gives
//! the same answer in tests and in handlers.

use crate::core::error::FieldValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

/// Maximum length of every `title` field
pub const TITLE_MAX_LENGTH: usize = 250;

/// Maximum length of every `description` field
pub const DESCRIPTION_MAX_LENGTH: usize = 1000;

/// Maximum length of an account username
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Shop rating bounds, inclusive
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;

type Check = Result<(), FieldValidationError>;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?|ftps?)://(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?|\[[0-9a-f:.]+\])(?::\d{1,5})?(?:[/?#][^\s]*)?$",
    )
    .expect("URL pattern is a valid regex")
});

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is a valid regex"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

/// Fails if `timestamp` is later than `now`
pub fn validate_not_future(field: &str, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Check {
    if timestamp > now {
        return Err(FieldValidationError::new(
            field,
            "Date and time is bigger than current!",
        ));
    }
    Ok(())
}

/// Fails if `value` lies outside `[min, max]`
///
/// NaN is never in range.
pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> Check {
    if value.is_nan() {
        return Err(FieldValidationError::new(field, "A valid number is required."));
    }
    if value < min {
        return Err(FieldValidationError::new(
            field,
            format!("Ensure this value is greater than or equal to {:?}.", min),
        ));
    }
    if value > max {
        return Err(FieldValidationError::new(
            field,
            format!("Ensure this value is less than or equal to {:?}.", max),
        ));
    }
    Ok(())
}

/// Fails if `value` is negative
pub fn validate_non_negative(field: &str, value: Decimal) -> Check {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FieldValidationError::new(
            field,
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(())
}

/// Fails if both dates are present and `start` is after `end`
///
/// The error is reported against `start_date`.
pub fn validate_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Check {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(FieldValidationError::new(
            "start_date",
            "Start date cannot be later than end date.",
        )),
        _ => Ok(()),
    }
}

/// Fails on empty or whitespace-only text
pub fn validate_required(field: &str, value: &str) -> Check {
    if value.trim().is_empty() {
        return Err(FieldValidationError::new(field, "This field may not be blank."));
    }
    Ok(())
}

/// Fails if `value` has more than `max` characters
pub fn validate_max_length(field: &str, value: &str, max: usize) -> Check {
    let len = value.chars().count();
    if len > max {
        return Err(FieldValidationError::new(
            field,
            format!(
                "Ensure this field has no more than {} characters (it has {}).",
                max, len
            ),
        ));
    }
    Ok(())
}

pub fn validate_url(field: &str, value: &str) -> Check {
    if !URL_PATTERN.is_match(value) {
        return Err(FieldValidationError::new(field, "Enter a valid URL."));
    }
    Ok(())
}

pub fn validate_email(field: &str, value: &str) -> Check {
    if !EMAIL_PATTERN.is_match(value) {
        return Err(FieldValidationError::new(field, "Enter a valid email address."));
    }
    Ok(())
}

/// Letters, digits and `@.+-_`, at most [`USERNAME_MAX_LENGTH`] characters
pub fn validate_username(field: &str, value: &str) -> Check {
    validate_required(field, value)?;
    validate_max_length(field, value, USERNAME_MAX_LENGTH)?;
    if !USERNAME_PATTERN.is_match(value) {
        return Err(FieldValidationError::new(
            field,
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Trim optional text; blank becomes `None`
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
