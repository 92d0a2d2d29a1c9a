//! Input validation for reminder fields.

use std::fmt;

use crate::models::NewReminder;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Phone number is not in E.164 format.
    InvalidPhoneNumber(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPhoneNumber(msg) => {
                write!(f, "phoneNumber must be in E.164 format (e.g., +1234567890): {}", msg)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for a reminder description.
pub const MAX_WHAT_LENGTH: usize = 500;

/// Maximum allowed length for a time phrase.
pub const MAX_TIME_LENGTH: usize = 64;

/// Maximum allowed length for a frequency tag.
pub const MAX_FREQUENCY_LENGTH: usize = 32;

/// E.164 allows at most 15 digits.
const MAX_PHONE_DIGITS: usize = 15;
const MIN_PHONE_DIGITS: usize = 8;

/// Validate a phone number in E.164 format.
///
/// Checks that the number:
/// - Starts with `+`
/// - Is followed only by digits, the first of which is not 0
/// - Has between 8 and 15 digits
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Empty("phoneNumber".to_string()));
    }

    let Some(digits) = phone.strip_prefix('+') else {
        return Err(ValidationError::InvalidPhoneNumber(
            "must start with +".to_string(),
        ));
    };

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhoneNumber(
            "must contain only digits after +".to_string(),
        ));
    }

    if digits.starts_with('0') {
        return Err(ValidationError::InvalidPhoneNumber(
            "country code cannot start with 0".to_string(),
        ));
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::InvalidPhoneNumber(format!(
            "expected {}-{} digits, got {}",
            MIN_PHONE_DIGITS,
            MAX_PHONE_DIGITS,
            digits.len()
        )));
    }

    Ok(())
}

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: len,
        });
    }

    Ok(())
}

/// Validate all fields of a reminder before insertion.
pub fn validate_new_reminder(reminder: &NewReminder) -> Result<(), ValidationError> {
    validate_phone_number(&reminder.phone_number)?;
    validate_text("what", &reminder.what, MAX_WHAT_LENGTH)?;
    validate_text("time", &reminder.time, MAX_TIME_LENGTH)?;

    let frequency = reminder.frequency.as_str();
    if frequency.chars().count() > MAX_FREQUENCY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "frequency".to_string(),
            max: MAX_FREQUENCY_LENGTH,
            actual: frequency.chars().count(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phone_numbers() {
        assert!(validate_phone_number("+917018224197").is_ok());
        assert!(validate_phone_number("+14155550123").is_ok());
        assert!(validate_phone_number("  +447911123456 ").is_ok());
    }

    #[test]
    fn test_invalid_phone_numbers() {
        assert!(matches!(
            validate_phone_number("917018224197"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
        assert!(matches!(
            validate_phone_number("+91 70182 24197"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
        assert!(matches!(
            validate_phone_number("+0123456789"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
        assert!(matches!(
            validate_phone_number("+1234"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
        assert!(matches!(
            validate_phone_number("+1234567890123456"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
        assert_eq!(
            validate_phone_number(""),
            Err(ValidationError::Empty("phoneNumber".to_string()))
        );
    }

    #[test]
    fn test_new_reminder_fields() {
        let ok = NewReminder::new("+14155550123", "Take medicine", "9:00 AM", "daily");
        assert!(validate_new_reminder(&ok).is_ok());

        let empty_what = NewReminder::new("+14155550123", "   ", "9:00 AM", "daily");
        assert_eq!(
            validate_new_reminder(&empty_what),
            Err(ValidationError::Empty("what".to_string()))
        );

        let long_time = NewReminder::new("+14155550123", "x", "9".repeat(65), "daily");
        assert!(matches!(
            validate_new_reminder(&long_time),
            Err(ValidationError::TooLong { max: MAX_TIME_LENGTH, actual: 65, .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::TooLong {
            field: "what".to_string(),
            max: 500,
            actual: 600,
        };
        assert_eq!(err.to_string(), "what is too long (600 chars, max 500)");
    }
}
