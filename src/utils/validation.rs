//! Validation Utilities
//!
//! Input validation for user data and API requests.

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

/// Validates email address format
pub fn validate_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    regex.is_match(email)
}

/// Normalizes email address to lowercase and removes surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates that a name is non-empty and within length bounds
pub fn validate_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.len() <= 255
}

/// Validates password strength: at least 8 characters with at least one
/// uppercase letter, one lowercase letter and one digit.
pub fn validate_password_strength(password: &str) -> bool {
    if password.len() < 8 {
        return false;
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    has_upper && has_lower && has_digit
}

/// Custom validator for email fields using the validator crate
pub fn email_validator(email: &str) -> Result<(), ValidationError> {
    if validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

/// Custom validator for name fields using the validator crate
pub fn name_validator(name: &str) -> Result<(), ValidationError> {
    if validate_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_name"))
    }
}

/// Custom validator for password fields using the validator crate
pub fn password_validator(password: &str) -> Result<(), ValidationError> {
    if validate_password_strength(password) {
        Ok(())
    } else {
        Err(ValidationError::new("weak_password"))
    }
}
