//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a free-text field contains something other than whitespace.
pub fn required_text(value: &str, label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(format!("{label} is required").into());
        return Err(err);
    }
    Ok(())
}

/// Validates that the confirmation repeats the email, ignoring surrounding whitespace.
///
/// ```ignore
/// validate_email_confirmation("ada@example.com", "ada@example.com") // Ok
/// validate_email_confirmation("ada@example.com", "Ada@example.com") // Err - case matters
/// ```
pub fn validate_email_confirmation(email: &str, confirmation: &str) -> Result<(), ValidationError> {
    if email.trim() != confirmation.trim() {
        let mut err = ValidationError::new("email_mismatch");
        err.message = Some("Email confirmation does not match".into());
        return Err(err);
    }
    Ok(())
}
