//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a human-entered name is non-blank once trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_nonblank("Ada")     // Ok
/// validate_nonblank("  Ada ")  // Ok - trimmed content remains
/// validate_nonblank("   ")     // Err - whitespace only
/// ```
pub fn validate_nonblank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }

    Ok(())
}
