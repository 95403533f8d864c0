//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted player name, in characters.
pub const MAX_USERNAME_CHARS: usize = 64;

/// Validates a player name: 1 to [`MAX_USERNAME_CHARS`] characters, no control
/// characters and no surrounding whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_username("ada")      // Ok
/// validate_username("")         // Err - empty
/// validate_username(" ada")     // Err - leading whitespace
/// ```
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length == 0 || length > MAX_USERNAME_CHARS {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!("Username must be between 1 and {MAX_USERNAME_CHARS} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    if name.trim() != name {
        let mut err = ValidationError::new("username_whitespace");
        err.message = Some("Username must not start or end with whitespace".into());
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("username_format");
        err.message = Some("Username must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
