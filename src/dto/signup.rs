use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_username;

/// Payload used to create a new player.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Requested player name, unique and case-sensitive.
    pub username: String,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_username(&self.username) {
            errors.add("username", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
