//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Field names are snake_case; request bodies also
//! accept the camelCase spelling of multi-word fields. A link's position is
//! exposed as `order`.

use validator::ValidationError;

pub mod auth;
pub mod health;
pub mod links;
pub mod pagination;
pub mod profiles;
pub mod users;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Must not be blank".into()));
    }
    Ok(())
}
