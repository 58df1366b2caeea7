//! The shared name rule applied by create and update.
//!
//! Request bodies arrive as loosely typed JSON, so the rule is split in two:
//! [`name_field`] checks presence and type, [`validate_name`] checks length.
//! Both report the violated constraint in the error message.

use serde_json::Value;

/// Minimum number of characters in a trimmed name.
pub const MIN_NAME_LEN: usize = 3;

/// A rejected name, carrying the human-readable reason.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn message(&self) -> &str {
        &self.0
    }

    fn required() -> Self {
        Self("\"name\" is required".to_owned())
    }

    fn not_a_string() -> Self {
        Self("\"name\" must be a string".to_owned())
    }

    fn too_short() -> Self {
        Self(format!(
            "\"name\" length must be at least {MIN_NAME_LEN} characters long"
        ))
    }
}

/// Extracts the `name` field from a request body.
///
/// Fails when the body is not an object, the field is missing or `null`, or
/// the value is not a JSON string.
pub fn name_field(body: &Value) -> Result<&str, ValidationError> {
    match body.get("name") {
        None | Some(Value::Null) => Err(ValidationError::required()),
        Some(Value::String(name)) => Ok(name),
        Some(_) => Err(ValidationError::not_a_string()),
    }
}

/// Checks a candidate name and returns the trimmed value to store.
///
/// Length is counted in characters, not bytes, so `"Lía"` is accepted.
pub fn validate_name(candidate: &str) -> Result<String, ValidationError> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required());
    }
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::too_short());
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_three_characters() {
        assert_eq!(validate_name("Ana"), Ok("Ana".to_owned()));
    }

    #[test]
    fn rejects_two_characters() {
        let err = validate_name("Al").unwrap_err();
        assert_eq!(err.message(), "\"name\" length must be at least 3 characters long");
    }

    #[test]
    fn trims_before_measuring() {
        assert!(validate_name("  Al  ").is_err());
        assert_eq!(validate_name("  Alice ").unwrap(), "Alice");
    }

    #[test]
    fn blank_name_is_missing() {
        assert_eq!(validate_name("   ").unwrap_err().message(), "\"name\" is required");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(validate_name("Lía").unwrap(), "Lía");
        assert!(validate_name("ñé").is_err());
    }

    #[test]
    fn name_field_requires_a_string() {
        assert_eq!(name_field(&json!({ "name": "Bob" })), Ok("Bob"));
        assert_eq!(
            name_field(&json!({ "name": 42 })).unwrap_err().message(),
            "\"name\" must be a string"
        );
        assert_eq!(
            name_field(&json!({})).unwrap_err().message(),
            "\"name\" is required"
        );
        assert_eq!(
            name_field(&json!({ "name": null })).unwrap_err().message(),
            "\"name\" is required"
        );
        assert!(name_field(&json!(["name"])).is_err());
    }
}
