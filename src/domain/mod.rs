//! Core domain types shared across guards and providers

use serde::{Deserialize, Serialize};
use validator::Validate;

/// An authenticated identity referenced by id in session state.
///
/// The password hash is an argon2 PHC string. It never serializes, so a
/// principal can be handed to view locals or diagnostics without leaking it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Free-form attributes of the underlying entity
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Input for creating a principal through a provider's storage accessor
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub username: String,
    pub password_hash: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Login form credentials
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(length(min = 1, message = "The username field is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The password field is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_principal_hash_never_serializes() {
        let principal = Principal {
            id: 7,
            username: "jane".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            attributes: serde_json::Map::new(),
        };

        let json = serde_json::to_string(&principal).unwrap();
        assert!(json.contains("jane"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let empty = Credentials {
            username: String::new(),
            password: String::new(),
        };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("password"));

        let full = Credentials {
            username: "jane".to_string(),
            password: "secret".to_string(),
        };
        assert!(full.validate().is_ok());
    }
}
