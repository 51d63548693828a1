// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::form::deserialize_flag;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username pattern"));

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub is_admin: bool,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(
        length(
            min = 1,
            max = 50,
            message = "Username length must be between 1 and 50 characters."
        ),
        regex(
            path = *USERNAME_PATTERN,
            message = "Username may only contain letters, digits, '_', '.' and '-'."
        )
    )]
    pub username: String,
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password length must be between 1 and 128 characters."
    ))]
    pub password: String,
    /// Checkbox style: `true`, `"on"`, `"1"` or `"yes"` all mean admin.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_admin: bool,
}

/// DTO for user login.
/// Only emptiness is checked: any other input goes through the credential
/// check, so every mismatch answers the same 401.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn accepts_reasonable_usernames() {
        assert!(register("alice", "pw").validate().is_ok());
        assert!(register("a.b-c_1", "pw").validate().is_ok());
    }

    #[test]
    fn rejects_empty_fields() {
        assert!(register("", "pw").validate().is_err());
        assert!(register("alice", "").validate().is_err());
    }

    #[test]
    fn rejects_odd_characters() {
        assert!(register("alice smith", "pw").validate().is_err());
        assert!(register("<b>", "pw").validate().is_err());
    }

    #[test]
    fn login_accepts_over_long_credentials() {
        let login = LoginRequest {
            username: "x".repeat(60),
            password: "y".repeat(200),
        };
        assert!(login.validate().is_ok());

        let empty = LoginRequest {
            username: String::new(),
            password: "pw".to_string(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn admin_flag_defaults_to_false() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"username":"u","password":"p"}"#).unwrap();
        assert!(!req.is_admin);
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"username":"u","password":"p","isAdmin":true}"#).unwrap();
        assert!(req.is_admin);
    }
}
