// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login email, stored lowercase.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'student' or 'admin'.
    pub role: String,

    /// Inactive accounts cannot log in.
    pub active: bool,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_ADMIN: &str = "admin";

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for Admin creating a user (can specify role).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    pub role: String, // 'student' or 'admin'
}

/// One row of a bulk user load. Unknown roles coerce to 'student',
/// matching the provisioning spreadsheet the load replaces.
#[derive(Debug, Deserialize)]
pub struct BulkUserEntry {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl BulkUserEntry {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn effective_role(&self) -> &'static str {
        match self.role.as_deref() {
            Some(ROLE_ADMIN) => ROLE_ADMIN,
            _ => ROLE_STUDENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_entry_normalizes_email_and_role() {
        let entry = BulkUserEntry {
            email: "  Student@Example.COM ".to_string(),
            password: "pass123".to_string(),
            role: Some("proctor".to_string()),
            active: None,
        };

        assert_eq!(entry.normalized_email(), "student@example.com");
        assert_eq!(entry.effective_role(), ROLE_STUDENT);
    }

    #[test]
    fn bulk_entry_keeps_admin_role() {
        let entry = BulkUserEntry {
            email: "admin@example.com".to_string(),
            password: "pass123".to_string(),
            role: Some("admin".to_string()),
            active: Some(true),
        };

        assert_eq!(entry.effective_role(), ROLE_ADMIN);
    }
}
