/// User domain type
use super::ids::UserId;
use crate::error::{DharmaError, Result};
use serde::{Deserialize, Serialize};

/// User account as exposed by every backend.
///
/// Credentials never leave the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Login email, unique across users
    pub email: String,

    /// Whether the user may manage other accounts
    pub is_admin: bool,

    /// Account creation timestamp (RFC 3339)
    pub created_at: String,
}

/// Partial user update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New plaintext password; hashed before it is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl UpdateUser {
    /// Reject empty replacement values
    pub fn validate(&self) -> Result<()> {
        if self.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(DharmaError::invalid_input("Email cannot be empty"));
        }
        if self.password.as_deref().is_some_and(str::is_empty) {
            return Err(DharmaError::invalid_input("Password cannot be empty"));
        }
        Ok(())
    }
}

/// Check login/registration input before touching storage
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(DharmaError::invalid_input(
            "Email and password are required",
        ));
    }
    Ok(())
}
