use serde::{Deserialize, Serialize};
use thiserror::Error;

use keygate_core::{AppId, UserId};

/// Input shape failures, rejected before the auth core is invoked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("email is required")]
    EmptyEmail,

    #[error("password is required")]
    EmptyPassword,

    #[error("app_id is required")]
    MissingAppId,

    #[error("user_id must be a positive integer")]
    InvalidUserId,
}

// -------------------------
// Request DTOs
// -------------------------

// Absent fields deserialize to their zero value so they reach validation
// (and a 400 with a field-specific message) instead of a body rejection.

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub app_id: i32,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_credentials(&self.email, &self.password)
    }
}

impl LoginRequest {
    /// Check presence of every field and return the typed application id.
    pub fn validate(&self) -> Result<AppId, ValidationError> {
        require_credentials(&self.email, &self.password)?;
        if self.app_id <= 0 {
            return Err(ValidationError::MissingAppId);
        }
        Ok(AppId::new(self.app_id))
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Parse a user id path segment.
pub fn parse_user_id(raw: &str) -> Result<UserId, ValidationError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(UserId::new(id)),
        _ => Err(ValidationError::InvalidUserId),
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}
