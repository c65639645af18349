//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Role, User};
use crate::utils::validation::{email_validator, name_validator, password_validator};

/// Request payload for registering a new account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// User's display name (1-255 characters)
    #[validate(custom(function = "name_validator"))]
    pub name: String,

    /// User's email address (must be unique among active users)
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// User's password (at least 8 characters with one uppercase letter,
    /// one lowercase letter and one digit)
    #[validate(custom(function = "password_validator"))]
    pub password: String,
}

/// Response for account registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Request payload for login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email cannot be empty"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Request payload for updating the caller's profile. Both fields are
/// required; the update is atomic.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "name_validator"))]
    pub name: String,

    #[validate(custom(function = "email_validator"))]
    pub email: String,
}

/// Request payload for assigning a role to a user
#[derive(Debug, Clone, Deserialize)]
pub struct AddRoleRequest {
    pub role: String,
}

/// Query parameters for the paginated user listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Response for the user listing
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub total: i64,
}

/// Response carrying a freshly issued password-reset token
#[derive(Debug, Serialize)]
pub struct PasswordResetTokenResponse {
    pub reset_token: String,
}

/// Request payload for completing a password reset
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token cannot be empty"))]
    pub reset_token: String,

    #[validate(custom(function = "password_validator"))]
    pub new_password: String,
}

/// Standard success response for operations without a payload
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
}
