//! Account request and response models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 30, message = "Username must be 2-30 characters"))]
    pub username: String,

    pub password: String,

    #[validate(length(min = 1, max = 60, message = "Display name must be 1-60 characters"))]
    pub known_as: String,

    /// Profile fields passed through to the identity record untouched
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Identity summary returned after registration or login
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub username: String,

    /// Signed session assertion; consumers present it on subsequent calls
    pub token: String,

    pub known_as: String,

    /// URL of the main photo; only resolved on login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
