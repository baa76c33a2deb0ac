// [libs/domain/models/src/dto/auth.rs]
//! Registration, login, and API-key management DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct UserRegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRegistrationResponse {
    pub message: String,
    pub user_id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_expires_in_days")]
    pub expires_in_days: Option<i64>,
}

fn default_expires_in_days() -> Option<i64> {
    Some(30)
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyUsageResponse {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyListResponse {
    pub keys: Vec<ApiKeyUsageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevokeApiKeyRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevokeApiKeyResponse {
    pub message: String,
    pub name: String,
}
