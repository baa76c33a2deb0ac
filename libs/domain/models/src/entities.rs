// [libs/domain/models/src/entities.rs]
//! Row-shaped entities persisted by `gateway-infra-store`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default free-tier token balance a new account starts with.
pub const DEFAULT_STARTING_BALANCE: f64 = 100.0;
/// Default per-user rate-limit windows (requests per window), used when
/// no per-key override is present.
pub const DEFAULT_REQUESTS_PER_MINUTE: i64 = 10;
pub const DEFAULT_REQUESTS_PER_HOUR: i64 = 100;
pub const DEFAULT_REQUESTS_PER_DAY: i64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_verified: bool,

    pub token_balance: f64,
    pub total_tokens_purchased: f64,
    pub total_tokens_used: f64,

    pub requests_per_minute: i64,
    pub requests_per_hour: i64,
    pub requests_per_day: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: i64,
    /// SHA-256(plaintext || pepper), never the plaintext key.
    pub hashed_key: String,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub last_used: Option<DateTime<Utc>>,

    /// Per-key override of the owning user's rate-limit windows.
    pub requests_per_minute: Option<i64>,
    pub requests_per_hour: Option<i64>,
    pub requests_per_day: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUsage {
    pub id: i64,
    pub user_id: String,
    pub api_key_id: Option<i64>,
    pub endpoint: String,
    pub timestamp: DateTime<Utc>,
    pub tokens_consumed: f64,
    pub request_size: i64,
    pub response_size: i64,
    pub processing_time_ms: i64,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransaction {
    pub id: i64,
    pub user_id: String,
    pub transaction_type: String,
    pub amount: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub reference_id: Option<String>,
}

/// Optional materialized rate-limit cache. The rate-limit service
/// computes windows directly from `ApiUsage` (see
/// `gateway-domain-ratelimit`); rows here are never written or read by
/// the current implementation. Kept in the schema for forward
/// compatibility with a future counter-cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub id: i64,
    pub user_id: String,
    pub api_key_id: Option<i64>,
    pub window_type: String,
    pub window_start: DateTime<Utc>,
    pub request_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
