// [libs/domain/models/src/dto/billing.rs]
//! Token purchase, balance, usage-statistics, and rate-limit-status DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPurchaseRequest {
    pub amount: f64,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    /// Idempotency key. Repeating a purchase with the same reference_id
    /// is accepted (per spec.md §3) rather than deduplicated.
    pub reference_id: Option<String>,
}

fn default_payment_method() -> String {
    "demo".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPurchaseResponse {
    pub message: String,
    pub tokens_added: f64,
    pub new_balance: f64,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageStatsRequest {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointUsage {
    pub endpoint: String,
    pub requests: i64,
    pub tokens: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStatsResponse {
    pub period_days: i64,
    pub current_balance: f64,
    pub total_requests: i64,
    pub total_tokens_consumed: f64,
    pub endpoint_breakdown: Vec<EndpointUsage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    pub limits: HashMap<String, i64>,
    pub current_usage: HashMap<String, i64>,
    pub remaining: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenTransactionHistory {
    pub transaction_type: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub balance_after: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub current_balance: f64,
    pub total_purchased: f64,
    pub total_used: f64,
    pub username: String,
}
