// [libs/domain/ratelimit/src/lib.rs]
//! Sliding-window rate limiting derived entirely from `COUNT(*)` queries
//! over the append-only usage ledger — ported from the original
//! `RateLimitService`'s minute/hour/day window check. No counter state
//! is maintained independently of that ledger.

use chrono::{Duration, Utc};
use gateway_domain_models::dto::billing::RateLimitStatus;
use gateway_domain_models::entities::{ApiKey, User};
use gateway_domain_models::error::GatewayError;
use gateway_infra_store::repositories::UsageRepository;
use gateway_infra_store::{StoreClient, StoreError};
use std::collections::HashMap;
use std::sync::Arc;

fn map_store_err(err: StoreError) -> GatewayError {
    GatewayError::Internal(err.to_string())
}

struct Window {
    name: &'static str,
    seconds: i64,
}

const WINDOWS: [Window; 3] = [
    Window { name: "minute", seconds: 60 },
    Window { name: "hour", seconds: 3600 },
    Window { name: "day", seconds: 86400 },
];

fn window_limit(window: &str, user: &User, api_key: Option<&ApiKey>) -> i64 {
    let key_override = api_key.and_then(|k| match window {
        "minute" => k.requests_per_minute,
        "hour" => k.requests_per_hour,
        "day" => k.requests_per_day,
        _ => None,
    });
    key_override.unwrap_or(match window {
        "minute" => user.requests_per_minute,
        "hour" => user.requests_per_hour,
        "day" => user.requests_per_day,
        _ => unreachable!("exhaustive window set"),
    })
}

/// Outcome of [`RateLimitService::check`]. `allowed == false` carries
/// enough detail to produce the same "exceeded for {window}, current
/// {n}/{limit}" message the original middleware returned.
pub struct RateLimitDecision {
    pub allowed: bool,
    pub window_exceeded: Option<String>,
    pub current_count: i64,
    pub limit: i64,
}

pub struct RateLimitService {
    store: Arc<StoreClient>,
}

impl RateLimitService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// Checks all three windows in order, stopping at the first one the
    /// caller has exceeded (matching the original's break-on-first-hit
    /// behavior rather than reporting every violated window at once).
    pub async fn check(&self, user: &User, api_key: Option<&ApiKey>) -> Result<RateLimitDecision, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;

        for window in WINDOWS.iter() {
            let limit = window_limit(window.name, user, api_key);
            let since = (Utc::now() - Duration::seconds(window.seconds)).to_rfc3339();
            let count = UsageRepository::count_since(&conn, &user.user_id, api_key.map(|k| k.id), &since)
                .await
                .map_err(map_store_err)?;

            if count >= limit {
                return Ok(RateLimitDecision {
                    allowed: false,
                    window_exceeded: Some(window.name.to_string()),
                    current_count: count,
                    limit,
                });
            }
        }

        Ok(RateLimitDecision {
            allowed: true,
            window_exceeded: None,
            current_count: 0,
            limit: 0,
        })
    }

    pub async fn status(&self, user: &User, api_key: Option<&ApiKey>) -> Result<RateLimitStatus, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;

        let mut limits = HashMap::new();
        let mut current_usage = HashMap::new();
        let mut remaining = HashMap::new();

        for window in WINDOWS.iter() {
            let limit = window_limit(window.name, user, api_key);
            let since = (Utc::now() - Duration::seconds(window.seconds)).to_rfc3339();
            let count = UsageRepository::count_since(&conn, &user.user_id, api_key.map(|k| k.id), &since)
                .await
                .map_err(map_store_err)?;

            limits.insert(format!("requests_per_{}", window.name), limit);
            current_usage.insert(window.name.to_string(), count);
            remaining.insert(window.name.to_string(), (limit - count).max(0));
        }

        Ok(RateLimitStatus { limits, current_usage, remaining })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_infra_store::repositories::{usage_repository::NewUsage, user_repository::NewUser, UserRepository};

    async fn seed_user(store: &StoreClient) -> User {
        let conn = store.connection().unwrap();
        UserRepository::insert(
            &conn,
            NewUser {
                user_id: "u-1".into(),
                username: "ada".into(),
                email: "ada@example.com".into(),
                hashed_password: "hash".into(),
            requests_per_minute: None,
            requests_per_hour: None,
            requests_per_day: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn allows_requests_under_the_limit() {
        let store = StoreClient::connect(":memory:", None).await.unwrap();
        let user = seed_user(&store).await;
        let svc = RateLimitService::new(Arc::new(store));

        let decision = svc.check(&user, None).await.unwrap();
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn blocks_once_the_minute_window_is_exhausted() {
        let store = StoreClient::connect(":memory:", None).await.unwrap();
        let mut user = seed_user(&store).await;
        user.requests_per_minute = 2;

        let conn = store.connection().unwrap();
        for _ in 0..2 {
            UsageRepository::insert(
                &conn,
                NewUsage {
                    user_id: user.user_id.clone(),
                    api_key_id: None,
                    endpoint: "/api/credit-scores".into(),
                    tokens_consumed: 1.0,
                    request_size: 1,
                    response_size: 1,
                    processing_time_ms: 1,
                    success: true,
                    error_message: None,
                },
            )
            .await
            .unwrap();
        }

        let svc = RateLimitService::new(Arc::new(store));
        let decision = svc.check(&user, None).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.window_exceeded.as_deref(), Some("minute"));
    }
}
