// [libs/domain/billing/src/service.rs]
//! Token balance, metered consumption, and usage statistics — ported
//! from the original `BillingService`. Each balance mutation and its
//! ledger row(s) are written under a single `libsql` transaction
//! (`conn.transaction()` ... `tx.commit()`), so a `TokenTransaction`
//! or `ApiUsage` insert failing after the balance `UPDATE` rolls the
//! whole request back instead of leaving an un-ledgered balance
//! change.

use chrono::{Duration, Utc};
use gateway_domain_models::dto::billing::{
    BalanceResponse, EndpointUsage, TokenPurchaseResponse, TokenTransactionHistory, UsageStatsResponse,
};
use gateway_domain_models::entities::User;
use gateway_domain_models::error::GatewayError;
use gateway_infra_store::repositories::{
    transaction_repository::NewTransaction, usage_repository::NewUsage, TransactionRepository, UsageRepository,
    UserRepository,
};
use gateway_infra_store::{StoreClient, StoreError};
use std::sync::Arc;
use uuid::Uuid;

fn map_store_err(err: StoreError) -> GatewayError {
    match err {
        StoreError::UserNotFound => GatewayError::NotFound("user not found".into()),
        other => GatewayError::Internal(other.to_string()),
    }
}

/// Everything the billing stage needs to know about a completed
/// request, gathered before the handler dispatched and the success
/// status is known, so `record` can be called exactly once afterward.
pub struct UsageRecord {
    pub user_id: String,
    pub api_key_id: Option<i64>,
    pub endpoint: String,
    pub request_size: i64,
    pub response_size: i64,
    pub processing_time_ms: i64,
}

pub struct BillingService {
    store: Arc<StoreClient>,
}

impl BillingService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn balance(&self, user: &User) -> BalanceResponse {
        BalanceResponse {
            current_balance: user.token_balance,
            total_purchased: user.total_tokens_purchased,
            total_used: user.total_tokens_used,
            username: user.username.clone(),
        }
    }

    pub fn check_sufficient(&self, user: &User, required_tokens: f64) -> bool {
        user.token_balance >= required_tokens
    }

    /// Debits `token_cost` atomically and logs both the transaction and
    /// the usage row. Called only after the handler has already
    /// returned a 2xx response — on insufficient balance (a race since
    /// the preflight check) returns `PaymentRequired` without logging a
    /// debit that never happened.
    pub async fn consume(&self, record: UsageRecord, token_cost: f64) -> Result<(f64, f64), GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        let tx = conn.transaction().await.map_err(|e| map_store_err(e.into()))?;

        let (previous_balance, new_balance) = UserRepository::try_debit(&tx, &record.user_id, token_cost)
            .await
            .map_err(map_store_err)?
            .ok_or_else(|| {
                GatewayError::PaymentRequired(format!(
                    "insufficient token balance: required {token_cost}"
                ))
            })?;

        TransactionRepository::insert(
            &tx,
            NewTransaction {
                user_id: record.user_id.clone(),
                transaction_type: "usage".into(),
                amount: -token_cost,
                previous_balance,
                new_balance,
                description: format!("API call to {}", record.endpoint),
                reference_id: Some(format!(
                    "{}_{}_{}",
                    record.api_key_id.map(|id| id.to_string()).unwrap_or_default(),
                    record.endpoint,
                    Utc::now().to_rfc3339()
                )),
            },
        )
        .await
        .map_err(map_store_err)?;

        UsageRepository::insert(
            &tx,
            NewUsage {
                user_id: record.user_id,
                api_key_id: record.api_key_id,
                endpoint: record.endpoint,
                tokens_consumed: token_cost,
                request_size: record.request_size,
                response_size: record.response_size,
                processing_time_ms: record.processing_time_ms,
                success: true,
                error_message: None,
            },
        )
        .await
        .map_err(map_store_err)?;

        tx.commit().await.map_err(|e| map_store_err(e.into()))?;

        Ok((previous_balance, new_balance))
    }

    /// Logs a failed request without consuming tokens, matching the
    /// original middleware's "only bill on 2xx" rule.
    pub async fn record_failure(&self, record: UsageRecord, error_message: String) -> Result<(), GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        UsageRepository::insert(
            &conn,
            NewUsage {
                user_id: record.user_id,
                api_key_id: record.api_key_id,
                endpoint: record.endpoint,
                tokens_consumed: 0.0,
                request_size: record.request_size,
                response_size: record.response_size,
                processing_time_ms: record.processing_time_ms,
                success: false,
                error_message: Some(error_message),
            },
        )
        .await
        .map_err(map_store_err)?;
        Ok(())
    }

    pub async fn purchase(
        &self,
        user_id: &str,
        amount: f64,
        reference_id: Option<String>,
    ) -> Result<TokenPurchaseResponse, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        let tx = conn.transaction().await.map_err(|e| map_store_err(e.into()))?;

        let (previous_balance, new_balance) = UserRepository::credit(&tx, user_id, amount, true)
            .await
            .map_err(map_store_err)?;

        let reference_id = reference_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let transaction = TransactionRepository::insert(
            &tx,
            NewTransaction {
                user_id: user_id.to_string(),
                transaction_type: "purchase".into(),
                amount,
                previous_balance,
                new_balance,
                description: "token purchase".into(),
                reference_id: Some(reference_id),
            },
        )
        .await
        .map_err(map_store_err)?;

        tx.commit().await.map_err(|e| map_store_err(e.into()))?;

        Ok(TokenPurchaseResponse {
            message: "tokens purchased successfully".into(),
            tokens_added: amount,
            new_balance,
            transaction_id: transaction.id.to_string(),
        })
    }

    pub async fn usage_stats(&self, user: &User, days: i64) -> Result<UsageStatsResponse, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        let since = (Utc::now() - Duration::days(days)).to_rfc3339();

        let usages = UsageRepository::list_since(&conn, &user.user_id, &since)
            .await
            .map_err(map_store_err)?;
        let total_requests = usages.len() as i64;
        let total_tokens_consumed: f64 = usages.iter().map(|u| u.tokens_consumed).sum();

        let endpoint_breakdown: Vec<EndpointUsage> = UsageRepository::endpoint_breakdown_since(&conn, &user.user_id, &since)
            .await
            .map_err(map_store_err)?;

        Ok(UsageStatsResponse {
            period_days: days,
            current_balance: user.token_balance,
            total_requests,
            total_tokens_consumed,
            endpoint_breakdown,
        })
    }

    pub async fn transaction_history(&self, user_id: &str, limit: i64) -> Result<Vec<TokenTransactionHistory>, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        let transactions = TransactionRepository::list_recent(&conn, user_id, limit)
            .await
            .map_err(map_store_err)?;

        Ok(transactions
            .into_iter()
            .map(|t| TokenTransactionHistory {
                transaction_type: t.transaction_type,
                amount: t.amount,
                timestamp: t.timestamp,
                description: t.description,
                balance_after: t.new_balance,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_infra_store::repositories::{user_repository::NewUser, UserRepository};

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
    async fn consuming_tokens_debits_and_logs_usage() {
        let store = StoreClient::connect(":memory:", None).await.unwrap();
        let user = seed_user(&store).await;
        let svc = BillingService::new(Arc::new(store));

        let (previous, new_balance) = svc
            .consume(
                UsageRecord {
                    user_id: user.user_id.clone(),
                    api_key_id: None,
                    endpoint: "/api/credit-scores".into(),
                    request_size: 100,
                    response_size: 50,
                    processing_time_ms: 12,
                },
                10.0,
            )
            .await
            .unwrap();

        assert_eq!(previous, 100.0);
        assert_eq!(new_balance, 90.0);
    }

    #[tokio::test]
    async fn insufficient_balance_is_rejected_without_logging_a_debit() {
        let store = StoreClient::connect(":memory:", None).await.unwrap();
        let user = seed_user(&store).await;
        let svc = BillingService::new(Arc::new(store));

        let result = svc
            .consume(
                UsageRecord {
                    user_id: user.user_id.clone(),
                    api_key_id: None,
                    endpoint: "/api/credit-scores".into(),
                    request_size: 1,
                    response_size: 1,
                    processing_time_ms: 1,
                },
                1000.0,
            )
            .await;

        assert!(matches!(result, Err(GatewayError::PaymentRequired(_))));
    }

    #[tokio::test]
    async fn purchasing_tokens_increases_purchased_total() {
        let store = StoreClient::connect(":memory:", None).await.unwrap();
        let user = seed_user(&store).await;
        let svc = BillingService::new(Arc::new(store));

        let response = svc.purchase(&user.user_id, 50.0, None).await.unwrap();
        assert_eq!(response.new_balance, 150.0);
    }

    #[tokio::test]
    async fn usage_stats_excludes_failed_requests() {
        let store = StoreClient::connect(":memory:", None).await.unwrap();
        let user = seed_user(&store).await;
        let svc = BillingService::new(Arc::new(store));

        svc.consume(
            UsageRecord {
                user_id: user.user_id.clone(),
                api_key_id: None,
                endpoint: "/api/credit-scores".into(),
                request_size: 1,
                response_size: 1,
                processing_time_ms: 1,
            },
            5.0,
        )
        .await
        .unwrap();

        svc.record_failure(
            UsageRecord {
                user_id: user.user_id.clone(),
                api_key_id: None,
                endpoint: "/api/credit-scores".into(),
                request_size: 1,
                response_size: 1,
                processing_time_ms: 1,
            },
            "HTTP 500".into(),
        )
        .await
        .unwrap();

        let stats = svc.usage_stats(&user, 1).await.unwrap();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.total_tokens_consumed, 5.0);
        assert_eq!(stats.endpoint_breakdown.len(), 1);
        assert_eq!(stats.endpoint_breakdown[0].requests, 1);
    }

    proptest::proptest! {
        /// spec.md §8 property 1 ("balance monotonicity"): running a
        /// sequence of credits and affordable debits always leaves
        /// `new_balance` equal to the running sum of signed amounts
        /// starting from the seeded balance — never drifts.
        #[test]
        fn balance_tracks_the_running_sum_of_signed_amounts(
            ops in proptest::collection::vec((proptest::bool::ANY, 1.0_f64..20.0_f64), 1..20)
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let store = StoreClient::connect(":memory:", None).await.unwrap();
                let user = seed_user(&store).await;
                let svc = BillingService::new(Arc::new(store));

                let mut expected = user.token_balance;
                for (is_credit, amount) in ops {
                    if is_credit {
                        let response = svc.purchase(&user.user_id, amount, None).await.unwrap();
                        expected += amount;
                        proptest::prop_assert_eq!(response.new_balance, expected);
                    } else if expected >= amount {
                        let (_, new_balance) = svc
                            .consume(
                                UsageRecord {
                                    user_id: user.user_id.clone(),
                                    api_key_id: None,
                                    endpoint: "/api/credit-scores".into(),
                                    request_size: 1,
                                    response_size: 1,
                                    processing_time_ms: 1,
                                },
                                amount,
                            )
                            .await
                            .unwrap();
                        expected -= amount;
                        proptest::prop_assert_eq!(new_balance, expected);
                    }
                }
                Ok::<(), proptest::test_runner::TestCaseError>(())
            })?;
        }
    }
}
