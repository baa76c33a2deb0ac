// [apps/gateway/src/state.rs]
//! Composition-root application state: every service is constructed
//! once at startup and shared behind an `Arc`, per SPEC_FULL.md §9's
//! "global service singletons → composition-root wiring" design note.

use crate::config::GatewayConfig;
use gateway_domain_billing::{BillingService, CostTable};
use gateway_domain_identity::IdentityService;
use gateway_domain_ratelimit::RateLimitService;
use gateway_infra_store::StoreClient;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreClient>,
    pub identity: Arc<IdentityService>,
    pub ratelimit: Arc<RateLimitService>,
    pub billing: Arc<BillingService>,
    pub cost_table: Arc<CostTable>,
    pub scoring_deadline: Duration,
}

impl AppState {
    pub async fn bootstrap(config: &GatewayConfig) -> anyhow::Result<Self> {
        let store = Arc::new(
            StoreClient::connect(&config.database_url, config.database_auth_token.clone())
                .await
                .map_err(|e| anyhow::anyhow!("failed to open store: {e}"))?,
        );

        let identity = Arc::new(IdentityService::with_default_limits(
            store.clone(),
            config.server_pepper.clone(),
            config.default_limits(),
        ));
        let ratelimit = Arc::new(RateLimitService::new(store.clone()));
        let billing = Arc::new(BillingService::new(store.clone()));
        let cost_table = Arc::new(config.load_cost_table()?);

        Ok(Self {
            store,
            identity,
            ratelimit,
            billing,
            cost_table,
            scoring_deadline: Duration::from_millis(config.scoring_deadline_ms),
        })
    }
}
