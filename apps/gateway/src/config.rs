// [apps/gateway/src/config.rs]
//! Typed startup configuration, replacing the scattered `std::env::var`
//! calls the teacher's `main.rs`/`kernel.rs` used with one validated
//! `clap::Parser` struct read once at process start (composition root,
//! per SPEC_FULL.md §6.4 / §9 Design Notes).

use clap::Parser;
use gateway_domain_billing::cost::CostTable;
use gateway_domain_identity::DefaultLimits;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gateway", about = "Metered ML-scoring API gateway")]
pub struct GatewayConfig {
    #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "GATEWAY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// libsql local file path, `:memory:`, or a `libsql://`/`https://`
    /// remote URL (in which case `database_auth_token` is required).
    #[arg(long, env = "DATABASE_URL", default_value = "gateway.db")]
    pub database_url: String,

    #[arg(long, env = "TURSO_AUTH_TOKEN")]
    pub database_auth_token: Option<String>,

    /// Process-wide secret mixed into every API-key hash (§4.2).
    /// Rotating it invalidates every previously minted key.
    #[arg(long, env = "SERVER_PEPPER")]
    pub server_pepper: String,

    /// Comma-separated list of allowed CORS origins; `*` is permissive.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    /// Optional path to a JSON-encoded `CostTable` (see
    /// `gateway_domain_billing::cost::CostTable`). Falls back to the
    /// built-in default cost table (unit cost 1.0 per scoring endpoint)
    /// when unset.
    #[arg(long, env = "COST_TABLE_PATH")]
    pub cost_table_path: Option<PathBuf>,

    #[arg(long, env = "DEFAULT_REQUESTS_PER_MINUTE", default_value_t = 10)]
    pub default_requests_per_minute: i64,

    #[arg(long, env = "DEFAULT_REQUESTS_PER_HOUR", default_value_t = 100)]
    pub default_requests_per_hour: i64,

    #[arg(long, env = "DEFAULT_REQUESTS_PER_DAY", default_value_t = 1000)]
    pub default_requests_per_day: i64,

    /// Deadline for a single scoring-backend call, per spec.md §5's
    /// "every external scoring call carries a deadline (default 30s)".
    #[arg(long, env = "SCORING_DEADLINE_MS", default_value_t = 30_000)]
    pub scoring_deadline_ms: u64,
}

impl GatewayConfig {
    pub fn default_limits(&self) -> DefaultLimits {
        DefaultLimits {
            requests_per_minute: self.default_requests_per_minute,
            requests_per_hour: self.default_requests_per_hour,
            requests_per_day: self.default_requests_per_day,
        }
    }

    /// Loads the cost table from `cost_table_path` when set, otherwise
    /// the built-in default (spec.md §9 Open Questions: the cost table
    /// is configuration, never hardcoded).
    pub fn load_cost_table(&self) -> anyhow::Result<CostTable> {
        match &self.cost_table_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("failed to read cost table at {}: {e}", path.display()))?;
                let table: CostTable = serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("failed to parse cost table at {}: {e}", path.display()))?;
                Ok(table)
            }
            None => Ok(CostTable::default()),
        }
    }
}
