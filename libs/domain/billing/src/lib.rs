// [libs/domain/billing/src/lib.rs]
//! Metered billing: token balances, per-endpoint cost, and the usage
//! ledger.

pub mod cost;
pub mod service;

pub use cost::CostTable;
pub use service::{BillingService, UsageRecord};
