// [apps/gateway/src/context.rs]
//! The per-request principal the auth stage attaches via
//! `Request::extensions_mut` and every later stage/handler reads back
//! out, per SPEC_FULL.md §9's "typed per-request context" design note.

use gateway_domain_models::entities::{ApiKey, User};

#[derive(Debug, Clone)]
pub struct RequestPrincipal {
    pub user: User,
    /// `None` when the caller authenticated without a per-key override
    /// (not reachable today since every key is minted with one, but the
    /// rate-limit service treats a missing key the same as a key with
    /// no overrides — see `gateway_domain_ratelimit::window_limit`).
    pub api_key: Option<ApiKey>,
}
