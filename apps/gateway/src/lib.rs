// [apps/gateway/src/lib.rs]
//! Library root for the gateway binary. Exposed as a crate (not just a
//! binary) so `tests/` can drive the full router with
//! `tower::ServiceExt::oneshot` instead of spawning a real process.

pub mod config;
pub mod context;
pub mod handlers;
pub mod kernel;
pub mod middleware;
pub mod routes;
pub mod state;

pub mod prelude {
    pub use crate::config::GatewayConfig;
    pub use crate::kernel::Kernel;
    pub use crate::state::AppState;
}
