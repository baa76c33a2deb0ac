// [libs/domain/models/src/lib.rs]
//! Entities, wire DTOs, and the shared error taxonomy for the gateway.
//!
//! Nothing in this crate talks to a database or the network — it is the
//! vocabulary every other crate in the workspace shares.

pub mod dto;
pub mod entities;
pub mod error;

pub mod prelude {
    pub use crate::entities::{ApiKey, ApiUsage, RateLimitState, TokenTransaction, User};
    pub use crate::error::GatewayError;
}
