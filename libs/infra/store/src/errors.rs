// [libs/infra/store/src/errors.rs]
//! Store-layer error catalog. `gateway-domain-models::GatewayError` is
//! the HTTP-facing taxonomy; `StoreError` is what repositories return,
//! mapped up into it by the domain services that call them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database connection failure: {0}")]
    ConnectionError(String),

    #[error("invalid store configuration: {0}")]
    ConfigurationError(String),

    #[error("query execution failed: {0}")]
    QueryError(#[from] libsql::Error),

    #[error("row mapping failed: {0}")]
    MappingError(String),

    #[error("user not found")]
    UserNotFound,

    #[error("username or email already registered")]
    UserAlreadyExists,

    #[error("api key not found")]
    KeyNotFound,

    #[error("api key already revoked or expired")]
    KeyInactive,
}
