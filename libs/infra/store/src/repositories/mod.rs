// [libs/infra/store/src/repositories/mod.rs]
//! One repository per entity. Each wraps a `libsql::Connection` and
//! exposes parameterized, entity-shaped async methods — no ORM, no
//! dynamic query building.

pub mod api_key_repository;
pub mod transaction_repository;
pub mod usage_repository;
pub mod user_repository;

pub use api_key_repository::ApiKeyRepository;
pub use transaction_repository::TransactionRepository;
pub use usage_repository::UsageRepository;
pub use user_repository::UserRepository;
