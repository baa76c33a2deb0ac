// [libs/core/security/src/lib.rs]
//! Password hashing and API-key mint/verify primitives shared by the
//! identity service. Neither module touches the database or HTTP layer.

pub mod apikey;
pub mod password;

pub use apikey::{hash_api_key, mint_api_key, MintedApiKey};
pub use password::{hash_password, verify_password, SecurityError, MIN_PASSWORD_LENGTH};
