// [libs/domain/identity/src/lib.rs]
//! Registration, authentication, and API-key lifecycle management —
//! ported from the original service's `AuthService`, swapping bcrypt
//! for the argon2id hasher in `gateway-core-security` (see DESIGN.md).

use chrono::{Duration, Utc};
use gateway_core_security::{hash_api_key, hash_password, mint_api_key, verify_password};
use gateway_domain_models::dto::auth::{
    ApiKeyResponse, ApiKeyUsageResponse, LoginResponse, RevokeApiKeyResponse, UserRegistrationResponse,
};
use gateway_domain_models::entities::{ApiKey, User};
use gateway_domain_models::error::GatewayError;
use gateway_infra_store::repositories::{ApiKeyRepository, UserRepository};
use gateway_infra_store::repositories::{api_key_repository::NewApiKey, user_repository::NewUser};
use gateway_infra_store::{StoreClient, StoreError};
use std::sync::Arc;
use uuid::Uuid;

fn map_store_err(err: StoreError) -> GatewayError {
    match err {
        StoreError::UserAlreadyExists => GatewayError::Conflict("username or email already registered".into()),
        StoreError::UserNotFound => GatewayError::NotFound("user not found".into()),
        StoreError::KeyNotFound | StoreError::KeyInactive => {
            GatewayError::Unauthenticated("invalid or inactive api key".into())
        }
        other => GatewayError::Internal(other.to_string()),
    }
}

/// Default per-user rate-limit windows handed to every newly registered
/// account, sourced from `GatewayConfig` (see SPEC_FULL.md §6.4) rather
/// than hardcoded.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLimits {
    pub requests_per_minute: i64,
    pub requests_per_hour: i64,
    pub requests_per_day: i64,
}

impl Default for DefaultLimits {
    fn default() -> Self {
        use gateway_domain_models::entities::{
            DEFAULT_REQUESTS_PER_DAY, DEFAULT_REQUESTS_PER_HOUR, DEFAULT_REQUESTS_PER_MINUTE,
        };
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            requests_per_hour: DEFAULT_REQUESTS_PER_HOUR,
            requests_per_day: DEFAULT_REQUESTS_PER_DAY,
        }
    }
}

/// Registration, login, and API-key issuance/validation/revocation. One
/// instance is shared across the gateway behind an `Arc`.
pub struct IdentityService {
    store: Arc<StoreClient>,
    /// Server-side pepper mixed into every API-key hash; see
    /// `GatewayConfig::server_pepper`.
    pepper: String,
    default_limits: DefaultLimits,
}

impl IdentityService {
    pub fn new(store: Arc<StoreClient>, pepper: String) -> Self {
        Self::with_default_limits(store, pepper, DefaultLimits::default())
    }

    pub fn with_default_limits(store: Arc<StoreClient>, pepper: String, default_limits: DefaultLimits) -> Self {
        Self { store, pepper, default_limits }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<UserRegistrationResponse, GatewayError> {
        if !email.contains('@') {
            return Err(GatewayError::Validation("email must contain '@'".into()));
        }
        let hashed_password = hash_password(password).map_err(|e| GatewayError::Validation(e.to_string()))?;

        let conn = self.store.connection().map_err(map_store_err)?;
        let user = UserRepository::insert(
            &conn,
            NewUser {
                user_id: Uuid::new_v4().to_string(),
                username: username.to_string(),
                email: email.to_string(),
                hashed_password,
                requests_per_minute: Some(self.default_limits.requests_per_minute),
                requests_per_hour: Some(self.default_limits.requests_per_hour),
                requests_per_day: Some(self.default_limits.requests_per_day),
            },
        )
        .await
        .map_err(map_store_err)?;

        Ok(UserRegistrationResponse {
            message: "user registered successfully".into(),
            user_id: user.user_id,
            username: user.username,
            email: user.email,
        })
    }

    /// Returns the authenticated `User` on success; callers that only
    /// need the login-response shape can project from it.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        let user = UserRepository::find_by_username(&conn, username)
            .await
            .map_err(map_store_err)?
            .filter(|u| u.is_active)
            .ok_or_else(|| GatewayError::Unauthenticated("invalid username or password".into()))?;

        let verified = verify_password(password, &user.hashed_password)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        if !verified {
            return Err(GatewayError::Unauthenticated("invalid username or password".into()));
        }

        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, GatewayError> {
        let user = self.authenticate(username, password).await?;
        Ok(LoginResponse {
            message: "login successful".into(),
            user_id: user.user_id,
            username: user.username,
        })
    }

    /// Re-authenticates with `username`/`password`, then mints a new key
    /// bound to that user, copying the user's current rate-limit windows
    /// onto the key as its initial per-key override.
    pub async fn generate_key(
        &self,
        username: &str,
        password: &str,
        name: &str,
        expires_in_days: Option<i64>,
    ) -> Result<ApiKeyResponse, GatewayError> {
        let user = self.authenticate(username, password).await?;
        let minted = mint_api_key(&self.pepper);
        let expires_at = expires_in_days.map(|days| Utc::now() + Duration::days(days));

        let conn = self.store.connection().map_err(map_store_err)?;
        let stored = ApiKeyRepository::insert(
            &conn,
            NewApiKey {
                hashed_key: minted.hashed,
                user_id: user.user_id,
                name: name.to_string(),
                expires_at: expires_at.map(|ts| ts.to_rfc3339()),
                requests_per_minute: Some(user.requests_per_minute),
                requests_per_hour: Some(user.requests_per_hour),
                requests_per_day: Some(user.requests_per_day),
            },
        )
        .await
        .map_err(map_store_err)?;

        Ok(ApiKeyResponse {
            api_key: minted.plaintext,
            name: stored.name,
            created_at: stored.created_at,
            expires_at: stored.expires_at,
        })
    }

    /// Validates a plaintext API key, returning the owning `User` and
    /// the matched `ApiKey` row (whose per-key limits, if present,
    /// override the user's defaults — see `gateway-domain-ratelimit`).
    /// An expired key is deactivated in the same call that discovers it.
    pub async fn validate_key(&self, plaintext: &str) -> Result<(User, ApiKey), GatewayError> {
        let hashed = hash_api_key(plaintext, &self.pepper);
        let conn = self.store.connection().map_err(map_store_err)?;

        let key = ApiKeyRepository::find_by_hash(&conn, &hashed)
            .await
            .map_err(map_store_err)?
            .filter(|k| k.is_active)
            .ok_or_else(|| GatewayError::Unauthenticated("invalid api key".into()))?;

        if let Some(expires_at) = key.expires_at {
            if expires_at < Utc::now() {
                ApiKeyRepository::deactivate(&conn, key.id).await.map_err(map_store_err)?;
                return Err(GatewayError::Unauthenticated("api key has expired".into()));
            }
        }

        let user = UserRepository::find_by_user_id(&conn, &key.user_id)
            .await
            .map_err(map_store_err)?
            .filter(|u| u.is_active)
            .ok_or_else(|| GatewayError::Unauthenticated("owning account is inactive".into()))?;

        ApiKeyRepository::touch_last_used(&conn, key.id).await.map_err(map_store_err)?;

        Ok((user, key))
    }

    pub async fn list_keys(&self, user_id: &str) -> Result<Vec<ApiKeyUsageResponse>, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        let keys = ApiKeyRepository::list_for_user(&conn, user_id).await.map_err(map_store_err)?;
        Ok(keys
            .into_iter()
            .map(|k| ApiKeyUsageResponse {
                name: k.name,
                created_at: k.created_at,
                last_used: k.last_used,
                is_active: k.is_active,
            })
            .collect())
    }

    pub async fn revoke_key(&self, user_id: &str, name: &str) -> Result<RevokeApiKeyResponse, GatewayError> {
        let conn = self.store.connection().map_err(map_store_err)?;
        let revoked = ApiKeyRepository::deactivate_by_name(&conn, user_id, name)
            .await
            .map_err(map_store_err)?;

        if !revoked {
            return Err(GatewayError::NotFound(format!("no active api key named '{name}'")));
        }

        Ok(RevokeApiKeyResponse {
            message: "api key revoked".into(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> IdentityService {
        let store = StoreClient::connect(":memory:", None).await.unwrap();
        IdentityService::new(Arc::new(store), "test-pepper".into())
    }

    #[tokio::test]
    async fn registers_then_authenticates() {
        let svc = service().await;
        svc.register("ada", "ada@example.com", "correct-horse-battery").await.unwrap();

        let authed = svc.authenticate("ada", "correct-horse-battery").await;
        assert!(authed.is_ok());

        let rejected = svc.authenticate("ada", "wrong-password").await;
        assert!(rejected.is_err());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let svc = service().await;
        svc.register("ada", "ada@example.com", "correct-horse-battery").await.unwrap();
        let second = svc.register("ada", "other@example.com", "correct-horse-battery").await;
        assert!(matches!(second, Err(GatewayError::Conflict(_))));
    }

    #[tokio::test]
    async fn mints_and_validates_a_key() {
        let svc = service().await;
        svc.register("ada", "ada@example.com", "correct-horse-battery").await.unwrap();

        let minted = svc
            .generate_key("ada", "correct-horse-battery", "ci", Some(30))
            .await
            .unwrap();
        assert!(minted.api_key.starts_with("pk_"));

        let (user, key) = svc.validate_key(&minted.api_key).await.unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(key.name, "ci");

        let bogus = svc.validate_key("pk_not-a-real-key").await;
        assert!(bogus.is_err());
    }

    #[tokio::test]
    async fn revoking_a_key_invalidates_it() {
        let svc = service().await;
        svc.register("ada", "ada@example.com", "correct-horse-battery").await.unwrap();
        let minted = svc
            .generate_key("ada", "correct-horse-battery", "ci", None)
            .await
            .unwrap();

        let (user, _) = svc.validate_key(&minted.api_key).await.unwrap();
        svc.revoke_key(&user.user_id, "ci").await.unwrap();

        let revalidated = svc.validate_key(&minted.api_key).await;
        assert!(revalidated.is_err());
    }
}
