// [libs/infra/store/src/repositories/api_key_repository.rs]
//! API keys: minting, hash lookup for validation, listing, and
//! revocation. Plaintext keys never reach this crate — only hashes.

use crate::errors::StoreError;
use crate::time::{now_rfc3339, parse_rfc3339, parse_rfc3339_opt};
use gateway_domain_models::entities::ApiKey;
use libsql::{params, Connection, Row};

pub struct NewApiKey {
    pub hashed_key: String,
    pub user_id: String,
    pub name: String,
    pub expires_at: Option<String>,
    pub requests_per_minute: Option<i64>,
    pub requests_per_hour: Option<i64>,
    pub requests_per_day: Option<i64>,
}

pub struct ApiKeyRepository;

impl ApiKeyRepository {
    pub async fn insert(conn: &Connection, new_key: NewApiKey) -> Result<ApiKey, StoreError> {
        let created_at = now_rfc3339();
        conn.execute(
            r#"
            INSERT INTO api_keys (
                hashed_key, user_id, name, created_at, expires_at, is_active,
                requests_per_minute, requests_per_hour, requests_per_day
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8)
            "#,
            params![
                new_key.hashed_key.clone(),
                new_key.user_id,
                new_key.name,
                created_at,
                new_key.expires_at,
                new_key.requests_per_minute,
                new_key.requests_per_hour,
                new_key.requests_per_day,
            ],
        )
        .await?;

        Self::find_by_hash(conn, &new_key.hashed_key)
            .await?
            .ok_or(StoreError::KeyNotFound)
    }

    pub async fn find_by_hash(conn: &Connection, hashed_key: &str) -> Result<Option<ApiKey>, StoreError> {
        let mut rows = conn
            .query("SELECT * FROM api_keys WHERE hashed_key = ?1", params![hashed_key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_api_key(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<ApiKey>, StoreError> {
        let mut rows = conn
            .query(
                "SELECT * FROM api_keys WHERE user_id = ?1 ORDER BY created_at DESC",
                params![user_id],
            )
            .await?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(map_api_key(&row)?);
        }
        Ok(keys)
    }

    pub async fn touch_last_used(conn: &Connection, id: i64) -> Result<(), StoreError> {
        conn.execute(
            "UPDATE api_keys SET last_used = ?1 WHERE id = ?2",
            params![now_rfc3339(), id],
        )
        .await?;
        Ok(())
    }

    pub async fn deactivate(conn: &Connection, id: i64) -> Result<(), StoreError> {
        conn.execute("UPDATE api_keys SET is_active = 0 WHERE id = ?1", params![id])
            .await?;
        Ok(())
    }

    /// Deactivates the named, active key belonging to `user_id`. Returns
    /// `false` if no such key exists.
    pub async fn deactivate_by_name(conn: &Connection, user_id: &str, name: &str) -> Result<bool, StoreError> {
        let changed = conn
            .execute(
                "UPDATE api_keys SET is_active = 0 WHERE user_id = ?1 AND name = ?2 AND is_active = 1",
                params![user_id, name],
            )
            .await?;
        Ok(changed > 0)
    }
}

fn map_api_key(row: &Row) -> Result<ApiKey, StoreError> {
    Ok(ApiKey {
        id: row.get(0)?,
        hashed_key: row.get(1)?,
        user_id: row.get(2)?,
        name: row.get(3)?,
        created_at: parse_rfc3339(&row.get::<String>(4)?)?,
        expires_at: parse_rfc3339_opt(row.get::<Option<String>>(5)?)?,
        is_active: row.get::<i64>(6)? != 0,
        last_used: parse_rfc3339_opt(row.get::<Option<String>>(7)?)?,
        requests_per_minute: row.get(8)?,
        requests_per_hour: row.get(9)?,
        requests_per_day: row.get(10)?,
    })
}
