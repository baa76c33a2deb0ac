// [libs/infra/store/src/repositories/usage_repository.rs]
//! The append-only usage ledger: one row per billed request. The
//! rate-limit service derives its windows entirely from `count_since`
//! over this table rather than a separate counter (per SPEC_FULL.md
//! §4.4) — no `UPDATE` ever touches this table once a row is written.

use crate::errors::StoreError;
use crate::time::{now_rfc3339, parse_rfc3339};
use gateway_domain_models::dto::billing::EndpointUsage;
use gateway_domain_models::entities::ApiUsage;
use libsql::{params, Connection, Row};

pub struct NewUsage {
    pub user_id: String,
    pub api_key_id: Option<i64>,
    pub endpoint: String,
    pub tokens_consumed: f64,
    pub request_size: i64,
    pub response_size: i64,
    pub processing_time_ms: i64,
    pub success: bool,
    pub error_message: Option<String>,
}

pub struct UsageRepository;

impl UsageRepository {
    pub async fn insert(conn: &Connection, usage: NewUsage) -> Result<ApiUsage, StoreError> {
        let timestamp = now_rfc3339();
        conn.execute(
            r#"
            INSERT INTO api_usage (
                user_id, api_key_id, endpoint, timestamp, tokens_consumed,
                request_size, response_size, processing_time_ms, success, error_message
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                usage.user_id.clone(),
                usage.api_key_id,
                usage.endpoint.clone(),
                timestamp.clone(),
                usage.tokens_consumed,
                usage.request_size,
                usage.response_size,
                usage.processing_time_ms,
                usage.success as i64,
                usage.error_message.clone(),
            ],
        )
        .await?;

        let mut rows = conn
            .query(
                "SELECT * FROM api_usage WHERE user_id = ?1 AND timestamp = ?2 ORDER BY id DESC LIMIT 1",
                params![usage.user_id, timestamp],
            )
            .await?;
        match rows.next().await? {
            Some(row) => map_usage(&row),
            None => Err(StoreError::MappingError("usage row vanished after insert".into())),
        }
    }

    /// Counts successful requests for `user_id` (optionally scoped to a
    /// single key) within the window `[now - window_seconds, now]`. This
    /// is the entire rate-limit check: no separate counter state.
    pub async fn count_since(
        conn: &Connection,
        user_id: &str,
        api_key_id: Option<i64>,
        since: &str,
    ) -> Result<i64, StoreError> {
        let mut rows = match api_key_id {
            Some(key_id) => {
                conn.query(
                    "SELECT COUNT(*) FROM api_usage WHERE user_id = ?1 AND api_key_id = ?2 AND success = 1 AND timestamp >= ?3",
                    params![user_id, key_id, since],
                )
                .await?
            }
            None => {
                conn.query(
                    "SELECT COUNT(*) FROM api_usage WHERE user_id = ?1 AND success = 1 AND timestamp >= ?2",
                    params![user_id, since],
                )
                .await?
            }
        };

        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::MappingError("COUNT(*) returned no row".into()))?;
        row.get::<i64>(0).map_err(StoreError::QueryError)
    }

    pub async fn list_since(conn: &Connection, user_id: &str, since: &str) -> Result<Vec<ApiUsage>, StoreError> {
        let mut rows = conn
            .query(
                "SELECT * FROM api_usage WHERE user_id = ?1 AND success = 1 AND timestamp >= ?2",
                params![user_id, since],
            )
            .await?;
        let mut usages = Vec::new();
        while let Some(row) = rows.next().await? {
            usages.push(map_usage(&row)?);
        }
        Ok(usages)
    }

    pub async fn endpoint_breakdown_since(
        conn: &Connection,
        user_id: &str,
        since: &str,
    ) -> Result<Vec<EndpointUsage>, StoreError> {
        let mut rows = conn
            .query(
                r#"
                SELECT endpoint, COUNT(*) AS requests, COALESCE(SUM(tokens_consumed), 0.0) AS tokens
                FROM api_usage
                WHERE user_id = ?1 AND success = 1 AND timestamp >= ?2
                GROUP BY endpoint
                "#,
                params![user_id, since],
            )
            .await?;

        let mut breakdown = Vec::new();
        while let Some(row) = rows.next().await? {
            breakdown.push(EndpointUsage {
                endpoint: row.get(0)?,
                requests: row.get(1)?,
                tokens: row.get(2)?,
            });
        }
        Ok(breakdown)
    }
}

fn map_usage(row: &Row) -> Result<ApiUsage, StoreError> {
    Ok(ApiUsage {
        id: row.get(0)?,
        user_id: row.get(1)?,
        api_key_id: row.get(2)?,
        endpoint: row.get(3)?,
        timestamp: parse_rfc3339(&row.get::<String>(4)?)?,
        tokens_consumed: row.get(5)?,
        request_size: row.get(6)?,
        response_size: row.get(7)?,
        processing_time_ms: row.get(8)?,
        success: row.get::<i64>(9)? != 0,
        error_message: row.get(10)?,
    })
}
