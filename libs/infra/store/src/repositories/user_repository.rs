// [libs/infra/store/src/repositories/user_repository.rs]
//! User accounts: registration and the two atomic balance mutations
//! (debit, credit) the billing service relies on. Both mutations are a
//! single parameterized `UPDATE ... RETURNING`, so SQLite's own write
//! serialization is what makes concurrent debits against the same user
//! safe — no read-modify-write race in application code.

use crate::errors::StoreError;
use crate::time::{now_rfc3339, parse_rfc3339};
use gateway_domain_models::entities::{
    User, DEFAULT_REQUESTS_PER_DAY, DEFAULT_REQUESTS_PER_HOUR, DEFAULT_REQUESTS_PER_MINUTE,
    DEFAULT_STARTING_BALANCE,
};
use libsql::{params, Connection, Row};

pub struct NewUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    /// Rate-limit defaults for the new account. `None` falls back to
    /// `gateway_domain_models::entities::DEFAULT_REQUESTS_PER_*`, so
    /// callers that don't care about `GatewayConfig`'s overrides (tests,
    /// mostly) can omit them.
    pub requests_per_minute: Option<i64>,
    pub requests_per_hour: Option<i64>,
    pub requests_per_day: Option<i64>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn insert(conn: &Connection, new_user: NewUser) -> Result<User, StoreError> {
        let created_at = now_rfc3339();
        let result = conn
            .execute(
                r#"
                INSERT INTO users (
                    user_id, username, email, hashed_password, created_at,
                    is_active, is_verified, token_balance, total_tokens_purchased,
                    total_tokens_used, requests_per_minute, requests_per_hour, requests_per_day
                ) VALUES (?1, ?2, ?3, ?4, ?5, 1, 1, ?6, ?6, 0.0, ?7, ?8, ?9)
                "#,
                params![
                    new_user.user_id.clone(),
                    new_user.username.clone(),
                    new_user.email.clone(),
                    new_user.hashed_password,
                    created_at,
                    DEFAULT_STARTING_BALANCE,
                    new_user.requests_per_minute.unwrap_or(DEFAULT_REQUESTS_PER_MINUTE),
                    new_user.requests_per_hour.unwrap_or(DEFAULT_REQUESTS_PER_HOUR),
                    new_user.requests_per_day.unwrap_or(DEFAULT_REQUESTS_PER_DAY),
                ],
            )
            .await;

        match result {
            Ok(_) => Self::find_by_user_id(conn, &new_user.user_id)
                .await?
                .ok_or(StoreError::UserNotFound),
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                Err(StoreError::UserAlreadyExists)
            }
            Err(e) => Err(StoreError::QueryError(e)),
        }
    }

    pub async fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>, StoreError> {
        let mut rows = conn
            .query("SELECT * FROM users WHERE username = ?1", params![username])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_user(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_user_id(conn: &Connection, user_id: &str) -> Result<Option<User>, StoreError> {
        let mut rows = conn
            .query("SELECT * FROM users WHERE user_id = ?1", params![user_id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Debits `amount` tokens from `user_id` iff the balance is
    /// sufficient. Returns `None` when the balance check fails instead
    /// of erroring, so callers can distinguish "insufficient balance"
    /// (402) from a real store failure (500).
    pub async fn try_debit(
        conn: &Connection,
        user_id: &str,
        amount: f64,
    ) -> Result<Option<(f64, f64)>, StoreError> {
        let mut rows = conn
            .query(
                r#"
                UPDATE users
                SET token_balance = token_balance - ?1,
                    total_tokens_used = total_tokens_used + ?1
                WHERE user_id = ?2 AND token_balance >= ?1
                RETURNING token_balance + ?1 AS previous_balance, token_balance AS new_balance
                "#,
                params![amount, user_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some((row.get::<f64>(0)?, row.get::<f64>(1)?))),
            None => Ok(None),
        }
    }

    /// Credits `amount` tokens to `user_id`. When `is_purchase` is
    /// true, also advances `total_tokens_purchased` (per
    /// `add_tokens`'s `transaction_type == "purchase"` branch in the
    /// ported billing service).
    pub async fn credit(
        conn: &Connection,
        user_id: &str,
        amount: f64,
        is_purchase: bool,
    ) -> Result<(f64, f64), StoreError> {
        let mut rows = conn
            .query(
                r#"
                UPDATE users
                SET token_balance = token_balance + ?1,
                    total_tokens_purchased = total_tokens_purchased + (CASE WHEN ?2 THEN ?1 ELSE 0.0 END)
                WHERE user_id = ?3
                RETURNING token_balance - ?1 AS previous_balance, token_balance AS new_balance
                "#,
                params![amount, is_purchase as i64, user_id],
            )
            .await?;

        rows.next()
            .await?
            .ok_or(StoreError::UserNotFound)
            .and_then(|row| Ok((row.get::<f64>(0)?, row.get::<f64>(1)?)))
    }
}

fn map_user(row: &Row) -> Result<User, StoreError> {
    Ok(User {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        hashed_password: row.get(4)?,
        created_at: parse_rfc3339(&row.get::<String>(5)?)?,
        is_active: row.get::<i64>(6)? != 0,
        is_verified: row.get::<i64>(7)? != 0,
        token_balance: row.get(8)?,
        total_tokens_purchased: row.get(9)?,
        total_tokens_used: row.get(10)?,
        requests_per_minute: row.get(11)?,
        requests_per_hour: row.get(12)?,
        requests_per_day: row.get(13)?,
    })
}
