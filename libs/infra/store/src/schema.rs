// [libs/infra/store/src/schema.rs]
//! Idempotent schema migrations: base tables, then best-effort column
//! additions (tolerating "duplicate column name" so re-applying never
//! fails), then indexes. Mirrors the three-pass structure the rest of
//! the workspace uses for schema evolution.

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_USERS", r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_verified INTEGER NOT NULL DEFAULT 1,
            token_balance REAL NOT NULL DEFAULT 100.0,
            total_tokens_purchased REAL NOT NULL DEFAULT 100.0,
            total_tokens_used REAL NOT NULL DEFAULT 0.0,
            requests_per_minute INTEGER NOT NULL DEFAULT 10,
            requests_per_hour INTEGER NOT NULL DEFAULT 100,
            requests_per_day INTEGER NOT NULL DEFAULT 1000
        );
    "#),
    ("TABLE_API_KEYS", r#"
        CREATE TABLE IF NOT EXISTS api_keys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hashed_key TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at DATETIME,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_used DATETIME,
            requests_per_minute INTEGER,
            requests_per_hour INTEGER,
            requests_per_day INTEGER
        );
    "#),
    ("TABLE_API_USAGE", r#"
        CREATE TABLE IF NOT EXISTS api_usage (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            api_key_id INTEGER,
            endpoint TEXT NOT NULL,
            timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            tokens_consumed REAL NOT NULL DEFAULT 0,
            request_size INTEGER NOT NULL DEFAULT 0,
            response_size INTEGER NOT NULL DEFAULT 0,
            processing_time_ms INTEGER NOT NULL DEFAULT 0,
            success INTEGER NOT NULL DEFAULT 1,
            error_message TEXT
        );
    "#),
    ("TABLE_TOKEN_TRANSACTIONS", r#"
        CREATE TABLE IF NOT EXISTS token_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            transaction_type TEXT NOT NULL,
            amount REAL NOT NULL,
            previous_balance REAL NOT NULL,
            new_balance REAL NOT NULL,
            timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            description TEXT NOT NULL,
            reference_id TEXT
        );
    "#),
    ("TABLE_RATE_LIMIT_STATE", r#"
        CREATE TABLE IF NOT EXISTS rate_limit_state (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            api_key_id INTEGER,
            window_type TEXT NOT NULL,
            window_start DATETIME NOT NULL,
            request_count INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

/// Reserved for forward-compatible column additions to the tables above.
/// Empty today: the initial schema already carries every column the
/// current services read or write.
const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_USERS_USER_ID", "CREATE INDEX IF NOT EXISTS idx_users_user_id ON users(user_id);"),
    ("IDX_API_KEYS_USER", "CREATE INDEX IF NOT EXISTS idx_api_keys_user ON api_keys(user_id);"),
    ("IDX_API_KEYS_HASH", "CREATE INDEX IF NOT EXISTS idx_api_keys_hash ON api_keys(hashed_key);"),
    ("IDX_USAGE_USER_TIME", "CREATE INDEX IF NOT EXISTS idx_usage_user_time ON api_usage(user_id, timestamp);"),
    ("IDX_USAGE_KEY_TIME", "CREATE INDEX IF NOT EXISTS idx_usage_key_time ON api_usage(api_key_id, timestamp);"),
    ("IDX_TXN_USER_TIME", "CREATE INDEX IF NOT EXISTS idx_txn_user_time ON token_transactions(user_id, timestamp);"),
    ("IDX_RATE_LIMIT_LOOKUP", "CREATE INDEX IF NOT EXISTS idx_rate_limit_lookup ON rate_limit_state(user_id, window_type, window_start);"),
];

/// Applies the full migration sequence against `connection`. Safe to
/// call on every process start: every statement is either
/// `IF NOT EXISTS` or tolerant of re-application.
#[instrument(skip(connection))]
pub async fn apply_schema(connection: &Connection) -> Result<()> {
    info!("applying gateway schema");
    create_tables(connection).await?;
    apply_column_additions(connection).await?;
    create_indexes(connection).await?;
    info!("schema up to date");
    Ok(())
}

async fn create_tables(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("creating table: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("failed to create table: {identifier}"))?;
    }
    Ok(())
}

async fn apply_column_additions(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(sql, ()).await {
            Ok(_) => info!("applied column addition: {}", identifier),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!("column addition already applied: {}", identifier);
                } else {
                    warn!("column addition skipped ({}): {}", identifier, message);
                }
            }
        }
    }
    Ok(())
}

async fn create_indexes(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("creating index: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("failed to create index: {identifier}"))?;
    }
    Ok(())
}
