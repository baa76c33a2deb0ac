// [libs/infra/store/src/client.rs]
//! Connection management for the gateway's relational store. Wraps a
//! `libsql::Database` handle; each caller gets its own `Connection` via
//! [`StoreClient::connection`], matching libsql's connection-per-task
//! model described in SPEC_FULL.md §5.

use crate::errors::StoreError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct StoreClient {
    database: Arc<Database>,
    /// Keeps an in-memory database alive for the process lifetime —
    /// `:memory:` databases are dropped the moment their last
    /// connection closes.
    _memory_anchor: Option<Arc<Connection>>,
}

impl StoreClient {
    #[instrument(skip(auth_token))]
    pub async fn connect(database_url: &str, auth_token: Option<String>) -> Result<Self, StoreError> {
        if database_url.is_empty() {
            return Err(StoreError::ConfigurationError("DATABASE_URL is empty".into()));
        }

        info!(url = %database_url, "connecting to store");

        let is_remote = database_url.starts_with("libsql://") || database_url.starts_with("https://");
        let is_memory = database_url.contains(":memory:");

        let database = if is_remote {
            let token = auth_token
                .ok_or_else(|| StoreError::ConfigurationError("remote store requires an auth token".into()))?;
            Builder::new_remote(database_url.to_string(), token).build().await
        } else {
            Builder::new_local(database_url).build().await
        }
        .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let database = Arc::new(database);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = database
                .connect()
                .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
            apply_schema(&anchor_conn)
                .await
                .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap_conn = database
                .connect()
                .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
            apply_schema(&bootstrap_conn)
                .await
                .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        }

        Ok(Self { database, _memory_anchor: anchor })
    }

    pub fn connection(&self) -> Result<Connection, StoreError> {
        self.database.connect().map_err(|e| {
            error!("connection allocation failed: {}", e);
            StoreError::ConnectionError(e.to_string())
        })
    }
}
