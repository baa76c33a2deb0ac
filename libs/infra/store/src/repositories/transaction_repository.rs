// [libs/infra/store/src/repositories/transaction_repository.rs]
//! The immutable token-transaction ledger: every debit and credit gets
//! a row here alongside the balance snapshot it produced. Never
//! updated, never deleted.

use crate::errors::StoreError;
use crate::time::{now_rfc3339, parse_rfc3339};
use gateway_domain_models::entities::TokenTransaction;
use libsql::{params, Connection, Row};

pub struct NewTransaction {
    pub user_id: String,
    pub transaction_type: String,
    pub amount: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
    pub description: String,
    pub reference_id: Option<String>,
}

pub struct TransactionRepository;

impl TransactionRepository {
    pub async fn insert(conn: &Connection, txn: NewTransaction) -> Result<TokenTransaction, StoreError> {
        let timestamp = now_rfc3339();
        conn.execute(
            r#"
            INSERT INTO token_transactions (
                user_id, transaction_type, amount, previous_balance, new_balance,
                timestamp, description, reference_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                txn.user_id.clone(),
                txn.transaction_type,
                txn.amount,
                txn.previous_balance,
                txn.new_balance,
                timestamp.clone(),
                txn.description,
                txn.reference_id,
            ],
        )
        .await?;

        let mut rows = conn
            .query(
                "SELECT * FROM token_transactions WHERE user_id = ?1 AND timestamp = ?2 ORDER BY id DESC LIMIT 1",
                params![txn.user_id, timestamp],
            )
            .await?;
        match rows.next().await? {
            Some(row) => map_transaction(&row),
            None => Err(StoreError::MappingError("transaction row vanished after insert".into())),
        }
    }

    pub async fn list_recent(
        conn: &Connection,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<TokenTransaction>, StoreError> {
        let mut rows = conn
            .query(
                "SELECT * FROM token_transactions WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
                params![user_id, limit],
            )
            .await?;
        let mut transactions = Vec::new();
        while let Some(row) = rows.next().await? {
            transactions.push(map_transaction(&row)?);
        }
        Ok(transactions)
    }
}

fn map_transaction(row: &Row) -> Result<TokenTransaction, StoreError> {
    Ok(TokenTransaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        transaction_type: row.get(2)?,
        amount: row.get(3)?,
        previous_balance: row.get(4)?,
        new_balance: row.get(5)?,
        timestamp: parse_rfc3339(&row.get::<String>(6)?)?,
        description: row.get(7)?,
        reference_id: row.get(8)?,
    })
}
