use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::schema::money::Cents;
use crate::schema::{CommissionRecord, Transaction, TransactionStatus};

const MIGRATION_INITIAL: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    seller_id TEXT NOT NULL,
    amount_cents INTEGER NOT NULL,
    currency TEXT NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS commission_records (
    transaction_id TEXT PRIMARY KEY REFERENCES transactions(id),
    seller_id TEXT NOT NULL,
    amount_cents INTEGER NOT NULL,
    rate_bps INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_commission_records_seller ON commission_records(seller_id);
CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status);
"#;

/// The ledger store: durable keyed storage for transactions and their
/// derived commission records.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Failed to create SQLite connect options")?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::raw_sql(MIGRATION_INITIAL)
            .execute(&pool)
            .await
            .context("Failed to run ledger migration")?;

        Ok(Self { pool })
    }

    pub async fn save_transaction(&self, transaction: &Transaction) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, seller_id, amount_cents, currency, status, error_message, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(&transaction.seller_id)
        .bind(transaction.amount)
        .bind(&transaction.currency)
        .bind(transaction.status.as_str())
        .bind(&transaction.error_message)
        .bind(transaction.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;

        Ok(())
    }

    pub async fn get_transaction(&self, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query(
            r#"
            SELECT id, seller_id, amount_cents, currency, status, error_message, created_at
            FROM transactions WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context(format!("Failed to get transaction with id {}", id))?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transaction(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_transactions(&self) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, seller_id, amount_cents, currency, status, error_message, created_at
            FROM transactions ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to get all transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    pub async fn get_transactions_by_status(
        &self,
        status: TransactionStatus,
    ) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, seller_id, amount_cents, currency, status, error_message, created_at
            FROM transactions WHERE status = ? ORDER BY created_at
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to get transactions by status")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Flips a `pending` transaction to `completed` and appends its
    /// commission record in one SQL transaction. Either both writes are
    /// durable or neither is; a transaction that is no longer pending is
    /// refused, so the same id can never be completed twice.
    pub async fn complete_with_commission(&self, record: &CommissionRecord) -> anyhow::Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin ledger write")?;

        let updated = sqlx::query(
            "UPDATE transactions SET status = 'completed' WHERE id = ? AND status = 'pending'",
        )
        .bind(record.transaction_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to mark transaction completed")?;

        if updated.rows_affected() != 1 {
            anyhow::bail!(
                "Transaction {} is not pending and cannot be completed",
                record.transaction_id
            );
        }

        sqlx::query(
            r#"
            INSERT INTO commission_records (transaction_id, seller_id, amount_cents, rate_bps)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.transaction_id.to_string())
        .bind(&record.seller_id)
        .bind(record.amount)
        .bind(record.rate_bps)
        .execute(&mut *tx)
        .await
        .context("Failed to append commission record")?;

        tx.commit().await.context("Failed to commit ledger write")?;

        Ok(())
    }

    /// Failed transactions stay in the ledger for reconciliation, they are
    /// never deleted.
    pub async fn mark_failed(&self, id: Uuid, error_message: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE transactions SET status = 'failed', error_message = ? WHERE id = ?")
            .bind(error_message)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context(format!("Failed to mark transaction {} as failed", id))?;

        Ok(())
    }

    pub async fn get_commission_record(
        &self,
        transaction_id: Uuid,
    ) -> anyhow::Result<Option<CommissionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT transaction_id, seller_id, amount_cents, rate_bps
            FROM commission_records WHERE transaction_id = ?
            "#,
        )
        .bind(transaction_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get commission record")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_commission_record(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn sum_commissions(&self, seller_id: &str) -> anyhow::Result<(Cents, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) AS total, COUNT(*) AS record_count
            FROM commission_records WHERE seller_id = ?
            "#,
        )
        .bind(seller_id)
        .fetch_one(&self.pool)
        .await
        .context(format!("Failed to sum commissions for seller {}", seller_id))?;

        let total: Cents = row.try_get("total")?;
        let count: i64 = row.try_get("record_count")?;
        Ok((total, count))
    }

    fn row_to_transaction(row: &SqliteRow) -> anyhow::Result<Transaction> {
        let id: String = row.try_get("id")?;
        let status: String = row.try_get("status")?;

        Ok(Transaction {
            id: Uuid::parse_str(&id).context("Invalid transaction id in ledger")?,
            seller_id: row.try_get("seller_id")?,
            amount: row.try_get("amount_cents")?,
            currency: row.try_get("currency")?,
            status: TransactionStatus::parse(&status)
                .with_context(|| format!("Unknown transaction status `{}` in ledger", status))?,
            error_message: row.try_get("error_message")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_commission_record(row: &SqliteRow) -> anyhow::Result<CommissionRecord> {
        let transaction_id: String = row.try_get("transaction_id")?;

        Ok(CommissionRecord {
            transaction_id: Uuid::parse_str(&transaction_id)
                .context("Invalid transaction id in commission record")?,
            seller_id: row.try_get("seller_id")?,
            amount: row.try_get("amount_cents")?,
            rate_bps: row.try_get("rate_bps")?,
        })
    }
}
