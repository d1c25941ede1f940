// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use commission_ledger::commission::CommissionConfig;
use commission_ledger::db::Database;
use commission_ledger::schema::ProcessTransactionRequest;
use commission_ledger::service::TransactionService;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(TransactionService, TempDir)> {
    test_service_with_config(CommissionConfig::default()).await
}

/// Same, but with a custom commission policy
pub async fn test_service_with_config(
    config: CommissionConfig,
) -> Result<(TransactionService, TempDir)> {
    let (db, temp_dir) = test_database().await?;
    Ok((TransactionService::new(db, config), temp_dir))
}

/// Helper to create a bare ledger store over a temporary database
pub async fn test_database() -> Result<(Database, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("ledger.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let db = Database::new(&db_url).await?;
    Ok((db, temp_dir))
}

pub fn request(seller_id: &str, amount: &str, currency: &str) -> ProcessTransactionRequest {
    ProcessTransactionRequest {
        seller_id: seller_id.to_string(),
        amount: amount.to_string(),
        currency: currency.to_string(),
    }
}
