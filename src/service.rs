use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::commission::{CommissionCalculator, CommissionConfig};
use crate::db::Database;
use crate::schema::money::{self, Cents};
use crate::schema::{
    CommissionRecord, ProcessTransactionRequest, SellerCommissionSummary, Transaction,
    TransactionStatus,
};

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("transaction not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Orchestrates validation, persistence and commission accrual over the
/// ledger store.
pub struct TransactionService {
    db: Database,
    calculator: CommissionCalculator,
    seller_tiers: HashMap<String, String>,
    supported_currencies: HashSet<String>,
}

impl TransactionService {
    pub fn new(db: Database, config: CommissionConfig) -> Self {
        TransactionService {
            db,
            calculator: CommissionCalculator::new(config.rates_bps, config.default_rate_bps),
            seller_tiers: config.seller_tiers,
            supported_currencies: config.supported_currencies.into_iter().collect(),
        }
    }

    /// Creates a `pending` transaction, then atomically completes it together
    /// with its commission record. On a persistence fault the transaction is
    /// left in the ledger as `failed` and the fault surfaces as an internal
    /// error.
    pub async fn process_transaction(
        &self,
        request: ProcessTransactionRequest,
    ) -> Result<Transaction, ServiceError> {
        let (amount, currency) = self.validate(&request)?;

        let mut transaction =
            Transaction::new(request.seller_id.trim().to_string(), amount, currency);

        if let Err(e) = self.db.save_transaction(&transaction).await {
            log::error!("Failed to persist transaction {}: {:#}", transaction.id, e);
            return Err(ServiceError::Internal(e));
        }

        let tier = self
            .seller_tiers
            .get(&transaction.seller_id)
            .map(String::as_str);
        let (commission, rate_bps) = self.calculator.calculate(amount, tier);

        let record = CommissionRecord {
            transaction_id: transaction.id,
            seller_id: transaction.seller_id.clone(),
            amount: commission,
            rate_bps,
        };

        if let Err(e) = self.db.complete_with_commission(&record).await {
            log::error!("Failed to complete transaction {}: {:#}", transaction.id, e);
            if let Err(mark_err) = self.db.mark_failed(transaction.id, &e.to_string()).await {
                log::error!(
                    "Failed to mark transaction {} as failed: {:#}",
                    transaction.id,
                    mark_err
                );
            }
            return Err(ServiceError::Internal(e));
        }

        transaction.status = TransactionStatus::Completed;
        Ok(transaction)
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<Transaction, ServiceError> {
        self.db
            .get_transaction(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    pub async fn list_transactions(
        &self,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let transactions = match status {
            Some(status) => self.db.get_transactions_by_status(status).await?,
            None => self.db.get_transactions().await?,
        };
        Ok(transactions)
    }

    pub async fn get_commission_record(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<CommissionRecord>, ServiceError> {
        Ok(self.db.get_commission_record(transaction_id).await?)
    }

    /// A seller with no completed transactions gets a zero-valued summary,
    /// not an error.
    pub async fn get_commission_summary(
        &self,
        seller_id: &str,
    ) -> Result<SellerCommissionSummary, ServiceError> {
        let (total_commission, transaction_count) = self.db.sum_commissions(seller_id).await?;
        Ok(SellerCommissionSummary {
            seller_id: seller_id.to_string(),
            total_commission,
            transaction_count,
        })
    }

    fn validate(
        &self,
        request: &ProcessTransactionRequest,
    ) -> Result<(Cents, String), ServiceError> {
        let mut errors = Vec::new();

        if request.seller_id.trim().is_empty() {
            errors.push(FieldError {
                field: "sellerId",
                message: "sellerId is required".to_string(),
            });
        }

        let amount = match money::parse_cents(&request.amount) {
            Ok(amount) if amount > 0 => Some(amount),
            Ok(_) => {
                errors.push(FieldError {
                    field: "amount",
                    message: "amount must be greater than zero".to_string(),
                });
                None
            }
            Err(_) => {
                errors.push(FieldError {
                    field: "amount",
                    message: format!("`{}` is not a valid decimal amount", request.amount),
                });
                None
            }
        };

        let currency = request.currency.trim().to_uppercase();
        if !self.supported_currencies.contains(&currency) {
            let mut supported: Vec<&str> = self
                .supported_currencies
                .iter()
                .map(String::as_str)
                .collect();
            supported.sort_unstable();
            errors.push(FieldError {
                field: "currency",
                message: format!("currency must be one of: {}", supported.join(", ")),
            });
        }

        match (errors.is_empty(), amount) {
            (true, Some(amount)) => Ok((amount, currency)),
            _ => Err(ServiceError::Validation(errors)),
        }
    }
}
