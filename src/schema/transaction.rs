use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// A ledger transaction. Immutable once `completed` or `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub seller_id: String,
    #[serde(with = "super::money::cents_str")]
    pub amount: Cents,
    pub currency: String,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(seller_id: String, amount: Cents, currency: String) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            seller_id,
            amount,
            currency,
            status: TransactionStatus::Pending,
            error_message: None,
            created_at: Utc::now(),
        }
    }
}

/// Body of `POST /api/v1/transactions`. Missing fields default to empty so
/// validation can report every bad field at once instead of failing on the
/// first deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTransactionRequest {
    #[serde(default)]
    pub seller_id: String,
    #[serde(default, deserialize_with = "super::money::deserialize_lenient_amount")]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
}
