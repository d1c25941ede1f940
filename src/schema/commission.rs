use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Cents;

/// One-to-one with a `completed` Transaction; written atomically with the
/// status flip and never updated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRecord {
    pub transaction_id: Uuid,
    pub seller_id: String,
    #[serde(with = "super::money::cents_str")]
    pub amount: Cents,
    pub rate_bps: i64,
}

/// Derived aggregate over a seller's commission records, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerCommissionSummary {
    pub seller_id: String,
    #[serde(with = "super::money::cents_str")]
    pub total_commission: Cents,
    pub transaction_count: i64,
}
