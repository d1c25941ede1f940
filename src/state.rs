use std::sync::Arc;

use anyhow::Result;

use crate::auth::TokenValidator;
use crate::commission::CommissionConfig;
use crate::db::Database;
use crate::service::TransactionService;

pub struct AppState {
    pub service: TransactionService,
    pub auth: Arc<dyn TokenValidator>,
}

impl AppState {
    pub async fn new(
        database_url: &str,
        config: CommissionConfig,
        auth: Arc<dyn TokenValidator>,
    ) -> Result<Self> {
        let db = Database::new(database_url).await?;
        log::info!("Ledger database initialized successfully!");

        Ok(AppState {
            service: TransactionService::new(db, config),
            auth,
        })
    }
}
