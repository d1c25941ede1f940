use std::sync::Arc;

use anyhow::Context;

use crate::auth::{StaticTokenValidator, TokenValidator};
use crate::commission::CommissionConfig;
use crate::state::AppState;

pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub api_tokens: Vec<String>,
    pub commission_yaml: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let api_tokens: Vec<String> = std::env::var("API_TOKENS")
            .context("API_TOKENS must be set")?
            .split(',')
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect();

        if api_tokens.is_empty() {
            anyhow::bail!("API_TOKENS must contain at least one token");
        }

        let commission_yaml = std::env::var("COMMISSION_RATES_YAML").ok();

        Ok(Self {
            database_url,
            bind_addr,
            api_tokens,
            commission_yaml,
        })
    }

    pub async fn create_app_state(&self) -> anyhow::Result<AppState> {
        let commission = match &self.commission_yaml {
            Some(path) => CommissionConfig::from_yaml_file(path).await?,
            None => CommissionConfig::default(),
        };

        let auth: Arc<dyn TokenValidator> =
            Arc::new(StaticTokenValidator::new(self.api_tokens.clone()));

        AppState::new(&self.database_url, commission, auth)
            .await
            .context("Failed to initialize AppState")
    }
}
