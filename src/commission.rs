use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;

use crate::schema::money::Cents;

/// 5% unless configured otherwise.
pub const DEFAULT_RATE_BPS: i64 = 500;

/// Commission policy: per-tier rates in basis points, a default rate for
/// sellers with no tier assignment, and the supported currency set.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionConfig {
    #[serde(default)]
    pub rates_bps: HashMap<String, i64>,
    #[serde(default = "default_rate_bps")]
    pub default_rate_bps: i64,
    #[serde(default)]
    pub seller_tiers: HashMap<String, String>,
    #[serde(default = "default_currencies")]
    pub supported_currencies: Vec<String>,
}

fn default_rate_bps() -> i64 {
    DEFAULT_RATE_BPS
}

fn default_currencies() -> Vec<String> {
    ["USD", "EUR", "GBP"].map(String::from).to_vec()
}

impl Default for CommissionConfig {
    fn default() -> Self {
        CommissionConfig {
            rates_bps: HashMap::new(),
            default_rate_bps: default_rate_bps(),
            seller_tiers: HashMap::new(),
            supported_currencies: default_currencies(),
        }
    }
}

impl CommissionConfig {
    pub async fn from_yaml_file(path: &str) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read commission config `{}`", path))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid commission config in `{}`", path))
    }
}

/// Pure rate lookup and commission math. No I/O, fully deterministic.
#[derive(Debug, Clone)]
pub struct CommissionCalculator {
    rates_bps: HashMap<String, i64>,
    default_rate_bps: i64,
}

impl CommissionCalculator {
    pub fn new(rates_bps: HashMap<String, i64>, default_rate_bps: i64) -> Self {
        CommissionCalculator {
            rates_bps,
            default_rate_bps,
        }
    }

    pub fn rate_for(&self, tier: Option<&str>) -> i64 {
        tier.and_then(|tier| self.rates_bps.get(tier).copied())
            .unwrap_or(self.default_rate_bps)
    }

    /// Returns the commission rounded half-up at the cent, together with the
    /// rate that was applied. The intermediate product is widened to i128 so
    /// an amount near `Cents::MAX` cannot overflow.
    pub fn calculate(&self, amount: Cents, tier: Option<&str>) -> (Cents, i64) {
        let rate_bps = self.rate_for(tier);
        let commission = (i128::from(amount) * i128::from(rate_bps) + 5_000) / 10_000;
        (i64::try_from(commission).unwrap_or(Cents::MAX), rate_bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> CommissionCalculator {
        let rates = HashMap::from([("premium".to_string(), 250), ("basic".to_string(), 750)]);
        CommissionCalculator::new(rates, DEFAULT_RATE_BPS)
    }

    #[test]
    fn five_percent_of_one_hundred_is_five() {
        let (commission, rate_bps) = calculator().calculate(10_000, None);
        assert_eq!(commission, 500);
        assert_eq!(rate_bps, 500);
    }

    #[test]
    fn tier_rate_overrides_the_default() {
        let (commission, rate_bps) = calculator().calculate(10_000, Some("premium"));
        assert_eq!(commission, 250);
        assert_eq!(rate_bps, 250);
    }

    #[test]
    fn unknown_tier_falls_back_to_default_rate() {
        let (commission, rate_bps) = calculator().calculate(10_000, Some("gold"));
        assert_eq!(commission, 500);
        assert_eq!(rate_bps, 500);
    }

    #[test]
    fn rounds_half_up_at_the_cent() {
        // 0.99 at 5% = 4.95 cents -> 5 cents
        assert_eq!(calculator().calculate(99, None).0, 5);
        // 0.01 at 2.5% = 0.025 cents -> 0 cents
        assert_eq!(calculator().calculate(1, Some("premium")).0, 0);
    }

    #[test]
    fn extreme_amounts_do_not_overflow() {
        let (commission, rate_bps) = calculator().calculate(i64::MAX, None);
        assert_eq!(rate_bps, 500);
        assert_eq!(commission, 461_168_601_842_738_790);
    }

    #[test]
    fn config_defaults_are_sane() {
        let config = CommissionConfig::default();
        assert_eq!(config.default_rate_bps, 500);
        assert!(config.supported_currencies.contains(&"USD".to_string()));
    }

    #[test]
    fn config_parses_from_yaml() {
        let yaml = r#"
rates_bps:
  premium: 250
default_rate_bps: 600
seller_tiers:
  seller-1: premium
supported_currencies: ["USD"]
"#;
        let config: CommissionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rates_bps["premium"], 250);
        assert_eq!(config.default_rate_bps, 600);
        assert_eq!(config.seller_tiers["seller-1"], "premium");
        assert_eq!(config.supported_currencies, vec!["USD"]);
    }
}
