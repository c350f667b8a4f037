use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("fuzzy_threshold must be within 0.0..=1.0, got {0}")]
    BadThreshold(f64),
}

/// Rate/threshold tables for one reconciliation run. Passed into the
/// orchestrator explicitly so runs are parameterizable and testable in
/// isolation; nothing here is a module-level constant.
///
/// FX rates are keyed by upper-case currency code and expressed as
/// "units of base currency per one unit of the keyed currency". TOML
/// values are strings so decimals survive without float drift:
///
/// ```toml
/// base_currency = "GBP"
/// fee_ceiling_minor = 500
///
/// [fx_rates]
/// USD = "0.79"
/// EUR = "0.86"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub base_currency: String,
    pub fx_rates: BTreeMap<String, Decimal>,
    /// Single-source amounts at or below this (minor units) are eligible
    /// for the gateway-fee heuristic.
    pub fee_ceiling_minor: i64,
    /// Minimum normalized reference-similarity ratio for fuzzy clustering.
    pub fuzzy_threshold: f64,
    /// Substrings of `ref_norm` that identify a known payment gateway.
    pub known_gateways: Vec<String>,
    /// Date gap beyond which a same-amount counterpart signals a timing
    /// exception rather than an unknown one.
    pub date_tolerance_days: i64,
    /// Policy switch: promote equal-amount two-source groups to Matched
    /// instead of Partially Matched.
    pub two_source_equal_is_matched: bool,
}

impl Default for ReconConfig {
    fn default() -> Self {
        let mut fx_rates = BTreeMap::new();
        fx_rates.insert("GBP".to_string(), Decimal::ONE);
        fx_rates.insert("USD".to_string(), Decimal::new(79, 2));
        fx_rates.insert("EUR".to_string(), Decimal::new(86, 2));
        Self {
            base_currency: "GBP".to_string(),
            fx_rates,
            fee_ceiling_minor: 500,
            fuzzy_threshold: 0.92,
            known_gateways: vec![
                "stripe".to_string(),
                "paypal".to_string(),
                "square".to_string(),
            ],
            date_tolerance_days: 2,
            two_source_equal_is_matched: false,
        }
    }
}

impl ReconConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: ReconConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::BadThreshold(self.fuzzy_threshold));
        }
        Ok(())
    }

    /// Conversion rate to the base currency. Unknown codes convert at
    /// 1.0, i.e. they are treated as already being base currency.
    pub fn rate_for(&self, currency: &str) -> Decimal {
        self.fx_rates
            .get(&currency.to_uppercase())
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tables() {
        let cfg = ReconConfig::default();
        assert_eq!(cfg.base_currency, "GBP");
        assert_eq!(cfg.rate_for("USD"), Decimal::new(79, 2));
        assert_eq!(cfg.fee_ceiling_minor, 500);
        assert_eq!(cfg.date_tolerance_days, 2);
        assert!(!cfg.two_source_equal_is_matched);
        assert!(cfg.known_gateways.iter().any(|g| g == "stripe"));
    }

    #[test]
    fn unknown_currency_converts_at_par() {
        let cfg = ReconConfig::default();
        assert_eq!(cfg.rate_for("JPY"), Decimal::ONE);
        assert_eq!(cfg.rate_for("usd"), Decimal::new(79, 2));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = ReconConfig::from_toml_str(
            r#"
            fuzzy_threshold = 0.95
            known_gateways = ["stripe"]

            [fx_rates]
            USD = "0.80"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.fuzzy_threshold, 0.95);
        assert_eq!(cfg.known_gateways, vec!["stripe".to_string()]);
        assert_eq!(cfg.rate_for("USD"), Decimal::new(80, 2));
        // Untouched fields keep their defaults.
        assert_eq!(cfg.fee_ceiling_minor, 500);
        assert_eq!(cfg.base_currency, "GBP");
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let err = ReconConfig::from_toml_str("fuzzy_threshold = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::BadThreshold(_)));
    }
}
