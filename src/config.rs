// Configuration management for the slippage estimator

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete configuration structure matching config.toml.example
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub cex: CexConfig,
    #[serde(default)]
    pub amm: AmmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Position sizes in settlement currency (USD)
    #[serde(default = "default_notional_sizes")]
    pub notional_sizes: Vec<f64>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CexConfig {
    #[serde(default = "default_depth_url")]
    pub base_url: String,
    #[serde(default = "default_exchanges")]
    pub exchanges: Vec<String>,
    #[serde(default = "default_pairs")]
    pub pairs: Vec<String>,
    /// Day to replay (YYYY-MM-DD); the provider serves the latest full day when unset
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default = "default_max_calls_per_minute")]
    pub max_calls_per_minute: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmmConfig {
    #[serde(default = "default_subgraph_url")]
    pub subgraph_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,
    #[serde(default = "default_settlement_asset")]
    pub settlement_asset: String,
    #[serde(default = "default_bridge_asset")]
    pub bridge_asset: String,
    /// Pool pairing the bridge asset with the settlement asset (e.g. USDC/WETH)
    #[serde(default = "default_settlement_pool")]
    pub settlement_pool: String,
    #[serde(default = "default_assets")]
    pub assets: Vec<AmmAsset>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// An asset to liquidate and the pool that prices it against the bridge asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmAsset {
    pub name: String,
    pub pool: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_notional_sizes() -> Vec<f64> {
    vec![10_000.0, 100_000.0, 1_000_000.0, 10_000_000.0, 100_000_000.0]
}
fn default_output_dir() -> String { "reports".to_string() }
fn default_depth_url() -> String { crate::types::CRYPTO_CHASSIS_URL.to_string() }
fn default_exchanges() -> Vec<String> { vec!["coinbase".to_string(), "kraken".to_string()] }
fn default_pairs() -> Vec<String> {
    ["btc-usd", "eth-usd", "ltc-usd", "uni-usd"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}
fn default_max_calls_per_minute() -> u32 { 30 }
fn default_request_timeout() -> u64 { 60 }
fn default_subgraph_url() -> String { crate::types::UNISWAP_V2_SUBGRAPH_URL.to_string() }
fn default_fee_rate() -> f64 { crate::types::UNISWAP_V2_FEE_RATE }
fn default_settlement_asset() -> String { "USDC".to_string() }
fn default_bridge_asset() -> String { "WETH".to_string() }
fn default_settlement_pool() -> String { crate::types::USDC_WETH_POOL.to_string() }
fn default_assets() -> Vec<AmmAsset> {
    vec![
        AmmAsset { name: "bitcoin".to_string(), pool: crate::types::WBTC_WETH_POOL.to_string() },
        AmmAsset { name: "ethereum".to_string(), pool: crate::types::USDC_WETH_POOL.to_string() },
        AmmAsset { name: "uniswap".to_string(), pool: crate::types::UNI_WETH_POOL.to_string() },
    ]
}
fn default_log_level() -> String { "info".to_string() }

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            notional_sizes: default_notional_sizes(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for CexConfig {
    fn default() -> Self {
        Self {
            base_url: default_depth_url(),
            exchanges: default_exchanges(),
            pairs: default_pairs(),
            start_date: None,
            max_calls_per_minute: default_max_calls_per_minute(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            subgraph_url: default_subgraph_url(),
            api_key: None,
            fee_rate: default_fee_rate(),
            settlement_asset: default_settlement_asset(),
            bridge_asset: default_bridge_asset(),
            settlement_pool: default_settlement_pool(),
            assets: default_assets(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            cex: CexConfig::default(),
            amm: AmmConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration or return error with helpful message
    pub fn load_or_error<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::FileNotFound(path_ref.display().to_string()));
        }

        Self::from_file(path_ref)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.notional_sizes.is_empty() {
            return Err(ConfigError::Validation(
                "notional_sizes must contain at least one size".to_string(),
            ));
        }

        if let Some(bad) = self
            .report
            .notional_sizes
            .iter()
            .find(|n| !n.is_finite() || **n <= 0.0)
        {
            return Err(ConfigError::Validation(format!(
                "notional size {} must be a positive number",
                bad
            )));
        }

        if !self.amm.fee_rate.is_finite() || self.amm.fee_rate < 0.0 || self.amm.fee_rate >= 1.0 {
            return Err(ConfigError::Validation(
                "fee_rate must be in [0, 1)".to_string(),
            ));
        }

        if self.amm.settlement_asset.eq_ignore_ascii_case(&self.amm.bridge_asset) {
            return Err(ConfigError::Validation(
                "settlement_asset and bridge_asset must differ".to_string(),
            ));
        }

        if self.cex.max_calls_per_minute == 0 {
            return Err(ConfigError::Validation(
                "max_calls_per_minute must be greater than 0".to_string(),
            ));
        }

        if let Some(date) = &self.cex.start_date {
            chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                ConfigError::Validation(format!("start_date '{}' is not YYYY-MM-DD: {}", date, e))
            })?;
        }

        if let Some(asset) = self.amm.assets.iter().find(|a| a.pool.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "asset '{}' has no pool id",
                asset.name
            )));
        }

        Ok(())
    }

    /// Parse the configured log level, falling back to INFO
    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.notional_sizes.len(), 5);
        assert_eq!(config.amm.fee_rate, 0.003);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [report]
            notional_sizes = [5000.0]

            [cex]
            exchanges = ["bitstamp"]
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.report.notional_sizes, vec![5000.0]);
        assert_eq!(config.cex.exchanges, vec!["bitstamp".to_string()]);
        assert_eq!(config.cex.pairs.len(), 4);
        assert_eq!(config.amm.bridge_asset, "WETH");
    }

    #[test]
    fn test_rejects_non_positive_notional() {
        let mut config = Config::default();
        config.report.notional_sizes = vec![1000.0, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_bad_start_date() {
        let mut config = Config::default();
        config.cex.start_date = Some("yesterday".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.cex.start_date = Some("2021-06-01".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_fallback() {
        let mut config = Config::default();
        config.logging.level = "debug".to_string();
        assert_eq!(config.log_level(), tracing::Level::DEBUG);

        config.logging.level = "chatty".to_string();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }
}
