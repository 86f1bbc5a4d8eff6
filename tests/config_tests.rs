// Integration tests for configuration loading and validation

mod common;

use common::{create_test_config, WBTC_WETH};
use liquidation_slippage::{Config, ConfigError, SlippageError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_file_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    let config = create_test_config();
    config.to_file(&config_path).expect("Failed to write config");

    let loaded = Config::from_file(&config_path).expect("Failed to load config");
    assert_eq!(loaded.report.notional_sizes, vec![1_000.0, 100_000.0, 10_000_000.0]);
    assert_eq!(loaded.amm.assets.len(), 3);
    assert_eq!(loaded.amm.assets[0].pool, WBTC_WETH);
    assert_eq!(loaded.cex.exchanges, config.cex.exchanges);
}

#[test]
fn test_example_config_parses() {
    let config: Config = toml::from_str(include_str!("../config.toml.example"))
        .expect("example config should parse");

    assert!(config.validate().is_ok());
    assert_eq!(config.amm.settlement_asset, "USDC");
    assert_eq!(config.amm.assets.len(), 3);
    assert_eq!(config.cex.start_date, None);
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("nope.toml");

    let err = Config::load_or_error(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));

    let err: SlippageError = err.into();
    assert!(err.user_message().contains("slippage init"));
}

#[test]
fn test_invalid_fee_rate_rejected_on_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    fs::write(&config_path, "[amm]\nfee_rate = 1.5\n").unwrap();

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn test_malformed_toml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    fs::write(&config_path, "[report\nnotional_sizes = ").unwrap();

    assert!(matches!(
        Config::from_file(&config_path),
        Err(ConfigError::Parse(_))
    ));
}
