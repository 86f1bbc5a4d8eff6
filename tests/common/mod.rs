// Common test utilities and helpers
#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use liquidation_slippage::{
    AmmAsset, AmmConfig, Config, DepthSeries, DepthSeriesProvider, DepthSnapshot, PoolState,
    PoolStateProvider, SlippageError, SlippageResult,
};

pub const USDC_WETH: &str = "0xusdc-weth";
pub const WBTC_WETH: &str = "0xwbtc-weth";
pub const UNI_WETH: &str = "0xuni-weth";

/// Create a test configuration with small notionals
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.report.notional_sizes = vec![1_000.0, 100_000.0, 10_000_000.0];
    config.amm = test_amm_config();
    config
}

pub fn test_amm_config() -> AmmConfig {
    AmmConfig {
        settlement_pool: USDC_WETH.to_string(),
        assets: vec![
            AmmAsset { name: "bitcoin".to_string(), pool: WBTC_WETH.to_string() },
            AmmAsset { name: "ethereum".to_string(), pool: USDC_WETH.to_string() },
            AmmAsset { name: "uniswap".to_string(), pool: UNI_WETH.to_string() },
        ],
        ..AmmConfig::default()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()
}

/// One snapshot per second with the given bid prices and sizes
pub fn depth_series(venue: &str, pair: &str, prices: &[f64], sizes: &[f64]) -> DepthSeries {
    let snapshots = prices
        .iter()
        .zip(sizes)
        .enumerate()
        .map(|(i, (&bid_price, &bid_size))| DepthSnapshot {
            timestamp: start_time() + Duration::seconds(i as i64),
            bid_price,
            bid_size,
            ask_price: bid_price * 1.0005,
            ask_size: bid_size,
        })
        .collect();
    DepthSeries::new(venue, pair, snapshots).expect("valid depth series")
}

/// Generate a random-walk depth series
pub fn generate_depth_series(base_price: f64, count: usize, volatility: f64, max_size: f64) -> DepthSeries {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut price = base_price;
    let mut prices = Vec::with_capacity(count);
    let mut sizes = Vec::with_capacity(count);

    for _ in 0..count {
        price *= 1.0 + rng.gen_range(-volatility..volatility);
        prices.push(price);
        sizes.push(rng.gen_range(0.0..max_size));
    }

    depth_series("coinbase", "btc-usd", &prices, &sizes)
}

pub fn usdc_weth_pool() -> PoolState {
    PoolState::new(USDC_WETH, "USDC", 200_000_000.0, "WETH", 100_000.0).unwrap()
}

pub fn wbtc_weth_pool() -> PoolState {
    PoolState::new(WBTC_WETH, "WBTC", 2_000.0, "WETH", 30_000.0).unwrap()
}

pub fn uni_weth_pool() -> PoolState {
    PoolState::new(UNI_WETH, "UNI", 5_000_000.0, "WETH", 25_000.0).unwrap()
}

/// Depth provider serving canned series; unknown keys are unavailable
#[derive(Default)]
pub struct FakeDepthProvider {
    pub series: HashMap<(String, String), DepthSeries>,
    pub calls: Vec<(String, String)>,
}

impl FakeDepthProvider {
    pub fn with(mut self, series: DepthSeries) -> Self {
        self.series
            .insert((series.venue.clone(), series.pair.clone()), series);
        self
    }
}

#[async_trait]
impl DepthSeriesProvider for FakeDepthProvider {
    async fn fetch(&mut self, venue: &str, pair: &str) -> SlippageResult<DepthSeries> {
        self.calls.push((venue.to_string(), pair.to_string()));
        self.series
            .get(&(venue.to_string(), pair.to_string()))
            .cloned()
            .ok_or_else(|| SlippageError::DataUnavailable(format!("no depth for {} {}", venue, pair)))
    }
}

/// Pool provider serving canned pools; unknown ids are unavailable
#[derive(Default)]
pub struct FakePoolProvider {
    pub pools: HashMap<String, PoolState>,
    pub calls: Vec<String>,
}

impl FakePoolProvider {
    pub fn with(mut self, pool: PoolState) -> Self {
        self.pools.insert(pool.pool_id.clone(), pool);
        self
    }

    pub fn standard() -> Self {
        Self::default()
            .with(usdc_weth_pool())
            .with(wbtc_weth_pool())
            .with(uni_weth_pool())
    }
}

#[async_trait]
impl PoolStateProvider for FakePoolProvider {
    async fn fetch(&mut self, pool_id: &str) -> SlippageResult<PoolState> {
        self.calls.push(pool_id.to_string());
        self.pools
            .get(pool_id)
            .cloned()
            .ok_or_else(|| SlippageError::DataUnavailable(format!("pool {} not found", pool_id)))
    }
}
