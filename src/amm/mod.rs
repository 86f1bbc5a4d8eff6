//! Constant-product AMM path.
//!
//! Pools are two-asset snapshots (`asset_a`/`reserve_a`, `asset_b`/`reserve_b`);
//! swaps are priced on `x * y = k` with a proportional fee taken from the
//! input. Nothing here mutates a pool: each simulation works on the snapshot
//! it is given.

pub mod route;
pub mod subgraph_client;
pub mod swap_simulator;

use serde::Serialize;

use crate::error::{SlippageError, SlippageResult};

pub use route::{liquidate, Liquidation, LiquidationRoute};
pub use subgraph_client::{PoolStateProvider, SubgraphClient};
pub use swap_simulator::{marginal_price, simulate_swap, simulate_two_hop};

/// Reserves of a two-asset pool at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolState {
    pub pool_id: String,
    pub asset_a: String,
    pub reserve_a: f64,
    pub asset_b: String,
    pub reserve_b: f64,
}

impl PoolState {
    /// Build a pool snapshot, rejecting degenerate reserves.
    ///
    /// # Errors
    ///
    /// [`SlippageError::InvalidMarketData`] if either reserve is not a positive
    /// finite number or both sides name the same asset.
    pub fn new(
        pool_id: impl Into<String>,
        asset_a: impl Into<String>,
        reserve_a: f64,
        asset_b: impl Into<String>,
        reserve_b: f64,
    ) -> SlippageResult<Self> {
        let pool = Self {
            pool_id: pool_id.into(),
            asset_a: asset_a.into(),
            reserve_a,
            asset_b: asset_b.into(),
            reserve_b,
        };
        pool.validate()?;
        Ok(pool)
    }

    /// Check the reserve invariant; fields are public so callers may have edited them
    pub fn validate(&self) -> SlippageResult<()> {
        for (asset, reserve) in [(&self.asset_a, self.reserve_a), (&self.asset_b, self.reserve_b)] {
            if !reserve.is_finite() || reserve <= 0.0 {
                return Err(SlippageError::InvalidMarketData(format!(
                    "pool {} has degenerate {} reserve {}",
                    self.pool_id, asset, reserve
                )));
            }
        }

        if self.asset_a.eq_ignore_ascii_case(&self.asset_b) {
            return Err(SlippageError::InvalidMarketData(format!(
                "pool {} pairs {} with itself",
                self.pool_id, self.asset_a
            )));
        }

        Ok(())
    }

    /// The asset on the other side of the pool from `asset`
    pub fn counter_asset(&self, asset: &str) -> SlippageResult<&str> {
        if self.asset_a.eq_ignore_ascii_case(asset) {
            Ok(&self.asset_b)
        } else if self.asset_b.eq_ignore_ascii_case(asset) {
            Ok(&self.asset_a)
        } else {
            Err(self.unknown(asset))
        }
    }

    /// `(reserve_in, reserve_out, output_asset)` for a swap selling `input_asset`
    pub fn reserves_for(&self, input_asset: &str) -> SlippageResult<(f64, f64, &str)> {
        if self.asset_a.eq_ignore_ascii_case(input_asset) {
            Ok((self.reserve_a, self.reserve_b, &self.asset_b))
        } else if self.asset_b.eq_ignore_ascii_case(input_asset) {
            Ok((self.reserve_b, self.reserve_a, &self.asset_a))
        } else {
            Err(self.unknown(input_asset))
        }
    }

    fn unknown(&self, asset: &str) -> SlippageError {
        SlippageError::UnknownAsset(asset.to_string(), self.pool_id.clone())
    }
}

/// Outcome of selling `input_amount` of `input_asset`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapResult {
    pub input_asset: String,
    pub input_amount: f64,
    pub output_asset: String,
    pub output_amount: f64,
    /// `-(1 - output_amount / reference_notional)`; negative means proceeds fell short
    pub price_impact: f64,
}

impl SwapResult {
    /// Output units received per input unit
    pub fn execution_price(&self) -> f64 {
        self.output_amount / self.input_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> PoolState {
        PoolState::new("0xpool", "WBTC", 500.0, "WETH", 7_500.0).unwrap()
    }

    #[test]
    fn test_reserves_for_each_side() {
        let pool = pool();
        assert_eq!(pool.reserves_for("WBTC").unwrap(), (500.0, 7_500.0, "WETH"));
        assert_eq!(pool.reserves_for("weth").unwrap(), (7_500.0, 500.0, "WBTC"));
        assert_eq!(pool.counter_asset("WETH").unwrap(), "WBTC");
    }

    #[test]
    fn test_unknown_asset() {
        let pool = pool();
        assert_eq!(
            pool.reserves_for("DAI"),
            Err(SlippageError::UnknownAsset("DAI".to_string(), "0xpool".to_string()))
        );
        assert!(matches!(pool.counter_asset("DAI"), Err(SlippageError::UnknownAsset(_, _))));
    }

    #[test]
    fn test_degenerate_pools_rejected() {
        assert!(matches!(
            PoolState::new("0x1", "A", 0.0, "B", 1.0),
            Err(SlippageError::InvalidMarketData(_))
        ));
        assert!(matches!(
            PoolState::new("0x1", "A", 1.0, "B", -3.0),
            Err(SlippageError::InvalidMarketData(_))
        ));
        assert!(matches!(
            PoolState::new("0x1", "A", 1.0, "a", 1.0),
            Err(SlippageError::InvalidMarketData(_))
        ));
    }
}
