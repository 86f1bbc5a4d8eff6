// Liquidation routes into the settlement asset
//
// An asset pooled directly against the settlement asset is sold in one hop.
// Anything else is sold into the bridge asset first and the bridge proceeds
// are sold into the settlement asset.

use std::fmt;

use serde::Serialize;

use super::swap_simulator::{marginal_price, simulate_swap, simulate_two_hop};
use super::PoolState;
use crate::error::{SlippageError, SlippageResult};

#[derive(Debug, Clone, Copy)]
pub enum LiquidationRoute<'a> {
    /// The asset is the bridge asset itself, sold in the settlement pool
    Direct { pool: &'a PoolState },
    /// asset -> bridge in `asset_pool`, bridge -> settlement in `settlement_pool`
    Bridged {
        asset_pool: &'a PoolState,
        settlement_pool: &'a PoolState,
    },
}

impl<'a> LiquidationRoute<'a> {
    /// Pick the route for an asset priced by `asset_pool`
    pub fn for_pool(asset_pool: &'a PoolState, settlement_pool: &'a PoolState) -> Self {
        if asset_pool.pool_id.eq_ignore_ascii_case(&settlement_pool.pool_id) {
            LiquidationRoute::Direct { pool: settlement_pool }
        } else {
            LiquidationRoute::Bridged {
                asset_pool,
                settlement_pool,
            }
        }
    }

    fn settlement_pool(&self) -> &'a PoolState {
        match *self {
            LiquidationRoute::Direct { pool } => pool,
            LiquidationRoute::Bridged { settlement_pool, .. } => settlement_pool,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RouteKind {
    Direct,
    Bridged { via: String },
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Direct => write!(f, "direct"),
            RouteKind::Bridged { via } => write!(f, "via {}", via),
        }
    }
}

/// Cost of turning a `notional`-sized position into the settlement asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Liquidation {
    pub asset: String,
    pub route: RouteKind,
    /// Position size in settlement currency
    pub notional: f64,
    /// Position size in asset units, priced at pre-trade marginal rates
    pub position_size: f64,
    /// Settlement asset received
    pub proceeds: f64,
    /// `proceeds - notional`
    pub cost: f64,
    pub price_impact: f64,
}

/// Simulate liquidating `notional` worth of the routed asset.
///
/// The position is sized with zero-size marginal quotes: the bridge rate from
/// the settlement pool, then the asset-per-bridge rate from the asset pool.
pub fn liquidate(
    route: LiquidationRoute<'_>,
    settlement_asset: &str,
    bridge_asset: &str,
    notional: f64,
    fee_rate: f64,
) -> SlippageResult<Liquidation> {
    if !notional.is_finite() || notional <= 0.0 {
        return Err(SlippageError::InvalidArgument(
            "notional".to_string(),
            format!("must be a positive amount, got {}", notional),
        ));
    }

    let settlement_pool = route.settlement_pool();
    let counter = settlement_pool.counter_asset(bridge_asset)?;
    if !counter.eq_ignore_ascii_case(settlement_asset) {
        return Err(SlippageError::UnknownAsset(
            settlement_asset.to_string(),
            settlement_pool.pool_id.clone(),
        ));
    }

    // settlement units per bridge unit, e.g. USDC per WETH
    let bridge_rate = marginal_price(settlement_pool, bridge_asset)?;
    let bridge_size = notional / bridge_rate;

    let (asset, position_size, swap, kind) = match route {
        LiquidationRoute::Direct { pool } => {
            let swap = simulate_swap(pool, bridge_asset, bridge_size, fee_rate, notional)?;
            (bridge_asset.to_string(), bridge_size, swap, RouteKind::Direct)
        }
        LiquidationRoute::Bridged {
            asset_pool,
            settlement_pool,
        } => {
            let asset = asset_pool.counter_asset(bridge_asset)?.to_string();
            let asset_per_bridge = marginal_price(asset_pool, bridge_asset)?;
            let position_size = bridge_size * asset_per_bridge;
            let swap = simulate_two_hop(
                asset_pool,
                settlement_pool,
                &asset,
                position_size,
                fee_rate,
                notional,
            )?;
            let kind = RouteKind::Bridged {
                via: bridge_asset.to_string(),
            };
            (asset, position_size, swap, kind)
        }
    };

    Ok(Liquidation {
        asset,
        route: kind,
        notional,
        position_size,
        proceeds: swap.output_amount,
        cost: swap.output_amount - notional,
        price_impact: swap.price_impact,
    })
}
