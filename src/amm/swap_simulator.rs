// Constant-product swap simulation with a proportional input fee
//
//   effective_input = input - fee_rate * input
//   new_reserve_in  = reserve_in + effective_input
//   output          = reserve_out * effective_input / new_reserve_in
//
// Equivalent to reserve_out - k / new_reserve_in without cancellation for tiny inputs.

use tracing::debug;

use super::{PoolState, SwapResult};
use crate::error::{SlippageError, SlippageResult};

/// Sell `input_amount` of `input_asset` into `pool`.
///
/// `price_impact` compares proceeds to `reference_notional`, the nominal
/// position size expressed in the output asset: `-(1 - output / reference_notional)`.
/// This measures the shortfall against the position size, not against the
/// pre-trade marginal price.
///
/// # Errors
///
/// - [`SlippageError::UnknownAsset`] if `input_asset` is not in the pool
/// - [`SlippageError::InvalidArgument`] for a non-positive input or notional, or a non-finite fee
/// - [`SlippageError::InvalidMarketData`] if a reserve is zero
/// - [`SlippageError::InvalidSwap`] if the fee leaves the pool with a non-positive input reserve
///   or the swap produces nothing
pub fn simulate_swap(
    pool: &PoolState,
    input_asset: &str,
    input_amount: f64,
    fee_rate: f64,
    reference_notional: f64,
) -> SlippageResult<SwapResult> {
    let (reserve_in, reserve_out, output_asset) = pool.reserves_for(input_asset)?;

    if !input_amount.is_finite() || input_amount <= 0.0 {
        return Err(SlippageError::InvalidArgument(
            "input_amount".to_string(),
            format!("must be a positive amount, got {}", input_amount),
        ));
    }
    if !fee_rate.is_finite() {
        return Err(SlippageError::InvalidArgument(
            "fee_rate".to_string(),
            format!("must be finite, got {}", fee_rate),
        ));
    }
    if !reference_notional.is_finite() || reference_notional <= 0.0 {
        return Err(SlippageError::InvalidArgument(
            "reference_notional".to_string(),
            format!("must be a positive amount, got {}", reference_notional),
        ));
    }
    pool.validate()?;

    let effective_input = input_amount - fee_rate * input_amount;
    let new_reserve_in = reserve_in + effective_input;
    if new_reserve_in <= 0.0 {
        return Err(SlippageError::InvalidSwap(format!(
            "input reserve of {} in pool {} would become {}",
            input_asset, pool.pool_id, new_reserve_in
        )));
    }

    let output_amount = reserve_out * effective_input / new_reserve_in;
    if output_amount <= 0.0 {
        return Err(SlippageError::InvalidSwap(format!(
            "selling {} {} with fee rate {} yields no {}",
            input_amount, input_asset, fee_rate, output_asset
        )));
    }

    let price_impact = -(1.0 - output_amount / reference_notional);

    debug!(
        pool = %pool.pool_id,
        input_asset,
        input_amount,
        output_asset,
        output_amount,
        price_impact,
        "simulated swap"
    );

    Ok(SwapResult {
        input_asset: input_asset.to_string(),
        input_amount,
        output_asset: output_asset.to_string(),
        output_amount,
        price_impact,
    })
}

/// Units of the counter asset per unit of `base_asset` for an infinitesimal trade
pub fn marginal_price(pool: &PoolState, base_asset: &str) -> SlippageResult<f64> {
    let (reserve_base, reserve_quote, _) = pool.reserves_for(base_asset)?;
    pool.validate()?;
    Ok(reserve_quote / reserve_base)
}

/// Sell through `first_pool` into the bridge asset, then sell the proceeds
/// through `second_pool`. Each hop pays `fee_rate`; `price_impact` is measured
/// against the original `reference_notional`.
pub fn simulate_two_hop(
    first_pool: &PoolState,
    second_pool: &PoolState,
    input_asset: &str,
    input_amount: f64,
    fee_rate: f64,
    reference_notional: f64,
) -> SlippageResult<SwapResult> {
    let first = simulate_swap(first_pool, input_asset, input_amount, fee_rate, reference_notional)?;
    let second = simulate_swap(
        second_pool,
        &first.output_asset,
        first.output_amount,
        fee_rate,
        reference_notional,
    )?;

    Ok(SwapResult {
        input_asset: first.input_asset,
        input_amount: first.input_amount,
        output_asset: second.output_asset,
        output_amount: second.output_amount,
        price_impact: second.price_impact,
    })
}
