// Order book fill simulation by depth consumption over time
//
// A sell order of a given notional is worked against the bid side as it
// accumulates second by second. The order is filled at the first snapshot
// where accumulated bid size exceeds the volume to sell; the realized price
// is the simple mean of bid prices seen up to and including that snapshot.

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::DepthSeries;
use crate::error::{SlippageError, SlippageResult};

/// Outcome of liquidating one notional against a depth series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillResult {
    /// Requested size in settlement currency
    pub notional: f64,
    /// First bid price of the window
    pub reference_price: f64,
    /// Asset units to sell: `notional / reference_price`
    pub volume: f64,
    pub start_time: DateTime<Utc>,
    /// `None` when the window never accumulated enough bid size
    pub filled_at: Option<DateTime<Utc>>,
    pub fill_index: Option<usize>,
    pub average_execution_price: Option<f64>,
}

impl FillResult {
    pub fn is_filled(&self) -> bool {
        self.filled_at.is_some()
    }

    /// Realized minus reference price, per asset unit
    pub fn sell_cost(&self) -> Option<f64> {
        self.average_execution_price
            .map(|avg| avg - self.reference_price)
    }

    /// Sell cost as a fraction of the reference price
    pub fn slippage(&self) -> Option<f64> {
        self.sell_cost().map(|cost| cost / self.reference_price)
    }

    /// Sell cost over the whole volume, in settlement currency
    pub fn total_cost(&self) -> Option<f64> {
        self.sell_cost().map(|cost| cost * self.volume)
    }

    pub fn time_to_fill(&self) -> Option<Duration> {
        self.filled_at.map(|end| end - self.start_time)
    }
}

/// Simulate selling `notional` worth of the asset into the bid side of `series`.
///
/// # Errors
///
/// - [`SlippageError::InvalidArgument`] if `notional` is not a positive number
/// - [`SlippageError::InsufficientData`] if the series is empty
/// - [`SlippageError::InvalidMarketData`] if the reference bid price is not positive
pub fn simulate_sell(series: &DepthSeries, notional: f64) -> SlippageResult<FillResult> {
    if !notional.is_finite() || notional <= 0.0 {
        return Err(SlippageError::InvalidArgument(
            "notional".to_string(),
            format!("must be a positive amount, got {}", notional),
        ));
    }

    let first = series.first().ok_or_else(|| {
        SlippageError::InsufficientData(format!(
            "no depth snapshots for {} {}",
            series.venue, series.pair
        ))
    })?;

    let reference_price = first.bid_price;
    if reference_price <= 0.0 {
        return Err(SlippageError::InvalidMarketData(format!(
            "reference bid price {} for {} {} is not positive",
            reference_price, series.venue, series.pair
        )));
    }

    let volume = notional / reference_price;

    // Strictly greater: a boundary that only matches the volume is not a fill
    let fill_index = series
        .cumulative_bid_size()
        .iter()
        .position(|&cumulative| cumulative > volume);

    let (filled_at, average_execution_price) = match fill_index {
        Some(i) => {
            let window = &series.snapshots()[..=i];
            let mean = window.iter().map(|s| s.bid_price).sum::<f64>() / window.len() as f64;
            (Some(window[i].timestamp), Some(mean))
        }
        None => (None, None),
    };

    debug!(
        venue = %series.venue,
        pair = %series.pair,
        notional,
        volume,
        ?fill_index,
        "simulated sell"
    );

    Ok(FillResult {
        notional,
        reference_price,
        volume,
        start_time: first.timestamp,
        filled_at,
        fill_index,
        average_execution_price,
    })
}

/// Simulate several notionals against one series; results keep input order.
pub fn simulate_sells(series: &DepthSeries, notionals: &[f64]) -> Vec<SlippageResult<FillResult>> {
    notionals
        .par_iter()
        .map(|&notional| simulate_sell(series, notional))
        .collect()
}
