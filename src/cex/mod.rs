// Centralized exchange path: order book depth series and fill simulation

pub mod depth_client;
pub mod fill_simulator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SlippageError, SlippageResult};

pub use depth_client::{parse_depth_csv, CryptoChassisClient, DepthSeriesProvider};
pub use fill_simulator::{simulate_sell, simulate_sells, FillResult};

/// Top of book at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub timestamp: DateTime<Utc>,
    pub bid_price: f64,
    pub bid_size: f64,
    pub ask_price: f64,
    pub ask_size: f64,
}

/// Time-ordered depth snapshots for one (venue, pair)
#[derive(Debug, Clone)]
pub struct DepthSeries {
    pub venue: String,
    pub pair: String,
    snapshots: Vec<DepthSnapshot>,
    cumulative_bid_size: Vec<f64>,
}

impl DepthSeries {
    /// Build a series, sorting snapshots by timestamp and accumulating bid size.
    ///
    /// Prices and sizes must be finite and sizes non-negative, otherwise the
    /// cumulative bid size would stop being monotone.
    pub fn new(
        venue: impl Into<String>,
        pair: impl Into<String>,
        mut snapshots: Vec<DepthSnapshot>,
    ) -> SlippageResult<Self> {
        for snapshot in &snapshots {
            let values = [
                snapshot.bid_price,
                snapshot.bid_size,
                snapshot.ask_price,
                snapshot.ask_size,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SlippageError::InvalidMarketData(format!(
                    "non-finite value in snapshot at {}",
                    snapshot.timestamp
                )));
            }
            if snapshot.bid_size < 0.0 || snapshot.ask_size < 0.0 {
                return Err(SlippageError::InvalidMarketData(format!(
                    "negative size in snapshot at {}",
                    snapshot.timestamp
                )));
            }
        }

        // Stable sort keeps provider order for equal timestamps
        snapshots.sort_by_key(|s| s.timestamp);

        let cumulative_bid_size = snapshots
            .iter()
            .scan(0.0, |total, s| {
                *total += s.bid_size;
                Some(*total)
            })
            .collect();

        Ok(Self {
            venue: venue.into(),
            pair: pair.into(),
            snapshots,
            cumulative_bid_size,
        })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[DepthSnapshot] {
        &self.snapshots
    }

    /// `cumulative_bid_size[i]` is the total bid size of snapshots `0..=i`
    pub fn cumulative_bid_size(&self) -> &[f64] {
        &self.cumulative_bid_size
    }

    pub fn first(&self) -> Option<&DepthSnapshot> {
        self.snapshots.first()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.snapshots.first().map(|s| s.timestamp)
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.snapshots.last().map(|s| s.timestamp)
    }

    /// Bid price at the start of the window; selling starts here
    pub fn reference_price(&self) -> Option<f64> {
        self.snapshots.first().map(|s| s.bid_price)
    }

    /// Total bid size observed over the whole window
    pub fn total_bid_size(&self) -> f64 {
        self.cumulative_bid_size.last().copied().unwrap_or(0.0)
    }
}
