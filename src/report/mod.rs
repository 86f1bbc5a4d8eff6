// Report records: one explicit row per (venue, pair) or AMM asset
//
// A cell that could not be computed is `None`; the row keeps the reason in
// `error` so a failed data source never aborts the rest of the batch.

pub mod assembler;
pub mod writer;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::amm::route::RouteKind;

pub use assembler::ReportAssembler;
pub use writer::{save_amm_report, save_cex_report, write_amm_report, write_cex_report};

/// When the largest order finished filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillEnd {
    Filled(DateTime<Utc>),
    Unfilled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CexCell {
    pub notional: f64,
    /// Sell cost in settlement currency over the whole volume
    pub cost: Option<f64>,
    pub slippage: Option<f64>,
    pub filled_at: Option<DateTime<Utc>>,
}

impl CexCell {
    pub fn empty(notional: f64) -> Self {
        Self {
            notional,
            cost: None,
            slippage: None,
            filled_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CexRow {
    pub venue: String,
    pub pair: String,
    pub start_time: Option<DateTime<Utc>>,
    /// Fill end of the largest notional; `None` when it was never simulated
    pub end_time: Option<FillEnd>,
    #[serde(skip)]
    pub time_to_fill: Option<Duration>,
    pub cells: Vec<CexCell>,
    pub error: Option<String>,
}

impl CexRow {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn cell(&self, notional: f64) -> Option<&CexCell> {
        self.cells.iter().find(|c| c.notional == notional)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmmCell {
    pub notional: f64,
    /// Settlement asset received
    pub proceeds: Option<f64>,
    pub cost: Option<f64>,
    pub price_impact: Option<f64>,
}

impl AmmCell {
    pub fn empty(notional: f64) -> Self {
        Self {
            notional,
            proceeds: None,
            cost: None,
            price_impact: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmmRow {
    /// Configured asset name
    pub asset: String,
    /// Token symbol sold, once the pool is known
    pub symbol: Option<String>,
    pub pool: String,
    pub route: Option<RouteKind>,
    pub cells: Vec<AmmCell>,
    pub error: Option<String>,
}

impl AmmRow {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn cell(&self, notional: f64) -> Option<&AmmCell> {
        self.cells.iter().find(|c| c.notional == notional)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CexReport {
    pub notionals: Vec<f64>,
    pub rows: Vec<CexRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmmReport {
    pub notionals: Vec<f64>,
    pub rows: Vec<AmmRow>,
}

impl CexReport {
    pub fn failed_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_complete()).count()
    }
}

impl AmmReport {
    pub fn failed_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_complete()).count()
    }
}
