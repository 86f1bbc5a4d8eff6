// Liquidation Slippage Library
//
// Estimates what it costs to liquidate a position of a given USD size, either
// by replaying centralized-exchange order book depth or by swapping through
// constant-product AMM pools

pub mod amm;
pub mod cex;
pub mod config;
pub mod error;       // Unified error handling
pub mod progress;
pub mod report;
pub mod types;

// Re-export error types
pub use error::{SlippageError, SlippageResult};

// Re-export configuration
pub use config::{AmmAsset, AmmConfig, CexConfig, Config, ConfigError, LoggingConfig, ReportConfig};

// Re-export order book components
pub use cex::{
    parse_depth_csv, simulate_sell, simulate_sells, CryptoChassisClient, DepthSeries,
    DepthSeriesProvider, DepthSnapshot, FillResult,
};

// Re-export AMM components
pub use amm::{
    liquidate, marginal_price, simulate_swap, simulate_two_hop, Liquidation, LiquidationRoute,
    PoolState, PoolStateProvider, SubgraphClient, SwapResult,
    route::RouteKind,
};

// Re-export reporting
pub use report::{
    save_amm_report, save_cex_report, write_amm_report, write_cex_report, AmmCell, AmmReport,
    AmmRow, CexCell, CexReport, CexRow, FillEnd, ReportAssembler,
};

pub use progress::{ReportProgress, Spinner};
