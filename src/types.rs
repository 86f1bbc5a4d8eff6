// Common constants used across the application

// Market data endpoints
pub const CRYPTO_CHASSIS_URL: &str = "https://api.cryptochassis.com";
pub const UNISWAP_V2_SUBGRAPH_URL: &str = "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2";

// Uniswap V2 liquidity provider fee (0.3%)
pub const UNISWAP_V2_FEE_RATE: f64 = 0.003;

// Uniswap V2 pools
pub const USDC_WETH_POOL: &str = "0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc";
pub const WBTC_WETH_POOL: &str = "0xbb2b8038a1640196fbe3e38816f3e67cba72d940";
pub const UNI_WETH_POOL: &str = "0xd3d2e2692501a5c9ca623199d38826e513033a17";

// Report file names
pub const CEX_REPORT_FILE: &str = "slippage_report_cex.csv";
pub const AMM_REPORT_FILE: &str = "slippage_report_uniswapv2.csv";
