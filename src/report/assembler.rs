// Report assembly over the configured venues, pairs and AMM assets
//
// Every data-source or simulation failure becomes an empty cell (or an empty
// row when the fetch itself failed) and the batch moves on.

use tracing::{debug, warn};

use super::{AmmCell, AmmReport, AmmRow, CexCell, CexReport, CexRow, FillEnd};
use crate::amm::{liquidate, LiquidationRoute, PoolState, PoolStateProvider};
use crate::cex::{simulate_sells, DepthSeries, DepthSeriesProvider};
use crate::config::{AmmConfig, AmmAsset, Config};
use crate::error::{SlippageError, SlippageResult};

#[derive(Debug, Clone)]
pub struct ReportAssembler {
    notionals: Vec<f64>,
}

impl ReportAssembler {
    /// Notionals are sorted ascending and de-duplicated; the last one is the
    /// "largest order" the time-to-fill columns refer to.
    pub fn new(notionals: &[f64]) -> SlippageResult<Self> {
        if notionals.is_empty() {
            return Err(SlippageError::InvalidArgument(
                "notionals".to_string(),
                "at least one notional is required".to_string(),
            ));
        }
        if let Some(bad) = notionals.iter().find(|n| !n.is_finite() || **n <= 0.0) {
            return Err(SlippageError::InvalidArgument(
                "notionals".to_string(),
                format!("{} is not a positive amount", bad),
            ));
        }

        let mut notionals = notionals.to_vec();
        notionals.sort_by(|a, b| a.total_cmp(b));
        notionals.dedup();

        Ok(Self { notionals })
    }

    pub fn from_config(config: &Config) -> SlippageResult<Self> {
        Self::new(&config.report.notional_sizes)
    }

    pub fn notionals(&self) -> &[f64] {
        &self.notionals
    }

    fn largest_notional(&self) -> f64 {
        self.notionals[self.notionals.len() - 1]
    }

    /// Fetch and simulate every (venue, pair), in venue-major order.
    ///
    /// `on_row` is called after each row is assembled.
    pub async fn cex_report<P, F>(
        &self,
        provider: &mut P,
        venues: &[String],
        pairs: &[String],
        mut on_row: F,
    ) -> CexReport
    where
        P: DepthSeriesProvider,
        F: FnMut(&CexRow),
    {
        let mut rows = Vec::with_capacity(venues.len() * pairs.len());

        for venue in venues {
            for pair in pairs {
                let fetched = provider.fetch(venue, pair).await;
                let row = self.cex_row(venue, pair, fetched);
                on_row(&row);
                rows.push(row);
            }
        }

        CexReport {
            notionals: self.notionals.clone(),
            rows,
        }
    }

    /// Build one CEX row from a fetched (or failed) depth series
    pub fn cex_row(&self, venue: &str, pair: &str, fetched: SlippageResult<DepthSeries>) -> CexRow {
        let series = match fetched {
            Ok(series) => series,
            Err(e) => {
                warn!(venue, pair, category = e.category(), error = %e, "depth series unavailable");
                return CexRow {
                    venue: venue.to_string(),
                    pair: pair.to_string(),
                    start_time: None,
                    end_time: None,
                    time_to_fill: None,
                    cells: self.notionals.iter().map(|&n| CexCell::empty(n)).collect(),
                    error: Some(e.to_string()),
                };
            }
        };

        let results = simulate_sells(&series, &self.notionals);
        let largest = self.largest_notional();

        let mut cells = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        let mut end_time = None;
        let mut time_to_fill = None;

        for (&notional, result) in self.notionals.iter().zip(results) {
            match result {
                Ok(fill) => {
                    if notional == largest {
                        end_time = Some(match fill.filled_at {
                            Some(ts) => FillEnd::Filled(ts),
                            None => FillEnd::Unfilled,
                        });
                        time_to_fill = fill.time_to_fill();
                    }
                    cells.push(CexCell {
                        notional,
                        cost: fill.total_cost(),
                        slippage: fill.slippage(),
                        filled_at: fill.filled_at,
                    });
                }
                Err(e) => {
                    warn!(venue, pair, notional, category = e.category(), error = %e, "fill simulation failed");
                    errors.push(format!("{}: {}", notional, e));
                    cells.push(CexCell::empty(notional));
                }
            }
        }

        debug!(venue, pair, failed = errors.len(), "assembled depth row");

        CexRow {
            venue: venue.to_string(),
            pair: pair.to_string(),
            start_time: series.start_time(),
            end_time,
            time_to_fill,
            cells,
            error: join_errors(errors),
        }
    }

    /// Fetch the settlement pool once, then price every configured asset.
    pub async fn amm_report<P, F>(&self, provider: &mut P, config: &AmmConfig, mut on_row: F) -> AmmReport
    where
        P: PoolStateProvider,
        F: FnMut(&AmmRow),
    {
        let settlement = provider.fetch(&config.settlement_pool).await;
        if let Err(e) = &settlement {
            warn!(
                pool = %config.settlement_pool,
                category = e.category(),
                error = %e,
                "settlement pool unavailable, every AMM row will be empty"
            );
        }

        let mut rows = Vec::with_capacity(config.assets.len());
        for asset in &config.assets {
            // No asset pool fetches once the settlement pool is known to be missing
            let asset_pool = if settlement.is_err()
                || asset.pool.eq_ignore_ascii_case(&config.settlement_pool)
            {
                settlement.clone()
            } else {
                provider.fetch(&asset.pool).await
            };

            let row = self.amm_row(asset, asset_pool, &settlement, config);
            on_row(&row);
            rows.push(row);
        }

        AmmReport {
            notionals: self.notionals.clone(),
            rows,
        }
    }

    /// Build one AMM row from the asset's pool and the settlement pool
    pub fn amm_row(
        &self,
        asset: &AmmAsset,
        asset_pool: SlippageResult<PoolState>,
        settlement: &SlippageResult<PoolState>,
        config: &AmmConfig,
    ) -> AmmRow {
        let pools = match (&asset_pool, settlement) {
            (Ok(asset_pool), Ok(settlement)) => Ok((asset_pool, settlement)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        let (asset_pool, settlement) = match pools {
            Ok(pools) => pools,
            Err(e) => {
                warn!(asset = %asset.name, pool = %asset.pool, category = e.category(), error = %e, "pool unavailable");
                return AmmRow {
                    asset: asset.name.clone(),
                    symbol: None,
                    pool: asset.pool.clone(),
                    route: None,
                    cells: self.notionals.iter().map(|&n| AmmCell::empty(n)).collect(),
                    error: Some(e.to_string()),
                };
            }
        };

        let route = LiquidationRoute::for_pool(asset_pool, settlement);

        let mut cells = Vec::with_capacity(self.notionals.len());
        let mut errors = Vec::new();
        let mut symbol = None;
        let mut kind = None;

        for &notional in &self.notionals {
            match liquidate(
                route,
                &config.settlement_asset,
                &config.bridge_asset,
                notional,
                config.fee_rate,
            ) {
                Ok(liq) => {
                    symbol.get_or_insert_with(|| liq.asset.clone());
                    kind.get_or_insert_with(|| liq.route.clone());
                    cells.push(AmmCell {
                        notional,
                        proceeds: Some(liq.proceeds),
                        cost: Some(liq.cost),
                        price_impact: Some(liq.price_impact),
                    });
                }
                Err(e) => {
                    warn!(asset = %asset.name, notional, category = e.category(), error = %e, "swap simulation failed");
                    errors.push(format!("{}: {}", notional, e));
                    cells.push(AmmCell::empty(notional));
                }
            }
        }

        AmmRow {
            asset: asset.name.clone(),
            symbol,
            pool: asset.pool.clone(),
            route: kind,
            cells,
            error: join_errors(errors),
        }
    }
}

fn join_errors(errors: Vec<String>) -> Option<String> {
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cex::DepthSnapshot;
    use chrono::{Duration, TimeZone, Utc};

    fn series() -> DepthSeries {
        let snapshots = [100.0, 99.0, 98.0, 97.0, 96.0]
            .iter()
            .enumerate()
            .map(|(i, &bid_price)| DepthSnapshot {
                timestamp: Utc.timestamp_opt(1_600_000_000 + i as i64, 0).unwrap(),
                bid_price,
                bid_size: 1.0,
                ask_price: bid_price + 1.0,
                ask_size: 1.0,
            })
            .collect();
        DepthSeries::new("coinbase", "btc-usd", snapshots).unwrap()
    }

    #[test]
    fn test_notionals_sorted_and_deduplicated() {
        let assembler = ReportAssembler::new(&[1_000.0, 10.0, 1_000.0, 100.0]).unwrap();
        assert_eq!(assembler.notionals(), &[10.0, 100.0, 1_000.0]);

        assert!(ReportAssembler::new(&[]).is_err());
        assert!(ReportAssembler::new(&[10.0, -1.0]).is_err());
    }

    #[test]
    fn test_cex_row_uses_largest_notional_for_end_time() {
        let assembler = ReportAssembler::new(&[250.0, 50.0]).unwrap();
        let row = assembler.cex_row("coinbase", "btc-usd", Ok(series()));

        assert!(row.is_complete());
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.cells[0].notional, 50.0);
        assert_eq!(row.time_to_fill, Some(Duration::seconds(2)));
        assert_eq!(
            row.end_time,
            Some(FillEnd::Filled(Utc.timestamp_opt(1_600_000_002, 0).unwrap()))
        );
        assert_eq!(row.cell(250.0).and_then(|c| c.slippage), Some(-0.01));
    }

    #[test]
    fn test_cex_row_unfilled_largest() {
        let assembler = ReportAssembler::new(&[50.0, 1_000_000.0]).unwrap();
        let row = assembler.cex_row("coinbase", "btc-usd", Ok(series()));

        assert!(row.is_complete());
        assert_eq!(row.end_time, Some(FillEnd::Unfilled));
        assert_eq!(row.time_to_fill, None);
        assert_eq!(row.cells[1].cost, None);
        assert!(row.cells[0].cost.is_some());
    }

    #[test]
    fn test_cex_row_fetch_failure_is_empty() {
        let assembler = ReportAssembler::new(&[50.0, 250.0]).unwrap();
        let row = assembler.cex_row(
            "kraken",
            "uni-usd",
            Err(SlippageError::DataUnavailable("404".to_string())),
        );

        assert!(!row.is_complete());
        assert_eq!(row.start_time, None);
        assert_eq!(row.end_time, None);
        assert!(row.cells.iter().all(|c| c.cost.is_none() && c.slippage.is_none()));
    }
}
