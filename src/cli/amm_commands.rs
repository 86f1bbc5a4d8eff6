// AMM slippage report command
use tracing::{info, warn};
use liquidation_slippage::{
    save_amm_report, Config, ReportAssembler, ReportProgress, SlippageResult, Spinner,
    SubgraphClient,
};

pub async fn run_amm_report(output: Option<String>, config: &Config) -> SlippageResult<()> {
    let output = output.unwrap_or_else(|| config.report.output_dir.clone());

    info!("🦄 AMM slippage report");
    info!(
        "   Settlement: {} via {} (fee {:.2}%)",
        config.amm.settlement_asset,
        config.amm.bridge_asset,
        config.amm.fee_rate * 100.0
    );

    let assembler = ReportAssembler::from_config(config)?;
    let mut client = SubgraphClient::from_config(&config.amm)?;

    let progress = ReportProgress::new(config.amm.assets.len(), "AMM");
    let report = assembler
        .amm_report(&mut client, &config.amm, |row| {
            progress.row_done(&row.asset, row.is_complete());
        })
        .await;
    progress.finish(report.failed_rows());

    for row in report.rows.iter().filter(|r| !r.is_complete()) {
        warn!("⚠️  {}: {}", row.asset, row.error.as_deref().unwrap_or("no data"));
    }

    let spinner = Spinner::new(&format!("Writing AMM report to {}...", output));
    match save_amm_report(&report, &output) {
        Ok(path) => {
            spinner.finish(&format!("Saved {}", path.display()));
            info!("💾 Saved {}", path.display());
            Ok(())
        }
        Err(e) => {
            spinner.finish_with_error("AMM report not written");
            Err(e)
        }
    }
}
