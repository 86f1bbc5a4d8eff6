// Order book slippage report command
use tracing::{info, warn};
use liquidation_slippage::{
    save_cex_report, Config, CryptoChassisClient, ReportAssembler, ReportProgress, SlippageResult,
    Spinner,
};

pub async fn run_cex_report(
    exchanges: Option<Vec<String>>,
    pairs: Option<Vec<String>>,
    date: Option<String>,
    output: Option<String>,
    config: &Config,
) -> SlippageResult<()> {
    let exchanges = exchanges.unwrap_or_else(|| config.cex.exchanges.clone());
    let pairs = pairs.unwrap_or_else(|| config.cex.pairs.clone());
    let output = output.unwrap_or_else(|| config.report.output_dir.clone());

    info!("📈 Order book slippage report");
    info!("   Exchanges: {}", exchanges.join(", "));
    info!("   Pairs: {}", pairs.join(", "));
    if let Some(day) = date.as_ref().or(config.cex.start_date.as_ref()) {
        info!("   Day: {}", day);
    }

    let assembler = ReportAssembler::from_config(config)?;
    let mut client = CryptoChassisClient::from_config(&config.cex)?;
    if let Some(date) = date {
        client = client.with_start_date(date)?;
    }

    let progress = ReportProgress::new(exchanges.len() * pairs.len(), "CEX");
    let report = assembler
        .cex_report(&mut client, &exchanges, &pairs, |row| {
            progress.row_done(&format!("{} {}", row.venue, row.pair), row.is_complete());
        })
        .await;
    progress.finish(report.failed_rows());

    for row in report.rows.iter().filter(|r| !r.is_complete()) {
        warn!("⚠️  {} {}: {}", row.venue, row.pair, row.error.as_deref().unwrap_or("no data"));
    }

    let spinner = Spinner::new(&format!("Writing CEX report to {}...", output));
    match save_cex_report(&report, &output) {
        Ok(path) => {
            spinner.finish(&format!("Saved {}", path.display()));
            info!("💾 Saved {}", path.display());
            Ok(())
        }
        Err(e) => {
            spinner.finish_with_error("CEX report not written");
            Err(e)
        }
    }
}
