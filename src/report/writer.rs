// CSV output for assembled reports
//
// Absent values are written as empty fields. Column names carry the notional,
// e.g. `slippage_10000usd`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::{AmmReport, CexReport, FillEnd};
use crate::error::SlippageResult;
use crate::types::{AMM_REPORT_FILE, CEX_REPORT_FILE};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn write_cex_report<W: Write>(report: &CexReport, writer: W) -> SlippageResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![
        "exchange".to_string(),
        "pair".to_string(),
        "selling_start_date".to_string(),
        "selling_end_date".to_string(),
        "time_until_filled_largest_order".to_string(),
    ];
    for &notional in &report.notionals {
        header.push(format!("sell_cost_{}usd", notional_label(notional)));
        header.push(format!("slippage_{}usd", notional_label(notional)));
    }
    header.push("error".to_string());
    csv.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![
            row.venue.clone(),
            row.pair.clone(),
            row.start_time.map(format_timestamp).unwrap_or_default(),
            match row.end_time {
                Some(FillEnd::Filled(ts)) => format_timestamp(ts),
                Some(FillEnd::Unfilled) => "unfilled".to_string(),
                None => String::new(),
            },
            row.time_to_fill.map(format_duration).unwrap_or_default(),
        ];
        for &notional in &report.notionals {
            let cell = row.cell(notional);
            record.push(optional(cell.and_then(|c| c.cost)));
            record.push(optional(cell.and_then(|c| c.slippage)));
        }
        record.push(row.error.clone().unwrap_or_default());
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_amm_report<W: Write>(report: &AmmReport, writer: W) -> SlippageResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![
        "asset".to_string(),
        "symbol".to_string(),
        "pool".to_string(),
        "route".to_string(),
    ];
    for &notional in &report.notionals {
        let label = notional_label(notional);
        header.push(format!("proceeds_{}usd", label));
        header.push(format!("cost_{}usd", label));
        header.push(format!("price_impact_{}usd", label));
    }
    header.push("error".to_string());
    csv.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![
            row.asset.clone(),
            row.symbol.clone().unwrap_or_default(),
            row.pool.clone(),
            row.route.as_ref().map(|r| r.to_string()).unwrap_or_default(),
        ];
        for &notional in &report.notionals {
            let cell = row.cell(notional);
            record.push(optional(cell.and_then(|c| c.proceeds)));
            record.push(optional(cell.and_then(|c| c.cost)));
            record.push(optional(cell.and_then(|c| c.price_impact)));
        }
        record.push(row.error.clone().unwrap_or_default());
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Write the CEX report into `dir`, creating it if needed
pub fn save_cex_report(report: &CexReport, dir: impl AsRef<Path>) -> SlippageResult<PathBuf> {
    let path = report_path(dir.as_ref(), CEX_REPORT_FILE)?;
    write_cex_report(report, fs::File::create(&path)?)?;
    info!(path = %path.display(), rows = report.rows.len(), "wrote CEX slippage report");
    Ok(path)
}

/// Write the AMM report into `dir`, creating it if needed
pub fn save_amm_report(report: &AmmReport, dir: impl AsRef<Path>) -> SlippageResult<PathBuf> {
    let path = report_path(dir.as_ref(), AMM_REPORT_FILE)?;
    write_amm_report(report, fs::File::create(&path)?)?;
    info!(path = %path.display(), rows = report.rows.len(), "wrote AMM slippage report");
    Ok(path)
}

fn report_path(dir: &Path, file_name: &str) -> SlippageResult<PathBuf> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(file_name))
}

fn notional_label(notional: f64) -> String {
    format!("{}", notional)
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// `D days HH:MM:SS`
fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let days = total / 86_400;
    let rem = total % 86_400;
    format!(
        "{} days {:02}:{:02}:{:02}",
        days,
        rem / 3_600,
        (rem % 3_600) / 60,
        rem % 60
    )
}
