// Crypto-chassis market depth client
//
// The API answers a depth request with a link to a gzip-compressed CSV of
// one day of top-of-book snapshots at 1-second resolution:
//
//   time_seconds,bid_price_bid_size,ask_price_ask_size
//   1622505600,36700.5_0.25,36701.0_1.1

use std::io::{Cursor, Read};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info};

use super::{DepthSeries, DepthSnapshot};
use crate::config::CexConfig;
use crate::error::{SlippageError, SlippageResult};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Source of historical depth series for a (venue, pair)
#[async_trait]
pub trait DepthSeriesProvider: Send {
    /// Fetch the depth series; any network or parsing failure is `DataUnavailable`
    async fn fetch(&mut self, venue: &str, pair: &str) -> SlippageResult<DepthSeries>;
}

#[derive(Debug)]
pub struct CryptoChassisClient {
    client: reqwest::Client,
    base_url: String,
    start_date: Option<String>,
    rate_limiter: RateLimiter,
}

#[derive(Debug, Deserialize)]
struct DepthIndexResponse {
    urls: Vec<DepthFileLink>,
}

#[derive(Debug, Deserialize)]
struct DepthFileLink {
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawDepthRow {
    time_seconds: i64,
    bid_price_bid_size: String,
    ask_price_ask_size: String,
}

impl CryptoChassisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            start_date: None,
            rate_limiter: RateLimiter::new(30, Duration::from_secs(60)),
        }
    }

    pub fn from_config(config: &CexConfig) -> SlippageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            start_date: config.start_date.clone(),
            rate_limiter: RateLimiter::new(config.max_calls_per_minute, Duration::from_secs(60)),
        })
    }

    /// Replay a specific day (YYYY-MM-DD) instead of the configured one
    pub fn with_start_date(mut self, date: impl Into<String>) -> SlippageResult<Self> {
        let date = date.into();
        chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
            SlippageError::InvalidArgument("date".to_string(), format!("'{}' is not YYYY-MM-DD: {}", date, e))
        })?;
        self.start_date = Some(date);
        Ok(self)
    }

    async fn fetch_depth_link(&mut self, venue: &str, pair: &str) -> SlippageResult<String> {
        self.rate_limiter.wait_if_needed().await;

        let url = format!("{}/v1/market-depth/{}/{}", self.base_url, venue, pair);
        let mut request = self.client.get(&url);
        if let Some(date) = &self.start_date {
            request = request.query(&[("startTime", date)]);
        }

        let response = request.send().await?.error_for_status()?;
        let index: DepthIndexResponse = response.json().await?;

        index
            .urls
            .into_iter()
            .next()
            .map(|link| link.url)
            .ok_or_else(|| {
                SlippageError::DataUnavailable(format!("no depth file listed for {} {}", venue, pair))
            })
    }

    async fn download(&mut self, url: &str) -> SlippageResult<Vec<u8>> {
        self.rate_limiter.wait_if_needed().await;

        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DepthSeriesProvider for CryptoChassisClient {
    async fn fetch(&mut self, venue: &str, pair: &str) -> SlippageResult<DepthSeries> {
        let link = self.fetch_depth_link(venue, pair).await?;
        debug!(venue, pair, link = %link, "downloading depth file");

        let body = self.download(&link).await?;
        let series = decode_depth_file(venue, pair, &body)?;

        info!(
            venue,
            pair,
            snapshots = series.len(),
            total_bid_size = series.total_bid_size(),
            "fetched depth series"
        );
        Ok(series)
    }
}

/// Decode a depth file body, gunzipping it when compressed
pub fn decode_depth_file(venue: &str, pair: &str, body: &[u8]) -> SlippageResult<DepthSeries> {
    if body.starts_with(&GZIP_MAGIC) {
        parse_depth_csv(venue, pair, GzDecoder::new(body))
    } else {
        parse_depth_csv(venue, pair, Cursor::new(body))
    }
}

/// Parse an uncompressed depth CSV into a series.
///
/// Read, decompression and parse failures are all `DataUnavailable`. An empty
/// body yields an empty series.
pub fn parse_depth_csv<R: Read>(venue: &str, pair: &str, reader: R) -> SlippageResult<DepthSeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // deserialize() swallows header read errors, so read the header first
    let headers = csv_reader.headers().map_err(depth_file_error)?;
    if !headers.is_empty() && !headers.iter().any(|h| h == "time_seconds") {
        return Err(SlippageError::DataUnavailable(format!(
            "depth file for {} {} has no time_seconds column",
            venue, pair
        )));
    }

    let mut snapshots = Vec::new();
    for row in csv_reader.deserialize::<RawDepthRow>() {
        let row = row.map_err(depth_file_error)?;
        let (bid_price, bid_size) = parse_level(&row.bid_price_bid_size)?;
        let (ask_price, ask_size) = parse_level(&row.ask_price_ask_size)?;

        let timestamp = DateTime::<Utc>::from_timestamp(row.time_seconds, 0).ok_or_else(|| {
            SlippageError::DataUnavailable(format!("invalid timestamp {}", row.time_seconds))
        })?;

        snapshots.push(DepthSnapshot {
            timestamp,
            bid_price,
            bid_size,
            ask_price,
            ask_size,
        });
    }

    DepthSeries::new(venue, pair, snapshots)
}

fn depth_file_error(err: csv::Error) -> SlippageError {
    SlippageError::DataUnavailable(format!("unreadable depth file: {}", err))
}

/// Split a `price_size` field; deeper books list further levels after `|`
fn parse_level(field: &str) -> SlippageResult<(f64, f64)> {
    let top = field.split('|').next().unwrap_or(field);
    let (price, size) = top
        .split_once('_')
        .ok_or_else(|| SlippageError::DataUnavailable(format!("malformed depth level '{}'", field)))?;

    let price = price
        .parse::<f64>()
        .map_err(|e| SlippageError::DataUnavailable(format!("invalid price '{}': {}", price, e)))?;
    let size = size
        .parse::<f64>()
        .map_err(|e| SlippageError::DataUnavailable(format!("invalid size '{}': {}", size, e)))?;

    Ok((price, size))
}

#[derive(Debug)]
struct RateLimiter {
    max_calls: u32,
    window_duration: Duration,
    calls: Vec<Instant>,
}

impl RateLimiter {
    fn new(max_calls: u32, window_duration: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            window_duration,
            calls: Vec::new(),
        }
    }

    async fn wait_if_needed(&mut self) {
        let now = Instant::now();

        // Remove old calls outside the window
        self.calls.retain(|&call_time| now.duration_since(call_time) <= self.window_duration);

        if self.calls.len() >= self.max_calls as usize {
            if let Some(&oldest_call) = self.calls.first() {
                let wait_time = self.window_duration.saturating_sub(now.duration_since(oldest_call));
                if !wait_time.is_zero() {
                    debug!(wait_ms = wait_time.as_millis() as u64, "rate limit reached, waiting");
                    sleep(wait_time).await;
                }
            }
        }

        self.calls.push(Instant::now());
    }
}
