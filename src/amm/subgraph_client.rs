// Uniswap V2 subgraph client for pool reserves

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::PoolState;
use crate::config::AmmConfig;
use crate::error::{SlippageError, SlippageResult};

const PAIR_QUERY: &str = r#"
query pair($pool_id: String) {
  pair(id: $pool_id) {
    token0 { id symbol name }
    token1 { id symbol name }
    reserve0
    reserve1
  }
}
"#;

/// Source of current reserves for a pool
#[async_trait]
pub trait PoolStateProvider: Send {
    /// Fetch the pool; network or response failures are `DataUnavailable`
    async fn fetch(&mut self, pool_id: &str) -> SlippageResult<PoolState>;
}

#[derive(Debug)]
pub struct SubgraphClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    cache: PoolCache,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<PairData>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PairData {
    pair: Option<RawPair>,
}

#[derive(Debug, Deserialize)]
struct RawPair {
    token0: RawToken,
    token1: RawToken,
    reserve0: String,
    reserve1: String,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    symbol: String,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key: None,
            cache: PoolCache::new(Duration::from_secs(300), 100),
        }
    }

    pub fn from_config(config: &AmmConfig) -> SlippageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url: config.subgraph_url.clone(),
            api_key: config.api_key.clone(),
            cache: PoolCache::new(Duration::from_secs(300), 100),
        })
    }

    async fn query_pair(&self, pool_id: &str) -> SlippageResult<PoolState> {
        let body = json!({
            "query": PAIR_QUERY,
            "variables": { "pool_id": pool_id },
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: GraphResponse = request.send().await?.error_for_status()?.json().await?;

        if let Some(first) = response.errors.first() {
            return Err(SlippageError::DataUnavailable(format!(
                "subgraph error for pool {}: {}",
                pool_id, first.message
            )));
        }

        let pair = response
            .data
            .and_then(|d| d.pair)
            .ok_or_else(|| SlippageError::DataUnavailable(format!("pool {} not found", pool_id)))?;

        PoolState::new(
            pool_id,
            pair.token0.symbol,
            parse_reserve(&pair.reserve0)?,
            pair.token1.symbol,
            parse_reserve(&pair.reserve1)?,
        )
    }
}

#[async_trait]
impl PoolStateProvider for SubgraphClient {
    async fn fetch(&mut self, pool_id: &str) -> SlippageResult<PoolState> {
        let key = pool_id.to_ascii_lowercase();
        if let Some(pool) = self.cache.get(&key) {
            debug!(pool_id, "pool reserves served from cache");
            return Ok(pool.clone());
        }

        let pool = self.query_pair(&key).await?;
        info!(
            pool_id,
            asset_a = %pool.asset_a,
            reserve_a = pool.reserve_a,
            asset_b = %pool.asset_b,
            reserve_b = pool.reserve_b,
            "fetched pool reserves"
        );

        self.cache.insert(key, pool.clone());
        Ok(pool)
    }
}

fn parse_reserve(raw: &str) -> SlippageResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| SlippageError::DataUnavailable(format!("invalid reserve '{}': {}", raw, e)))
}

#[derive(Debug)]
struct PoolCache {
    pools: HashMap<String, CachedPool>,
    ttl: Duration,
    max_entries: usize,
}

#[derive(Debug)]
struct CachedPool {
    pool: PoolState,
    cached_at: Instant,
}

impl PoolCache {
    fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            pools: HashMap::new(),
            ttl,
            max_entries,
        }
    }

    fn get(&self, key: &str) -> Option<&PoolState> {
        self.pools
            .get(key)
            .filter(|cached| cached.cached_at.elapsed() <= self.ttl)
            .map(|cached| &cached.pool)
    }

    fn insert(&mut self, key: String, pool: PoolState) {
        // Evict oldest entry if at capacity
        if !self.pools.contains_key(&key) && self.pools.len() >= self.max_entries {
            if let Some(oldest) = self.find_oldest_key() {
                self.pools.remove(&oldest);
            }
        }

        self.pools.insert(
            key,
            CachedPool {
                pool,
                cached_at: Instant::now(),
            },
        );
    }

    fn find_oldest_key(&self) -> Option<String> {
        self.pools
            .iter()
            .min_by_key(|(_, cached)| cached.cached_at)
            .map(|(key, _)| key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let raw = r#"{
            "data": {
                "pair": {
                    "token0": {"id": "0xa0b8", "symbol": "USDC", "name": "USD Coin"},
                    "token1": {"id": "0xc02a", "symbol": "WETH", "name": "Wrapped Ether"},
                    "reserve0": "51234567.123456",
                    "reserve1": "17890.5"
                }
            }
        }"#;
        let parsed: GraphResponse = serde_json::from_str(raw).unwrap();
        let pair = parsed.data.unwrap().pair.unwrap();
        assert_eq!(pair.token0.symbol, "USDC");
        assert_eq!(parse_reserve(&pair.reserve1).unwrap(), 17890.5);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_missing_pair_parses_as_none() {
        let parsed: GraphResponse = serde_json::from_str(r#"{"data": {"pair": null}}"#).unwrap();
        assert!(parsed.data.unwrap().pair.is_none());
    }

    #[test]
    fn test_cache_expiry() {
        let pool = PoolState::new("0x1", "A", 1.0, "B", 2.0).unwrap();

        let mut fresh = PoolCache::new(Duration::from_secs(60), 10);
        fresh.insert("0x1".to_string(), pool.clone());
        assert_eq!(fresh.get("0x1"), Some(&pool));

        let mut expired = PoolCache::new(Duration::ZERO, 10);
        expired.insert("0x1".to_string(), pool);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(expired.get("0x1"), None);
    }

    #[test]
    fn test_cache_evicts_oldest_at_capacity() {
        let pool = PoolState::new("0x1", "A", 1.0, "B", 2.0).unwrap();
        let mut cache = PoolCache::new(Duration::from_secs(60), 2);

        for key in ["0x1", "0x2", "0x3"] {
            cache.insert(key.to_string(), pool.clone());
            std::thread::sleep(Duration::from_millis(2));
        }

        assert_eq!(cache.pools.len(), 2);
        assert_eq!(cache.get("0x1"), None);
        assert!(cache.get("0x2").is_some());
        assert!(cache.get("0x3").is_some());

        // Refreshing a cached key does not evict anything
        cache.insert("0x2".to_string(), pool);
        assert_eq!(cache.pools.len(), 2);
        assert!(cache.get("0x3").is_some());
    }
}
