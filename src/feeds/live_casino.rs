use super::extract::extract_tables;
use super::retry::RetryBudget;
use super::{FeedError, TableFeed};
use crate::config::FeedConfig;
use crate::models::table::RouletteTable;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Browser-like headers the LiveCasino endpoint expects.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("cache-control", "no-cache"),
    ("expires", "0"),
    ("pragma", "no-cache"),
    ("sec-ch-ua", "\"Not:A-Brand\";v=\"99\", \"Google Chrome\";v=\"145\", \"Chromium\";v=\"145\""),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("x-bwin-browser-url", "https://www.sportingbet.bet.br/pt-br/games/livecasino"),
    ("x-bwin-casino-api", "prod"),
    ("x-device-type", "desktop"),
    ("x-from-product", "host-app"),
];

/// REST client for the casino's live-games listing.
///
/// Failed fetches are retried with a linearly growing delay; the caller
/// cancels an in-flight fetch by dropping (aborting) its future.
#[derive(Clone)]
pub struct LiveCasinoFeed {
    config: FeedConfig,
    http: reqwest::Client,
    retries: RetryBudget,
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

impl LiveCasinoFeed {
    pub fn new(config: FeedConfig) -> Self {
        let http = reqwest::Client::builder()
            .default_headers(browser_headers())
            .pool_max_idle_per_host(2)
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        let retries = RetryBudget::new(config.max_retries, config.retry_delay_ms);
        Self {
            config,
            http,
            retries,
        }
    }

    /// Single attempt: GET, check status, decode, normalize.
    async fn fetch_once(&self) -> Result<Vec<RouletteTable>, FeedError> {
        let resp = self.http.get(&self.config.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let payload: serde_json::Value = resp.json().await?;
        let tables = extract_tables(&payload);
        debug!("{} roulette tables found", tables.len());
        Ok(tables)
    }

    /// Fetch with retry. Progress is shared across calls, see [`RetryBudget`].
    pub async fn fetch_with_retry(&self) -> Result<Vec<RouletteTable>, FeedError> {
        self.retries.run(move || self.fetch_once()).await
    }

    /// Retries spent since the last success or exhaustion.
    pub fn pending_retries(&self) -> u32 {
        self.retries.used()
    }
}

impl TableFeed for LiveCasinoFeed {
    fn fetch_tables(&self) -> impl Future<Output = Result<Vec<RouletteTable>, FeedError>> + Send {
        self.fetch_with_retry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers_all_valid() {
        let headers = browser_headers();
        assert_eq!(headers.len(), BROWSER_HEADERS.len());
        assert_eq!(headers["x-bwin-casino-api"], "prod");
    }

    #[tokio::test]
    async fn test_unreachable_host_exhausts_retries() {
        let feed = LiveCasinoFeed::new(FeedConfig {
            url: "http://127.0.0.1:1/unreachable".into(),
            timeout_secs: 1,
            max_retries: 2,
            retry_delay_ms: 1,
        });
        let err = feed.fetch_tables().await.unwrap_err();
        assert!(matches!(err, FeedError::RetriesExhausted { attempts: 2, .. }));
        assert!(err.to_string().starts_with("failed after 2 attempts"));
    }

    #[tokio::test]
    async fn test_aborted_fetch_hands_retries_to_next_fetch() {
        let feed = LiveCasinoFeed::new(FeedConfig {
            url: "http://127.0.0.1:1/unreachable".into(),
            timeout_secs: 1,
            max_retries: 2,
            retry_delay_ms: 60_000,
        });

        // Each fetch fails at once and is dropped during its long backoff.
        for expected in 1..=2 {
            let aborted = tokio::time::timeout(Duration::from_millis(500), feed.fetch_tables()).await;
            assert!(aborted.is_err());
            assert_eq!(feed.pending_retries(), expected);
        }

        let exhausted = tokio::time::timeout(Duration::from_secs(5), feed.fetch_tables())
            .await
            .expect("exhaustion should not wait for a backoff");
        assert!(matches!(exhausted, Err(FeedError::RetriesExhausted { attempts: 2, .. })));
        assert_eq!(feed.pending_retries(), 0);
    }
}
