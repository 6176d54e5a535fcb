use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub analysis: AnalysisConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,      // Retries after the first failed attempt (e.g. 3)
    pub retry_delay_ms: u64,   // Base delay, multiplied by the attempt number (e.g. 2000)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub enabled: bool,
    pub url: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,             // Quiet period after a history change before analysis
    pub max_history: usize,
    pub min_history_for_analysis: usize,
    /// Table to follow on startup. None = first table the feed reports.
    pub vendor: Option<String>,
    pub table_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub discord_webhook_url: Option<String>,
    pub alert_on_offline: bool,
    pub latency_samples: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://www.sportingbet.bet.br/pt-br/games/api/LiveCasino/GetData?isSitecoreInfoRequired=false".into(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://text.pollinations.ai/".into(),
            model: "openai".into(),
            temperature: 0.2,
            top_p: 0.9,
            max_tokens: 400,
            timeout_secs: 60,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            debounce_ms: 1000,
            max_history: crate::signals::history::MAX_HISTORY,
            min_history_for_analysis: 5,
            vendor: None,
            table_id: None,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            discord_webhook_url: None,
            alert_on_offline: true,
            latency_samples: 500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            analysis: AnalysisConfig::default(),
            session: SessionConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_non_empty(key).and_then(|v| v.trim().parse().ok())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables (.env file) with defaults.
    ///
    /// Optional env vars:
    ///   ROULETTE_FEED_URL, ROULETTE_FEED_TIMEOUT_SECS
    ///   ROULETTE_MAX_RETRIES, ROULETTE_RETRY_DELAY_MS
    ///   ROULETTE_POLL_INTERVAL_MS, ROULETTE_DEBOUNCE_MS
    ///   ROULETTE_MIN_HISTORY_FOR_ANALYSIS
    ///   ROULETTE_VENDOR, ROULETTE_TABLE_ID: table to follow on startup
    ///   ANALYSIS_URL, ANALYSIS_MODEL, ANALYSIS_DISABLED
    ///   TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID, DISCORD_WEBHOOK_URL: offline alerts
    ///   RUST_LOG: log level (default: info)
    pub fn load_or_default() -> Self {
        let _ = dotenv::dotenv();

        let mut config = Self::default();

        if let Some(url) = env_non_empty("ROULETTE_FEED_URL") {
            config.feed.url = url;
        }
        if let Some(secs) = env_parse("ROULETTE_FEED_TIMEOUT_SECS") {
            config.feed.timeout_secs = secs;
        }
        if let Some(n) = env_parse("ROULETTE_MAX_RETRIES") {
            config.feed.max_retries = n;
        }
        if let Some(ms) = env_parse("ROULETTE_RETRY_DELAY_MS") {
            config.feed.retry_delay_ms = ms;
        }

        if let Some(ms) = env_parse("ROULETTE_POLL_INTERVAL_MS") {
            config.session.poll_interval_ms = ms;
        }
        if let Some(ms) = env_parse("ROULETTE_DEBOUNCE_MS") {
            config.session.debounce_ms = ms;
        }
        if let Some(n) = env_parse("ROULETTE_MIN_HISTORY_FOR_ANALYSIS") {
            config.session.min_history_for_analysis = n;
        }
        config.session.vendor = env_non_empty("ROULETTE_VENDOR");
        config.session.table_id = env_non_empty("ROULETTE_TABLE_ID");

        if let Some(url) = env_non_empty("ANALYSIS_URL") {
            config.analysis.url = url;
        }
        if let Some(model) = env_non_empty("ANALYSIS_MODEL") {
            config.analysis.model = model;
        }
        if env_flag("ANALYSIS_DISABLED") {
            config.analysis.enabled = false;
        }

        config.telemetry.telegram_bot_token = env_non_empty("TELEGRAM_BOT_TOKEN");
        config.telemetry.telegram_chat_id = env_non_empty("TELEGRAM_CHAT_ID");
        config.telemetry.discord_webhook_url = env_non_empty("DISCORD_WEBHOOK_URL");

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.telemetry.log_level = level;
        }

        config
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.session.poll_interval_ms)
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.session.debounce_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.feed.url)
            .map_err(|e| anyhow::anyhow!("invalid feed url {}: {e}", self.feed.url))?;
        if self.analysis.enabled {
            url::Url::parse(&self.analysis.url)
                .map_err(|e| anyhow::anyhow!("invalid analysis url {}: {e}", self.analysis.url))?;
        }
        anyhow::ensure!(self.session.poll_interval_ms > 0, "poll interval must be non-zero");
        anyhow::ensure!(self.session.max_history > 0, "max_history must be positive");
        anyhow::ensure!(self.feed.timeout_secs > 0, "feed timeout must be non-zero");
        anyhow::ensure!(
            self.session.table_id.is_none() || self.session.vendor.is_some(),
            "ROULETTE_TABLE_ID requires ROULETTE_VENDOR"
        );
        Ok(())
    }
}
