use crate::config::TelemetryConfig;
use anyhow::Result;
use tracing::{error, info};

/// Sends feed status alerts via Telegram or Discord webhooks.
pub struct AlertManager {
    config: TelemetryConfig,
    http: reqwest::Client,
}

impl AlertManager {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        (self.config.telegram_bot_token.is_some() && self.config.telegram_chat_id.is_some())
            || self.config.discord_webhook_url.is_some()
    }

    pub async fn send(&self, message: &str) {
        info!("ALERT: {message}");

        if let Err(e) = self.send_telegram(message).await {
            error!("Telegram alert failed: {e}");
        }

        if let Err(e) = self.send_discord(message).await {
            error!("Discord alert failed: {e}");
        }
    }

    async fn send_telegram(&self, message: &str) -> Result<()> {
        let (Some(token), Some(chat_id)) = (&self.config.telegram_bot_token, &self.config.telegram_chat_id) else {
            return Ok(());
        };

        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": format!("🎰 Roleta: {message}"),
        });

        self.http.post(&url).json(&body).send().await?.error_for_status()?;
        Ok(())
    }

    async fn send_discord(&self, message: &str) -> Result<()> {
        let Some(webhook_url) = &self.config.discord_webhook_url else {
            return Ok(());
        };

        let body = serde_json::json!({
            "content": format!("🎰 **Roleta**: {message}")
        });

        self.http.post(webhook_url).json(&body).send().await?.error_for_status()?;
        Ok(())
    }

    /// Feed went offline after exhausting its retries.
    pub async fn on_offline(&self, reason: &str) {
        if self.config.alert_on_offline {
            self.send(&format!("⚠️ Feed offline: {reason}")).await;
        }
    }

    pub async fn on_recovered(&self) {
        if self.config.alert_on_offline {
            self.send("✅ Feed back online").await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_requires_full_telegram_pair() {
        let mut config = TelemetryConfig::default();
        assert!(!AlertManager::new(config.clone()).is_configured());

        config.telegram_bot_token = Some("token".into());
        assert!(!AlertManager::new(config.clone()).is_configured());

        config.telegram_chat_id = Some("chat".into());
        assert!(AlertManager::new(config).is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_send_is_noop() {
        let alerts = AlertManager::new(TelemetryConfig::default());
        alerts.on_offline("HTTP 503").await;
        alerts.on_recovered().await;
    }
}
