use super::prompt::SYSTEM_PROMPT;
use super::{AnalysisError, AnalysisProvider};
use crate::config::AnalysisConfig;
use serde::Serialize;
use std::future::Future;
use tracing::debug;

/// Text-completion endpoint that answers a chat-style request with plain text.
#[derive(Clone)]
pub struct PollinationsClient {
    config: AnalysisConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl PollinationsClient {
    pub fn new(config: AnalysisConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { config, http }
    }

    async fn post(&self, prompt: &str) -> Result<String, AnalysisError> {
        let body = CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            model: &self.config.model,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        };

        let resp = self.http.post(&self.config.url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        debug!("Analysis reply: {} chars", text.chars().count());
        Ok(text)
    }
}

impl AnalysisProvider for PollinationsClient {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AnalysisError>> + Send {
        self.post(prompt)
    }
}
