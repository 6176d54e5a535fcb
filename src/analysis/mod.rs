pub mod client;
pub mod parser;
pub mod prompt;

use crate::models::number::RouletteNumber;
use crate::models::strategy::StrategySuggestion;
use crate::signals::stats::StatsEngine;
use std::future::Future;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("analysis provider returned HTTP {0}")]
    Status(u16),

    #[error("analysis request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Anything that turns a prompt into free-form text.
pub trait AnalysisProvider: Send + Sync + 'static {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}

/// Format the prompt for `history`, call the provider and parse the reply.
///
/// Provider failures are reported inside the suggestion; nothing is retried
/// here. The next history change triggers a fresh attempt.
pub async fn analyze<A: AnalysisProvider>(
    provider: &A,
    table_name: &str,
    vendor_name: &str,
    history: &[RouletteNumber],
) -> StrategySuggestion {
    let stats = StatsEngine::compute(history);
    let prompt = prompt::build_prompt(table_name, vendor_name, history, &stats);

    match provider.complete(&prompt).await {
        Ok(text) => parser::parse_response(&text),
        Err(e) => {
            error!("Analysis failed: {e}");
            StrategySuggestion::failed(e.to_string())
        }
    }
}
