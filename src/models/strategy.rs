use serde::{Deserialize, Serialize};

/// Advisory betting suggestion returned by the analysis provider.
///
/// `risk` is kept as the provider wrote it (lower-cased), not mapped to a
/// fixed set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySuggestion {
    pub estrategia: String,
    pub alternativa: String,
    pub justificativa: String,
    /// 0..=100
    pub confianca: u8,
    pub risco: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl StrategySuggestion {
    /// Empty state shown before the first analysis and after a table switch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Provider failure reported inline.
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            estrategia: "Análise indisponível".into(),
            alternativa: "-".into(),
            justificativa: format!("Erro: {message}"),
            confianca: 0,
            risco: "N/A".into(),
            loading: false,
            error: Some(message),
        }
    }

    /// Same suggestion with the loading flag raised and any error cleared.
    pub fn pending(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.estrategia.is_empty() && self.error.is_none() && !self.loading
    }
}
