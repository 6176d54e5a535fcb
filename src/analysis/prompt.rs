use crate::models::number::RouletteNumber;
use crate::models::stats::StatsSummary;

/// Spins quoted separately at the top of the prompt.
pub const RECENT_SPINS: usize = 10;

pub const SYSTEM_PROMPT: &str =
    "Você é um analista estatístico de roleta. Responda de forma técnica e objetiva.";

fn join(values: impl IntoIterator<Item = String>) -> String {
    values.into_iter().collect::<Vec<_>>().join(", ")
}

fn join_or_none(values: Vec<String>) -> String {
    if values.is_empty() {
        "Nenhuma".to_string()
    } else {
        values.join(", ")
    }
}

/// Six-line stats block embedded in the prompt.
pub fn format_stats(stats: &StatsSummary) -> String {
    let trends = join_or_none(stats.trends.iter().map(|t| t.to_string()).collect());
    let repeats = join_or_none(stats.repeats.iter().map(|n| n.to_string()).collect());

    format!(
        "Par: {} | Ímpar: {}\n\
         Vermelho: {} | Preto: {} | Zero: {}\n\
         Dúzia 1: {} | Dúzia 2: {} | Dúzia 3: {}\n\
         Linha 1: {} | Linha 2: {} | Linha 3: {}\n\
         Tendências: {}\n\
         Repetições: {}",
        stats.even,
        stats.odd,
        stats.red,
        stats.black,
        stats.zeros,
        stats.dozens[0],
        stats.dozens[1],
        stats.dozens[2],
        stats.columns[0],
        stats.columns[1],
        stats.columns[2],
        trends,
        repeats,
    )
}

/// Full user prompt for the analysis provider.
pub fn build_prompt(
    table_name: &str,
    vendor_name: &str,
    history: &[RouletteNumber],
    stats: &StatsSummary,
) -> String {
    let recent = &history[history.len().saturating_sub(RECENT_SPINS)..];
    let recent = join(recent.iter().map(|n| n.to_string()));
    let full = join(history.iter().map(|n| n.to_string()));

    format!(
        "Você é um analista profissional de roleta.\n\
         \n\
         Mesa: {table_name}\n\
         Provedor: {vendor_name}\n\
         \n\
         Últimos 10 números:\n\
         {recent}\n\
         \n\
         Histórico completo ({len} números):\n\
         {full}\n\
         \n\
         Estatísticas:\n\
         {stats}\n\
         \n\
         Analise padrões, frequência, tendência e ciclos.\n\
         Sugira:\n\
         - Par ou Ímpar\n\
         - Linha\n\
         - Direto (10 números)\n\
         - Dúzia\n\
         \n\
         Retorne EXATAMENTE neste formato:\n\
         Estratégia: [sua sugestão principal]\n\
         Alternativa: [sugestão secundária]\n\
         Justificativa: [explicação técnica]\n\
         Nível de confiança (0 a 100): [número]\n\
         Risco: [baixo/médio/alto]\n\
         \n\
         Seja objetivo, técnico e conservador.",
        len = history.len(),
        stats = format_stats(stats),
    )
}
