use crate::models::strategy::StrategySuggestion;

const FALLBACK_JUSTIFICATION_CHARS: usize = 200;

/// Turn the provider's free-form reply into a suggestion.
///
/// Expects lines like `Estratégia: ...`; a field runs until the next line
/// that starts with a capital letter or the end of the text. Missing fields
/// fall back to placeholders and never fail the parse.
pub fn parse_response(text: &str) -> StrategySuggestion {
    let estrategia = extract_field(text, "Estratégia").unwrap_or_else(|| "Sem análise".to_string());
    let alternativa = extract_field(text, "Alternativa").unwrap_or_else(|| "-".to_string());
    let justificativa = extract_field(text, "Justificativa")
        .unwrap_or_else(|| text.chars().take(FALLBACK_JUSTIFICATION_CHARS).collect());
    let confianca = extract_field(text, "Nível de confiança")
        .or_else(|| extract_field(text, "Confiança"))
        .map(|raw| parse_confidence(&raw))
        .unwrap_or(0);
    let risco = extract_field(text, "Risco")
        .unwrap_or_else(|| "médio".to_string())
        .to_lowercase();

    StrategySuggestion {
        estrategia,
        alternativa,
        justificativa,
        confianca,
        risco,
        loading: false,
        error: None,
    }
}

/// Keep only ASCII digits and clamp to 0..=100.
pub fn parse_confidence(raw: &str) -> u8 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    // Anything too long for u64 is far above the clamp anyway.
    digits.parse::<u64>().map(|v| v.min(100) as u8).unwrap_or(100)
}

/// Value following the first case-insensitive occurrence of `label` that has
/// a colon after it. Any text between the label and the colon is skipped, so
/// `Nível de confiança (0 a 100): 80` yields `80`.
pub fn extract_field(text: &str, label: &str) -> Option<String> {
    for (start, _) in text.char_indices() {
        let Some(label_len) = match_label(&text[start..], label) else {
            continue;
        };
        let after_label = start + label_len;
        let colon = after_label + text[after_label..].find(':')?;

        let rest = &text[colon + 1..];
        let value_start = rest.len() - rest.trim_start().len();
        let value = &rest[value_start..];
        let end = value_end(value);
        let field = value[..end].trim();

        return (!field.is_empty()).then(|| field.to_string());
    }
    None
}

/// Byte length of `label` at the start of `haystack`, compared without case.
fn match_label(haystack: &str, label: &str) -> Option<usize> {
    let mut chars = haystack.char_indices();
    for expected in label.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.next().map(|(i, _)| i).unwrap_or(haystack.len()))
}

/// End of a field: the first newline followed by an uppercase letter.
fn value_end(value: &str) -> usize {
    value
        .match_indices('\n')
        .find(|(i, _)| {
            value[i + 1..]
                .chars()
                .next()
                .is_some_and(char::is_uppercase)
        })
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}
