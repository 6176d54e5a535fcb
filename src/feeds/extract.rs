//! Normalizes the casino's loosely-shaped payloads into [`RouletteTable`]s.
//!
//! The vendor has shipped several field spellings over time, so every field
//! is read through an ordered list of extraction rules. The first rule whose
//! key is present decides the value; nothing here returns an error.

use crate::models::number::RouletteNumber;
use crate::models::table::RouletteTable;
use serde_json::Value;

/// When a candidate key counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Present and not null/false/0/"".
    Truthy,
    /// Key exists, whatever its value.
    Defined,
}

/// A (candidate key path, coercion) pair.
pub struct Rule<T> {
    pub path: &'static [&'static str],
    pub presence: Presence,
    pub coerce: fn(&Value) -> Option<T>,
}

impl<T> Rule<T> {
    pub const fn truthy(path: &'static [&'static str], coerce: fn(&Value) -> Option<T>) -> Self {
        Self {
            path,
            presence: Presence::Truthy,
            coerce,
        }
    }

    pub const fn defined(path: &'static [&'static str], coerce: fn(&Value) -> Option<T>) -> Self {
        Self {
            path,
            presence: Presence::Defined,
            coerce,
        }
    }

    fn lookup<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let found = self
            .path
            .iter()
            .try_fold(value, |v, key| v.as_object()?.get(*key))?;
        match self.presence {
            Presence::Defined => Some(found),
            Presence::Truthy => is_truthy(found).then_some(found),
        }
    }
}

/// Apply `rules` in priority order. The first present key wins, even if its
/// coercion then yields nothing.
pub fn probe<T>(value: &Value, rules: &[Rule<T>]) -> Option<T> {
    rules
        .iter()
        .find_map(|rule| rule.lookup(value).map(|v| (rule.coerce)(v)))
        .flatten()
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// --- coercions ---

pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn as_lower_text(value: &Value) -> Option<String> {
    as_text(value).map(|s| s.to_lowercase())
}

/// Arrays as-is, objects by their values.
pub fn as_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) => Some(map.values().cloned().collect()),
        _ => None,
    }
}

/// Leading base-10 integer of a string: optional whitespace and sign, then
/// digits. `"12.7"` is 12, `"x3"` is nothing.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}

fn text_as_int(value: &Value) -> Option<i64> {
    as_text(value).and_then(|s| parse_int_prefix(&s))
}

const RESULT_OBJECT_RULES: &[Rule<i64>] = &[
    Rule::defined(&["result"], text_as_int),
    Rule::defined(&["number"], text_as_int),
    Rule::defined(&["value"], text_as_int),
];

/// One element of a results array. Non-integral numbers are rejected.
pub fn as_spin(value: &Value) -> Option<RouletteNumber> {
    let raw = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
                .map(|f| f as i64),
        },
        Value::String(s) => parse_int_prefix(s),
        Value::Object(_) => probe(value, RESULT_OBJECT_RULES),
        _ => None,
    };
    raw.and_then(RouletteNumber::from_i64)
}

pub fn as_spins(value: &Value) -> Option<Vec<RouletteNumber>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(as_spin).collect())
}

// --- field rules, highest priority first ---

pub const TABLE_LIST_RULES: &[Rule<Vec<Value>>] = &[
    Rule::truthy(&["tables"], as_list),
    Rule::truthy(&["Games"], as_list),
    Rule::truthy(&["games"], as_list),
    Rule::truthy(&["data", "tables"], as_list),
    Rule::truthy(&["data", "Games"], as_list),
    Rule::truthy(&["liveGames"], as_list),
    Rule::truthy(&["LiveGames"], as_list),
];

pub const GAME_TYPE_RULES: &[Rule<String>] = &[
    Rule::truthy(&["gameType"], as_lower_text),
    Rule::truthy(&["GameType"], as_lower_text),
    Rule::truthy(&["type"], as_lower_text),
    Rule::truthy(&["category"], as_lower_text),
];

pub const NAME_RULES: &[Rule<String>] = &[
    Rule::truthy(&["tableName"], as_text),
    Rule::truthy(&["TableName"], as_text),
    Rule::truthy(&["name"], as_text),
    Rule::truthy(&["Name"], as_text),
    Rule::truthy(&["title"], as_text),
];

pub const RESULTS_RULES: &[Rule<Vec<RouletteNumber>>] = &[
    Rule::truthy(&["results"], as_spins),
    Rule::truthy(&["Results"], as_spins),
    Rule::truthy(&["history"], as_spins),
    Rule::truthy(&["lastResults"], as_spins),
    Rule::truthy(&["recentResults"], as_spins),
];

pub const TABLE_ID_RULES: &[Rule<String>] = &[
    Rule::truthy(&["tableId"], as_text),
    Rule::truthy(&["TableId"], as_text),
    Rule::truthy(&["id"], as_text),
    Rule::truthy(&["Id"], as_text),
    Rule::truthy(&["gameId"], as_text),
];

pub const VENDOR_RULES: &[Rule<String>] = &[
    Rule::truthy(&["vendorName"], as_text),
    Rule::truthy(&["VendorName"], as_text),
    Rule::truthy(&["vendor"], as_text),
    Rule::truthy(&["provider"], as_text),
    Rule::truthy(&["Provider"], as_text),
];

pub const DEFAULT_TABLE_NAME: &str = "Mesa sem nome";
pub const DEFAULT_VENDOR: &str = "Desconhecido";
pub const DEFAULT_GAME_TYPE: &str = "roulette";

fn looks_like_roulette(text: &str) -> bool {
    let text = text.to_lowercase();
    text.contains("roulette") || text.contains("roleta")
}

/// Normalize one game entry. Games with a non-roulette type are dropped;
/// untyped games are kept.
pub fn extract_table(game: &Value) -> Option<RouletteTable> {
    if !is_truthy(game) {
        return None;
    }

    let game_type = probe(game, GAME_TYPE_RULES).unwrap_or_default();
    let name = probe(game, NAME_RULES).unwrap_or_default();

    let is_roulette = looks_like_roulette(&game_type) || looks_like_roulette(&name);
    if !is_roulette && !game_type.is_empty() {
        return None;
    }

    Some(RouletteTable {
        table_id: probe(game, TABLE_ID_RULES).unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        table_name: if name.is_empty() { DEFAULT_TABLE_NAME.to_string() } else { name },
        vendor_name: probe(game, VENDOR_RULES).unwrap_or_else(|| DEFAULT_VENDOR.to_string()),
        results: probe(game, RESULTS_RULES).unwrap_or_default(),
        game_type: Some(if game_type.is_empty() { DEFAULT_GAME_TYPE.to_string() } else { game_type }),
    })
}

/// Normalize a whole feed payload.
pub fn extract_tables(payload: &Value) -> Vec<RouletteTable> {
    probe(payload, TABLE_LIST_RULES)
        .unwrap_or_default()
        .iter()
        .filter_map(extract_table)
        .collect()
}
