use super::number::{Column, Dozen, RouletteNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pattern flagged over the tail of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    RedStreak,
    BlackStreak,
    EvenStreak,
    OddStreak,
    HotNumber { number: RouletteNumber, count: u32 },
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::RedStreak => write!(f, "red streak"),
            Trend::BlackStreak => write!(f, "black streak"),
            Trend::EvenStreak => write!(f, "even streak"),
            Trend::OddStreak => write!(f, "odd streak"),
            Trend::HotNumber { number, count } => write!(f, "hot number: {number} ({count}x)"),
        }
    }
}

/// Snapshot derived from a history. Recomputed whole on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub even: u32,
    pub odd: u32,
    pub red: u32,
    pub black: u32,
    pub zeros: u32,
    /// Indexed by `Dozen::index()`.
    pub dozens: [u32; 3],
    /// Indexed by `Column::index()`.
    pub columns: [u32; 3],
    /// Always holds all 37 pockets.
    pub frequency: BTreeMap<RouletteNumber, u32>,
    pub trends: Vec<Trend>,
    /// Values that landed twice in a row, one entry per occurrence.
    pub repeats: Vec<RouletteNumber>,
}

impl Default for StatsSummary {
    fn default() -> Self {
        Self {
            even: 0,
            odd: 0,
            red: 0,
            black: 0,
            zeros: 0,
            dozens: [0; 3],
            columns: [0; 3],
            frequency: RouletteNumber::all().map(|n| (n, 0)).collect(),
            trends: Vec::new(),
            repeats: Vec::new(),
        }
    }
}

impl StatsSummary {
    pub fn dozen(&self, dozen: Dozen) -> u32 {
        self.dozens[dozen.index()]
    }

    pub fn column(&self, column: Column) -> u32 {
        self.columns[column.index()]
    }

    pub fn count_of(&self, number: RouletteNumber) -> u32 {
        self.frequency.get(&number).copied().unwrap_or(0)
    }

    /// Number of spins the summary was computed from.
    pub fn total(&self) -> u32 {
        self.frequency.values().sum()
    }

    pub fn non_zero(&self) -> u32 {
        self.total() - self.zeros
    }

    /// Most frequent numbers seen at least once, highest count first.
    /// Equal counts keep the lower number first.
    pub fn top_numbers(&self, limit: usize) -> Vec<(RouletteNumber, u32)> {
        let mut seen: Vec<(RouletteNumber, u32)> = self
            .frequency
            .iter()
            .filter(|(_, &c)| c > 0)
            .map(|(&n, &c)| (n, c))
            .collect();
        // BTreeMap iteration is ascending, stable sort keeps that for ties.
        seen.sort_by(|a, b| b.1.cmp(&a.1));
        seen.truncate(limit);
        seen
    }
}
