use crate::models::number::{Color, Parity, RouletteNumber};
use crate::models::stats::StatsSummary;
use crate::signals::trend::TrendDetector;

/// Derives the full statistical summary from a history. Pure and total.
pub struct StatsEngine;

impl StatsEngine {
    pub fn compute(history: &[RouletteNumber]) -> StatsSummary {
        let mut stats = StatsSummary::default();

        for (idx, &n) in history.iter().enumerate() {
            *stats.frequency.entry(n).or_insert(0) += 1;

            if idx > 0 && history[idx - 1] == n {
                stats.repeats.push(n);
            }

            if n.is_zero() {
                stats.zeros += 1;
                continue;
            }

            match n.parity() {
                Some(Parity::Even) => stats.even += 1,
                Some(Parity::Odd) => stats.odd += 1,
                None => {}
            }
            match n.color() {
                Color::Red => stats.red += 1,
                Color::Black => stats.black += 1,
                Color::Green => {}
            }
            if let Some(d) = n.dozen() {
                stats.dozens[d.index()] += 1;
            }
            if let Some(c) = n.column() {
                stats.columns[c.index()] += 1;
            }
        }

        stats.trends = TrendDetector::detect(history, &stats.frequency);
        stats
    }
}
