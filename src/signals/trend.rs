use crate::models::number::{Color, Parity, RouletteNumber};
use crate::models::stats::Trend;
use std::collections::BTreeMap;

/// Spins inspected for streaks.
pub const STREAK_WINDOW: usize = 5;
/// Hits within the window needed to flag a streak.
pub const STREAK_MIN_HITS: usize = 4;
/// A number is "hot" only above this many hits.
pub const HOT_NUMBER_MIN_COUNT: u32 = 2;

/// Streak and hot-number heuristics over a reconciled history.
pub struct TrendDetector;

impl TrendDetector {
    /// Streak checks run on the last [`STREAK_WINDOW`] spins (or fewer) and
    /// are independent of each other. The hot-number check scans the whole
    /// frequency map.
    pub fn detect(history: &[RouletteNumber], frequency: &BTreeMap<RouletteNumber, u32>) -> Vec<Trend> {
        let tail = &history[history.len().saturating_sub(STREAK_WINDOW)..];
        let mut trends = Vec::new();

        let count = |pred: &dyn Fn(RouletteNumber) -> bool| tail.iter().filter(|&&n| pred(n)).count();

        if count(&|n| n.color() == Color::Red) >= STREAK_MIN_HITS {
            trends.push(Trend::RedStreak);
        }
        if count(&|n| n.color() == Color::Black) >= STREAK_MIN_HITS {
            trends.push(Trend::BlackStreak);
        }
        if count(&|n| n.parity() == Some(Parity::Even)) >= STREAK_MIN_HITS {
            trends.push(Trend::EvenStreak);
        }
        if count(&|n| n.parity() == Some(Parity::Odd)) >= STREAK_MIN_HITS {
            trends.push(Trend::OddStreak);
        }

        if let Some((number, count)) = Self::hottest(frequency) {
            if count > HOT_NUMBER_MIN_COUNT {
                trends.push(Trend::HotNumber { number, count });
            }
        }

        trends
    }

    /// Highest count in the map. Ties go to the lowest number.
    pub fn hottest(frequency: &BTreeMap<RouletteNumber, u32>) -> Option<(RouletteNumber, u32)> {
        frequency
            .iter()
            .fold(None, |best: Option<(RouletteNumber, u32)>, (&n, &c)| match best {
                Some((_, best_count)) if best_count >= c => best,
                _ => Some((n, c)),
            })
    }
}
