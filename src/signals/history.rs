use crate::models::number::RouletteNumber;

/// Most recent spins kept per table.
pub const MAX_HISTORY: usize = 100;

/// Merges the vendor's sliding results window into the accumulated history.
///
/// The vendor only ever exposes its last N spins and the window may shift by
/// any amount between polls, so new spins are located by anchoring on the
/// last spin we already know.
pub struct HistoryReconciler;

impl HistoryReconciler {
    /// Anchor-and-append merge, bounded to [`MAX_HISTORY`].
    ///
    /// - empty history: the whole window becomes the baseline
    /// - anchor found (rightmost match): everything after it is appended
    /// - anchor missing: assume one spin advanced and append only the newest
    ///
    /// The missing-anchor fallback cannot tell "several spins with no
    /// overlap" from "the anchor value legitimately recurred"; both append a
    /// single spin.
    pub fn reconcile(previous: &[RouletteNumber], window: &[RouletteNumber]) -> Vec<RouletteNumber> {
        Self::reconcile_bounded(previous, window, MAX_HISTORY)
    }

    pub fn reconcile_bounded(
        previous: &[RouletteNumber],
        window: &[RouletteNumber],
        max_len: usize,
    ) -> Vec<RouletteNumber> {
        let mut merged = previous.to_vec();
        merged.extend_from_slice(Self::new_spins(previous, window));

        if merged.len() > max_len {
            merged.drain(..merged.len() - max_len);
        }
        merged
    }

    /// The slice of `window` that has not been seen yet.
    pub fn new_spins<'a>(previous: &[RouletteNumber], window: &'a [RouletteNumber]) -> &'a [RouletteNumber] {
        let Some(anchor) = previous.last() else {
            return window;
        };
        if window.is_empty() {
            return window;
        }
        match window.iter().rposition(|n| n == anchor) {
            Some(i) => &window[i + 1..],
            None => &window[window.len() - 1..],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::number::numbers;

    fn reconcile(prev: &[i64], window: &[i64]) -> Vec<RouletteNumber> {
        HistoryReconciler::reconcile(&numbers(prev), &numbers(window))
    }

    #[test]
    fn test_first_window_is_baseline() {
        assert_eq!(reconcile(&[], &[5, 12, 0]), numbers(&[5, 12, 0]));
    }

    #[test]
    fn test_anchor_found_appends_tail() {
        assert_eq!(reconcile(&[5, 12, 0], &[12, 0, 7]), numbers(&[5, 12, 0, 7]));
    }

    #[test]
    fn test_anchor_missing_appends_newest_only() {
        assert_eq!(reconcile(&[5, 12, 0], &[33, 8]), numbers(&[5, 12, 0, 8]));
    }

    #[test]
    fn test_anchor_rightmost_match_wins() {
        // 7 appears twice; only what follows the last 7 is new.
        assert_eq!(
            reconcile(&[1, 7], &[7, 3, 7, 9]),
            numbers(&[1, 7, 9])
        );
    }

    #[test]
    fn test_anchor_at_end_adds_nothing() {
        assert_eq!(reconcile(&[4, 19], &[2, 4, 19]), numbers(&[4, 19]));
    }

    #[test]
    fn test_empty_window_leaves_history() {
        assert_eq!(reconcile(&[4, 19], &[]), numbers(&[4, 19]));
        assert!(reconcile(&[], &[]).is_empty());
    }

    #[test]
    fn test_pure_for_identical_inputs() {
        let prev = numbers(&[3, 26, 0, 32]);
        let window = numbers(&[0, 32, 15, 19]);
        assert_eq!(
            HistoryReconciler::reconcile(&prev, &window),
            HistoryReconciler::reconcile(&prev, &window)
        );
    }

    #[test]
    fn test_bounded_to_max_history() {
        let big: Vec<i64> = (0..150).map(|i| i % 37).collect();
        let first = reconcile(&[], &big);
        assert_eq!(first.len(), MAX_HISTORY);
        // Oldest entries dropped, newest kept.
        assert_eq!(first.last(), numbers(&[149 % 37]).last());

        let mut history = first;
        for i in 0..250i64 {
            let window = numbers(&[(i * 7) % 37, (i * 11) % 37]);
            history = HistoryReconciler::reconcile(&history, &window);
            assert!(history.len() <= MAX_HISTORY);
        }
    }

    #[test]
    fn test_bounded_custom_limit() {
        let merged = HistoryReconciler::reconcile_bounded(&numbers(&[1, 2, 3]), &numbers(&[3, 4, 5]), 4);
        assert_eq!(merged, numbers(&[2, 3, 4, 5]));
    }
}
