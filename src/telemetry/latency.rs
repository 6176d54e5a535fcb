use std::collections::VecDeque;
use std::time::Duration;
use tracing::info;

pub const FEED_FETCH: &str = "feed.fetch";
pub const ANALYSIS_COMPLETE: &str = "analysis.complete";

/// Rolling latency samples per upstream call.
///
/// Only completed calls are recorded; aborted requests never report.
pub struct LatencyTracker {
    samples: dashmap::DashMap<&'static str, VecDeque<Duration>>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: dashmap::DashMap::new(),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&self, operation: &'static str, duration: Duration) {
        let mut window = self
            .samples
            .entry(operation)
            .or_insert_with(|| VecDeque::with_capacity(self.max_samples));
        if window.len() >= self.max_samples {
            window.pop_front();
        }
        window.push_back(duration);
    }

    pub fn sample_count(&self, operation: &str) -> usize {
        self.samples.get(operation).map(|w| w.len()).unwrap_or(0)
    }

    /// p50, p95, p99 for an operation.
    pub fn percentiles(&self, operation: &str) -> Option<(Duration, Duration, Duration)> {
        let window = self.samples.get(operation)?;
        if window.is_empty() {
            return None;
        }

        let mut sorted: Vec<Duration> = window.iter().copied().collect();
        sorted.sort();

        let last = sorted.len() - 1;
        let at = |q: f64| sorted[((sorted.len() as f64 * q) as usize).min(last)];
        Some((at(0.50), at(0.95), at(0.99)))
    }

    pub fn log_summary(&self) {
        for entry in self.samples.iter() {
            if let Some((p50, p95, p99)) = self.percentiles(entry.key()) {
                info!(
                    "Latency [{}]: p50={:.0}ms p95={:.0}ms p99={:.0}ms samples={}",
                    entry.key(),
                    p50.as_secs_f64() * 1000.0,
                    p95.as_secs_f64() * 1000.0,
                    p99.as_secs_f64() * 1000.0,
                    entry.value().len(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_bounded() {
        let tracker = LatencyTracker::new(3);
        for ms in [10, 20, 30, 40] {
            tracker.record(FEED_FETCH, Duration::from_millis(ms));
        }
        assert_eq!(tracker.sample_count(FEED_FETCH), 3);
        let (p50, _, p99) = tracker.percentiles(FEED_FETCH).unwrap();
        assert_eq!(p50, Duration::from_millis(30));
        assert_eq!(p99, Duration::from_millis(40));
    }

    #[test]
    fn test_unknown_operation() {
        let tracker = LatencyTracker::new(10);
        assert!(tracker.percentiles(ANALYSIS_COMPLETE).is_none());
        assert_eq!(tracker.sample_count(ANALYSIS_COMPLETE), 0);
    }
}
