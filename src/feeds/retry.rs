use super::FeedError;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Retry counter shared by every fetch of one feed.
///
/// The count lives outside any single call: a fetch aborted during its
/// backoff hands its progress to the next fetch, so a feed that stays down
/// longer than the poll interval still runs out of retries. The count resets
/// on success and on exhaustion.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    max_retries: u32,
    base_delay_ms: u64,
    used: Arc<AtomicU32>,
}

impl RetryBudget {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            used: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Retries spent since the last success or exhaustion.
    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    /// Run `attempt` until it succeeds or the budget is spent, sleeping
    /// `base_delay * retry` between failures.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, FeedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FeedError>>,
    {
        loop {
            match attempt().await {
                Ok(value) => {
                    self.used.store(0, Ordering::SeqCst);
                    return Ok(value);
                }
                Err(e) => {
                    let retry = self.used.fetch_add(1, Ordering::SeqCst) + 1;
                    if retry > self.max_retries {
                        self.used.store(0, Ordering::SeqCst);
                        error!("Feed fetch failed after {} retries: {e}", self.max_retries);
                        return Err(FeedError::RetriesExhausted {
                            attempts: self.max_retries,
                            last: e.to_string(),
                        });
                    }
                    let delay = retry_delay(self.base_delay_ms, retry);
                    warn!(
                        "Feed fetch failed (retry {retry}/{}): {e}, retrying in {}ms",
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Linear backoff: base, 2 x base, 3 x base, ...
pub fn retry_delay(base_ms: u64, retry: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(retry as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn unavailable() -> FeedError {
        FeedError::Status {
            code: 503,
            reason: "Service Unavailable".into(),
        }
    }

    #[test]
    fn test_retry_delay_is_linear() {
        assert_eq!(retry_delay(2000, 1), Duration::from_secs(2));
        assert_eq!(retry_delay(2000, 2), Duration::from_secs(4));
        assert_eq!(retry_delay(2000, 3), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_max_retries() {
        let budget = RetryBudget::new(3, 2000);
        let start = Instant::now();

        let err = budget.run(|| async { Err::<(), _>(unavailable()) }).await.unwrap_err();

        assert_eq!(err.to_string(), "failed after 3 attempts: HTTP 503: Service Unavailable");
        assert!(start.elapsed() >= Duration::from_secs(12));
        assert_eq!(budget.used(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_run_keeps_progress() {
        let budget = RetryBudget::new(3, 2000);

        // Dropped during the second backoff (4s), after two failures.
        let first = tokio::time::timeout(
            Duration::from_millis(2500),
            budget.run(|| async { Err::<(), _>(unavailable()) }),
        )
        .await;
        assert!(first.is_err());
        assert_eq!(budget.used(), 2);

        // One more backoff (6s) and the next failure exhausts the budget.
        let start = Instant::now();
        let err = budget.run(|| async { Err::<(), _>(unavailable()) }).await.unwrap_err();
        assert!(matches!(err, FeedError::RetriesExhausted { attempts: 3, .. }));
        assert!(start.elapsed() >= Duration::from_secs(6));
        assert!(start.elapsed() < Duration::from_secs(12));
        assert_eq!(budget.used(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_count() {
        let budget = RetryBudget::new(3, 10);
        let mut calls = 0;
        let value = budget
            .run(|| {
                calls += 1;
                let n = calls;
                async move {
                    if n < 3 {
                        Err(unavailable())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(budget.used(), 0);
    }
}
