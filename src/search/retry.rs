//! Fixed-delay retry decorator for search providers.
//!
//! [`Retry`] wraps any [`SearchProvider`] and re-issues the request when it
//! fails, with a constant pause between attempts. Every error class is
//! retried. An `Ok` answer, even an empty one, is returned immediately.
//!
//! Worst case is `(max_attempts - 1) × delay` plus the requests themselves.

use super::SearchProvider;
use crate::error::SearchProviderError;
use crate::models::{CandidateLink, SearchQuery};
use async_trait::async_trait;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Wrapper that retries the inner provider up to `max_attempts` times.
pub struct Retry<P> {
    inner: P,
    max_attempts: usize,
    delay: Duration,
}

impl<P> Retry<P>
where
    P: SearchProvider,
{
    /// # Example
    ///
    /// ```ignore
    /// let primary = Retry::new(DuckDuckGo::new(&config)?, 3, Duration::from_secs(5));
    /// ```
    pub fn new(inner: P, max_attempts: usize, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl<P> fmt::Debug for Retry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish()
    }
}

#[async_trait]
impl<P> SearchProvider for Retry<P>
where
    P: SearchProvider,
{
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[instrument(level = "info", skip_all, fields(provider = self.inner.name()))]
    async fn try_discover(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<CandidateLink>, SearchProviderError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.try_discover(query).await {
                Ok(links) => return Ok(links),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis();
                    let elapsed_ms_total = total_t0.elapsed().as_millis();

                    if attempt >= self.max_attempts {
                        error!(
                            attempt,
                            max = self.max_attempts,
                            elapsed_ms_attempt,
                            elapsed_ms_total,
                            error = %e,
                            "search exhausted retries"
                        );
                        return Err(e);
                    }

                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_attempt,
                        elapsed_ms_total,
                        delay = ?self.delay,
                        error = %e,
                        "search attempt failed; waiting before retry"
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecencyWindow;
    use crate::search::testing::{StubProvider, link};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn query() -> SearchQuery {
        SearchQuery::new("Traffic", 3, RecencyWindow::Day).unwrap()
    }

    /// Fails a fixed number of times, then succeeds.
    struct Flaky {
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchProvider for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn try_discover(
            &self,
            _query: &SearchQuery,
        ) -> Result<Vec<CandidateLink>, SearchProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(SearchProviderError::Blocked("challenge page".into()))
            } else {
                Ok(vec![link("https://example.ph/a", "A")])
            }
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Retry::new(
            Flaky { failures: 2, calls: Arc::clone(&calls) },
            3,
            Duration::ZERO,
        );
        let links = provider.try_discover(&query()).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (stub, calls) = StubProvider::failing("primary", "boom");
        let provider = Retry::new(stub, 3, Duration::ZERO);
        let err = provider.try_discover(&query()).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_retried() {
        let (stub, calls) = StubProvider::returning("primary", vec![]);
        let provider = Retry::new(stub, 3, Duration::ZERO);
        assert!(provider.try_discover(&query()).await.unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.name(), "primary");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_fixed_delay_between_attempts() {
        let (stub, _) = StubProvider::failing("primary", "boom");
        let provider = Retry::new(stub, 3, Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        let _ = provider.try_discover(&query()).await;
        assert!(started.elapsed() >= Duration::from_secs(10));
    }
}
