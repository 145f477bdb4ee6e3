//! Bar source trait and retry/timeout wrapper.

use async_trait::async_trait;
use pipeline_core::{Bar, DataError, TimeWindow};
use std::time::Duration;
use tracing::warn;

/// Trait for historical bar providers.
///
/// The actual provider (network API, local files) is opaque to the
/// pipeline; stages only see this contract.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch bars for one symbol inside the half-open window, ordered
    /// oldest to newest.
    async fn fetch_bars(&self, symbol: &str, window: &TimeWindow) -> Result<Vec<Bar>, DataError>;

    /// Get the source name.
    fn name(&self) -> &str;
}

/// Fetch timeout and retry budget applied to every provider call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_attempts: 3,
        }
    }
}

/// Wrapper adding a timeout and a bounded retry budget to any source.
///
/// Exhausting the budget converts to a per-symbol failure; no fetch
/// blocks indefinitely.
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<S: BarSource> BarSource for RetryingSource<S> {
    async fn fetch_bars(&self, symbol: &str, window: &TimeWindow) -> Result<Vec<Bar>, DataError> {
        let timeout = Duration::from_secs(self.policy.timeout_secs);

        for attempt in 1..=self.policy.max_attempts {
            match tokio::time::timeout(timeout, self.inner.fetch_bars(symbol, window)).await {
                Ok(Ok(bars)) => return Ok(bars),
                // Unknown symbols never become known; don't burn retries.
                Ok(Err(err @ DataError::SymbolNotFound(_))) => return Err(err),
                Ok(Err(err)) => {
                    warn!(symbol, attempt, error = %err, "fetch attempt failed");
                }
                Err(_) => {
                    warn!(
                        symbol,
                        attempt,
                        timeout_secs = self.policy.timeout_secs,
                        "fetch attempt timed out"
                    );
                }
            }
        }

        Err(DataError::RetriesExhausted {
            symbol: symbol.to_string(),
            attempts: self.policy.max_attempts,
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
