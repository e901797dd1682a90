use anyhow::{Result, anyhow};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Longest single wait between attempts
const MAX_DELAY_MS: u64 = 30_000;

/// Exponential backoff retry handler with jitter, used for idempotent
/// network reads (balances, prices). Transfers are never retried.
#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetry {
    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum number of retry attempts after the first try
    max_retries: u32,

    /// Current attempt number (for calculating delay)
    current_attempt: u32,
}

impl ExponentialBackoffRetry {
    pub fn new(base_delay_ms: u64, max_retries: u32) -> Self {
        Self {
            base_delay_ms,
            max_retries,
            current_attempt: 0,
        }
    }

    /// Run `operation` until it succeeds or retries are exhausted
    pub async fn execute<F, Fut, T>(&mut self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            self.current_attempt = attempt;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt < self.max_retries {
                        let delay_ms = self.calculate_delay(attempt);
                        warn!(
                            "{} failed (attempt {}/{}): {} - retrying in {}ms",
                            label,
                            attempt + 1,
                            self.max_retries + 1,
                            e,
                            delay_ms
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(anyhow!(
            "{} failed after {} attempt(s): {}",
            label,
            self.max_retries + 1,
            last_error.unwrap_or_else(|| anyhow!("unknown error"))
        ))
    }

    /// Exponential delay for `attempt` with ±10% jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let exponential_delay = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        let jitter_range = exponential_delay / 10;

        let jitter = rand::thread_rng().gen_range(0..=jitter_range * 2) as i64 - jitter_range as i64;
        let final_delay = (exponential_delay as i64 + jitter).max(0) as u64;

        final_delay.min(MAX_DELAY_MS)
    }

    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }
}
