//! Retries with exponential backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts after the first.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}
impl RetryConfig {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

/// Runs `operation` until it succeeds, fails with an error that `is_retryable` rejects, or the
/// retries are spent. The last error is returned.
pub async fn retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    is_retryable: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{operation_name} succeeded after {attempt} retries");
                }
                return Ok(result);
            }
            Err(err) if attempt < config.max_retries && is_retryable(&err) => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    "{operation_name} failed (attempt {}/{}): {err}; retrying in {delay:?}",
                    attempt + 1,
                    config.max_retries + 1
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
