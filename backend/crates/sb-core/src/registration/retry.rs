use crate::{CollectorKind, Result as CoreResult};

use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::sleep;

const DEFAULT_MAX_ATTEMPTS: u32 = 1;
const DEFAULT_INITIAL_DELAY_MS: u64 = 100;
const DEFAULT_MAX_DELAY_SECS: u64 = 5;
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Dial retry policy for registration clients
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 means no retry
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap on the delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Scale each delay by a random factor in [0.5, 1.5)
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: false,
        }
    }
}

impl From<&sb_config::RetryConfig> for RetryPolicy {
    fn from(config: &sb_config::RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_secs(config.max_delay_secs),
            backoff_multiplier: config.backoff_multiplier,
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), capped at `max_delay`.
    ///
    /// Jitter is not applied here.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        if secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter {
            delay.mul_f64(0.5 + rand::random::<f64>())
        } else {
            delay
        }
    }
}

/// Dial the `kind` collector at `address` until it answers or `policy` gives up.
///
/// Only connection failures are retried; anything else is returned at once.
pub(crate) async fn dial_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    kind: CollectorKind,
    address: &str,
    mut dial: F,
) -> CoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut retry = 0;

    loop {
        match dial().await {
            Ok(connected) => {
                if retry > 0 {
                    info!("{kind} collector at {address} answered on attempt {}", retry + 1);
                }
                return Ok(connected);
            }
            Err(e) if e.is_retryable() && retry + 1 < attempts => {
                retry += 1;
                let delay = policy.jittered(policy.backoff(retry));
                debug!(
                    "{kind} collector at {address} unreachable: {e}. Retry {retry}/{} in {delay:?}",
                    attempts - 1
                );
                sleep(delay).await;
            }
            Err(e) => {
                warn!(
                    "Giving up on {kind} collector at {address} after {} attempt(s): {e}",
                    retry + 1
                );
                return Err(e);
            }
        }
    }
}
