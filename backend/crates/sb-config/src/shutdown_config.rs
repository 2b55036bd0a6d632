use crate::{ConfigError, ConfigErrorResult, DEFAULT_SHUTDOWN_TIMEOUT_SECS, MAX_SHUTDOWN_TIMEOUT_SECS};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Bound on graceful shutdown before falling back to abort (0 = unbounded)
    pub timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl ShutdownConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.timeout_secs > MAX_SHUTDOWN_TIMEOUT_SECS {
            return Err(ConfigError::config(format!(
                "shutdown.timeout_secs must be 0-{}, got {}",
                MAX_SHUTDOWN_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
