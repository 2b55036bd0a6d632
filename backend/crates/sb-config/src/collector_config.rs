use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_COLLECTOR_HOST, DEFAULT_CONNECT_TIMEOUT_SECS,
    MAX_CONNECT_TIMEOUT_SECS, MIN_CONNECT_TIMEOUT_SECS, RetryConfig,
};

use serde::Deserialize;

/// Process-wide settings shared by every statistics/state collector dial
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Upper bound for a single dial attempt
    pub connect_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            retry: RetryConfig::default(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.connect_timeout_secs < MIN_CONNECT_TIMEOUT_SECS
            || self.connect_timeout_secs > MAX_CONNECT_TIMEOUT_SECS
        {
            return Err(ConfigError::collector(format!(
                "collector.connect_timeout_secs must be {}-{}, got {}",
                MIN_CONNECT_TIMEOUT_SECS, MAX_CONNECT_TIMEOUT_SECS, self.connect_timeout_secs
            )));
        }

        self.retry.validate()
    }
}

/// Per-server collector endpoint (`[servers.<name>.statistics]` / `.state`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorEndpoint {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for CollectorEndpoint {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::from(DEFAULT_COLLECTOR_HOST),
            port: 0,
        }
    }
}

impl CollectorEndpoint {
    /// `host:port` as dialed by the registration client
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self, field: &str) -> ConfigErrorResult<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::collector(format!(
                "{field}.host must not be empty when enabled"
            )));
        }

        if self.port == 0 {
            return Err(ConfigError::collector(format!(
                "{field}.port must be set when enabled"
            )));
        }

        Ok(())
    }
}
