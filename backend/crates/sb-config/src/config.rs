use crate::{
    CollectorConfig, ConfigError, ConfigErrorResult, LoggingConfig, ServerConfig, ShutdownConfig,
};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

const CONFIG_DIR_ENV: &str = "SB_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".serverbox";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub collector: CollectorConfig,
    pub shutdown: ShutdownConfig,
    /// Managed servers keyed by unique name; iterated in name order
    pub servers: BTreeMap<String, ServerConfig>,
}

impl Config {
    /// Load config from the config directory.
    ///
    /// Loading order:
    /// 1. Check for SB_CONFIG_DIR env var, else use ./.serverbox/
    /// 2. Load config.toml if it exists, else use defaults
    /// 3. Apply SB_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_path = Self::config_dir()?.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load a specific file with no environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigErrorResult<Self> {
        Self::load_toml(path.as_ref())
    }

    /// Parse TOML text directly.
    pub fn from_toml_str(contents: &str) -> ConfigErrorResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source: e,
        })
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: SB_CONFIG_DIR env var > ./.serverbox/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Server type tags are left to the orchestration core.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.collector.validate()?;
        self.shutdown.validate()?;

        for (name, server) in &self.servers {
            server.validate(name)?;
        }

        Ok(())
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("stdout")
        );
        info!(
            "  collector: connect_timeout={}s, retry attempts={}, initial={}ms, max={}s",
            self.collector.connect_timeout_secs,
            self.collector.retry.max_attempts,
            self.collector.retry.initial_delay_ms,
            self.collector.retry.max_delay_secs
        );
        info!("  shutdown: timeout={}s", self.shutdown.timeout_secs);
        info!("  servers: {}", self.servers.len());

        for (name, server) in &self.servers {
            info!(
                "    {name}: type={}, bind={}:{}, statistics={}, state={}",
                server.server_type,
                server.bind_ip,
                server.bind_port,
                Self::endpoint_summary(server.statistics.enabled, &server.statistics.address()),
                Self::endpoint_summary(server.state.enabled, &server.state.address()),
            );
        }
    }

    fn endpoint_summary(enabled: bool, address: &str) -> String {
        if enabled {
            address.to_string()
        } else {
            String::from("disabled")
        }
    }

    fn apply_env_overrides(&mut self) {
        // Logging
        Self::apply_env_parse("SB_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("SB_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("SB_LOG_FILE", &mut self.logging.file);

        // Collector
        Self::apply_env_parse(
            "SB_COLLECTOR_CONNECT_TIMEOUT_SECS",
            &mut self.collector.connect_timeout_secs,
        );
        Self::apply_env_parse(
            "SB_COLLECTOR_RETRY_MAX_ATTEMPTS",
            &mut self.collector.retry.max_attempts,
        );
        Self::apply_env_parse(
            "SB_COLLECTOR_RETRY_INITIAL_DELAY_MS",
            &mut self.collector.retry.initial_delay_ms,
        );

        // Shutdown
        Self::apply_env_parse("SB_SHUTDOWN_TIMEOUT_SECS", &mut self.shutdown.timeout_secs);
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
