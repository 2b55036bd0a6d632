mod collector_config;
mod config;
mod error;
mod instance_config;
mod log_level;
mod logging_config;
mod retry_config;
mod server_config;
mod shutdown_config;

#[cfg(test)]
mod tests;

pub use collector_config::{CollectorConfig, CollectorEndpoint};
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use instance_config::InstanceConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use retry_config::RetryConfig;
pub use server_config::ServerConfig;
pub use shutdown_config::ShutdownConfig;

const DEFAULT_BIND_IP: &str = "127.0.0.1";
const DEFAULT_COLLECTOR_HOST: &str = "127.0.0.1";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;

// Collector dial constraints
const MIN_CONNECT_TIMEOUT_SECS: u64 = 1;
const MAX_CONNECT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

// Shutdown constraints (0 = wait forever)
const MAX_SHUTDOWN_TIMEOUT_SECS: u64 = 3600;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
