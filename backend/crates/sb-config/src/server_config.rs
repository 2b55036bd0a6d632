use crate::{CollectorEndpoint, ConfigError, ConfigErrorResult, DEFAULT_BIND_IP, InstanceConfig};

use serde::Deserialize;

/// One `[servers.<name>]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Instance variant tag, resolved by the core (e.g. "http")
    #[serde(rename = "type")]
    pub server_type: String,
    pub bind_ip: String,
    pub bind_port: u16,
    pub statistics: CollectorEndpoint,
    pub state: CollectorEndpoint,
    #[serde(alias = "configurations")]
    pub instance_config: InstanceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_type: String::new(),
            bind_ip: String::from(DEFAULT_BIND_IP),
            bind_port: 0,
            statistics: CollectorEndpoint::default(),
            state: CollectorEndpoint::default(),
            instance_config: InstanceConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self, name: &str) -> ConfigErrorResult<()> {
        if name.trim().is_empty() {
            return Err(ConfigError::server("server name must not be empty"));
        }

        if self.bind_ip.trim().is_empty() {
            return Err(ConfigError::server(format!(
                "servers.{name}.bind_ip must not be empty"
            )));
        }

        self.statistics
            .validate(&format!("servers.{name}.statistics"))?;
        self.state.validate(&format!("servers.{name}.state"))?;

        Ok(())
    }
}
