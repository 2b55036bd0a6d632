use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Variant-specific configuration blob.
///
/// The orchestration core never looks inside; it hands the blob to the
/// instance, which decodes it into its own settings type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct InstanceConfig(toml::Table);

impl InstanceConfig {
    pub fn new(table: toml::Table) -> Self {
        Self(table)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    /// Decode the blob into a variant settings type
    #[track_caller]
    pub fn decode<T: DeserializeOwned>(&self) -> ConfigErrorResult<T> {
        toml::Value::Table(self.0.clone())
            .try_into()
            .map_err(ConfigError::from_serde_error)
    }
}

impl From<toml::Table> for InstanceConfig {
    fn from(table: toml::Table) -> Self {
        Self(table)
    }
}
