use serde::Deserialize;

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 1024;

/// Settings decoded from a server's `instance_config` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpInstanceConfig {
    /// Requests served at once; further requests wait
    pub max_concurrent_requests: usize,
    /// Allow any origin, method and header
    pub permissive_cors: bool,
}

impl Default for HttpInstanceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            permissive_cors: false,
        }
    }
}
