use crate::{InstanceState, Result as CoreResult, Router};

use async_trait::async_trait;
use sb_config::InstanceConfig;

/// Identity handed to an instance constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceContext {
    pub name: String,
    pub uuid: String,
    pub bind_ip: String,
    pub bind_port: u16,
}

impl InstanceContext {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_ip, self.bind_port)
    }
}

/// One server technology's implementation of the lifecycle.
///
/// Operations take `&self` because `run` occupies its own task while
/// `shutdown`/`abort` arrive from another; implementations keep their
/// state behind interior mutability.
#[async_trait]
pub trait Instance: Send + Sync {
    /// Allocate what is needed to serve; must not start serving.
    async fn initialize(&self, config: &InstanceConfig) -> CoreResult<()>;

    /// Serve until shut down, aborted or faulted.
    ///
    /// Returns an error only for an immediate startup fault; otherwise
    /// returns once the instance has fully stopped.
    async fn run(&self) -> CoreResult<()>;

    /// Stop accepting work and drain where the variant supports it.
    async fn shutdown(&self) -> CoreResult<()>;

    /// Tear down immediately without draining.
    async fn abort(&self) -> CoreResult<()>;

    /// Hand the instance its route table. Valid once initialized.
    async fn attach_router(&self, router: Router) -> CoreResult<()>;

    fn state(&self) -> InstanceState;
}
