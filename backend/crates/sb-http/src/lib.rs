//! The `http` server variant.
//!
//! [`HttpInstance`] binds its listener at initialize and serves the attached
//! route table with axum until shut down or aborted. Each connection is
//! served on its own task so an abort can drop them mid-request.

pub mod app;
mod connections;
pub mod error;
pub mod http_instance;
pub mod http_instance_config;
pub mod stop_coordinator;
pub mod stop_guard;

pub use app::build_app;
pub use error::{HttpError, Result};
pub use http_instance::HttpInstance;
pub use http_instance_config::{DEFAULT_MAX_CONCURRENT_REQUESTS, HttpInstanceConfig};
pub use stop_coordinator::{StopCoordinator, StopMode};
pub use stop_guard::StopGuard;

#[cfg(test)]
mod tests;
