pub mod error;
pub mod health;
pub mod logger;

#[cfg(test)]
mod tests;

use crate::error::Result as ServerErrorResult;

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use sb_core::{GrpcConnector, InstanceFactory, Orchestrator, Registry, RegistryBuilder, RetryPolicy};
use sb_http::HttpInstance;

/// Every server variant this binary can run
pub fn instance_factory() -> InstanceFactory {
    let mut factory = InstanceFactory::new();
    HttpInstance::register(&mut factory);
    factory
}

/// Registry builder dialling collectors per the collector settings
pub fn registry_builder(config: &sb_config::Config) -> RegistryBuilder {
    let connect_timeout = Duration::from_secs(config.collector.connect_timeout_secs);

    RegistryBuilder::new(instance_factory())
        .with_connector(Arc::new(GrpcConnector::new(connect_timeout)))
        .with_retry(RetryPolicy::from(&config.collector.retry))
}

/// Attach the built-in health routes to every server
pub async fn attach_health_routes(
    orchestrator: &Orchestrator,
    registry: &Registry,
) -> ServerErrorResult<()> {
    for server in registry {
        let router = health::health_router(server.name(), server.uuid())?;
        orchestrator
            .attach_router(registry, server.name(), router)
            .await?;
    }
    Ok(())
}

/// Shut everything down, falling back to abort when `timeout` expires.
///
/// `None` waits for the graceful shutdown however long it takes.
pub async fn shutdown(orchestrator: &Orchestrator, registry: &Registry, timeout: Option<Duration>) {
    let graceful = orchestrator.shutdown_all(registry);

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, graceful).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Graceful shutdown exceeded {limit:?}, aborting remaining servers");
                if let Err(e) = orchestrator.abort_all(registry).await {
                    error!("Abort after timeout: {e}");
                }
                return;
            }
        },
        None => graceful.await,
    };

    match outcome {
        Ok(()) => info!("All servers shut down"),
        Err(e) => error!("Shutdown finished with errors: {e}"),
    }
}
