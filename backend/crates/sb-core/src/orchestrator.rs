use crate::{
    BatchOperation, CoreError, Metrics, Registry, RegistrationType, ReportedState,
    Result as CoreResult, Router, Server, ServerFailure,
};

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};
use tokio::task::JoinSet;
use tracing::Instrument;

/// Drives lifecycle operations across a whole registry
#[derive(Clone, Default)]
pub struct Orchestrator {
    metrics: Metrics,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Metrics) -> Self {
        Self { metrics }
    }

    /// Start every enabled server on its own task and return immediately.
    ///
    /// Run outcomes are logged by the task; the handles stay on each server.
    /// Returns how many servers were started.
    pub fn run_all(&self, registry: &Registry) -> usize {
        let mut started = 0;
        for server in registry.iter().filter(|server| server.is_enabled()) {
            if server.start(&self.metrics) {
                started += 1;
            }
        }
        info!("Started {started} of {} server(s)", registry.len());
        started
    }

    /// Shut down every server concurrently and wait for all of them.
    ///
    /// One server's failure does not stop the others; every failure is
    /// returned in a single `Batch` error.
    pub async fn shutdown_all(&self, registry: &Registry) -> CoreResult<()> {
        let mut tasks = JoinSet::new();
        let mut names = HashMap::new();

        for server in registry.iter() {
            let server = Arc::clone(server);
            let name = server.name().to_string();
            let handle = tasks.spawn(async move { server.shutdown().await });
            names.insert(handle.id(), name);
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, errors)) => {
                    let server = names.remove(&id).unwrap_or_default();
                    self.metrics.teardown("shutdown", errors.is_empty());
                    collect(&mut failures, &server, errors);
                }
                Err(e) => {
                    let server = names.remove(&e.id()).unwrap_or_default();
                    self.metrics.teardown("shutdown", false);
                    failures.push(ServerFailure {
                        server,
                        error: CoreError::instance(format!("shutdown task failed: {e}")),
                    });
                }
            }
        }

        report(BatchOperation::Shutdown, &failures, registry.len());
        CoreError::batch(BatchOperation::Shutdown, failures)
    }

    /// Abort every server one after another.
    pub async fn abort_all(&self, registry: &Registry) -> CoreResult<()> {
        let mut failures = Vec::new();

        for server in registry.iter() {
            let errors = server.abort().await;
            self.metrics.teardown("abort", errors.is_empty());
            collect(&mut failures, server.name(), errors);
        }

        report(BatchOperation::Abort, &failures, registry.len());
        CoreError::batch(BatchOperation::Abort, failures)
    }

    /// Hand `router` to the named server's instance.
    ///
    /// An unknown name is not an error and does nothing.
    pub async fn attach_router(
        &self,
        registry: &Registry,
        name: &str,
        router: Router,
    ) -> CoreResult<()> {
        let Some(server) = registry.get(name) else {
            debug!("attach_router: no server named '{name}', ignoring");
            return Ok(());
        };

        server
            .instance()
            .attach_router(router)
            .instrument(server.span().clone())
            .await
    }

    /// Enroll every enabled server's uuid with its collectors.
    ///
    /// The statistics collector enrolls it as a server, the state collector as
    /// a state source. Servers are enrolled concurrently.
    pub async fn register_all(&self, registry: &Registry) -> CoreResult<()> {
        let enrollments = registry
            .iter()
            .filter(|server| server.is_enabled())
            .map(|server| self.register_server(server));

        let failures: Vec<ServerFailure> = join_all(enrollments).await.into_iter().flatten().collect();

        report(BatchOperation::Register, &failures, registry.len());
        CoreError::batch(BatchOperation::Register, failures)
    }

    /// Report every enabled server's health to its state collector.
    ///
    /// Servers without a state collector are skipped. Each server reports on
    /// its own behalf, so target and reportee are the same uuid.
    pub async fn report_state_all(
        &self,
        registry: &Registry,
        state: ReportedState,
        reason: &str,
    ) -> CoreResult<()> {
        let reports = registry
            .iter()
            .filter(|server| server.is_enabled())
            .filter_map(|server| server.state().map(|client| (server, client)))
            .map(|(server, client)| async move {
                client
                    .report_state(server.uuid(), state, server.uuid(), reason)
                    .instrument(server.span().clone())
                    .await
                    .err()
                    .map(|error| ServerFailure {
                        server: server.name().to_string(),
                        error,
                    })
            });

        let failures: Vec<ServerFailure> = join_all(reports).await.into_iter().flatten().collect();

        report(BatchOperation::ReportState, &failures, registry.len());
        CoreError::batch(BatchOperation::ReportState, failures)
    }

    async fn register_server(&self, server: &Server) -> Vec<ServerFailure> {
        let mut failures = Vec::new();

        let clients = [
            (server.statistics(), RegistrationType::Server),
            (server.state(), RegistrationType::State),
        ];

        for (client, registration) in clients {
            let Some(client) = client else { continue };

            let result = client
                .register(server.uuid(), registration)
                .instrument(server.span().clone())
                .await;

            self.metrics
                .registration(client.kind().as_str(), result.is_ok());

            if let Err(error) = result {
                failures.push(ServerFailure {
                    server: server.name().to_string(),
                    error,
                });
            }
        }

        failures
    }
}

fn collect(failures: &mut Vec<ServerFailure>, server: &str, errors: Vec<CoreError>) {
    failures.extend(errors.into_iter().map(|error| ServerFailure {
        server: server.to_string(),
        error,
    }));
}

fn report(operation: BatchOperation, failures: &[ServerFailure], total: usize) {
    if failures.is_empty() {
        info!("{operation} completed on {total} server(s)");
        return;
    }

    for failure in failures {
        warn!("{operation} failed for '{}': {}", failure.server, failure.error);
    }
}
