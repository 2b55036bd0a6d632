use crate::{CoreError, Instance, Metrics, RegistrationClient, ServerType};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

/// Span carried by every log line a server's lifecycle emits
pub fn server_span(name: &str, uuid: &str) -> Span {
    info_span!("server", name = %name, uuid = %uuid)
}

/// One managed server: identity, optional collector clients and its instance.
///
/// Identity fields are fixed at construction. The retained run task is the
/// only thing that changes after the server is inserted into a registry.
pub struct Server {
    name: String,
    server_type: ServerType,
    uuid: String,
    bind_ip: String,
    bind_port: u16,
    statistics: Option<RegistrationClient>,
    state: Option<RegistrationClient>,
    instance: Arc<dyn Instance>,
    enabled: bool,
    span: Span,
    run_task: Mutex<Option<RunTask>>,
}

/// A started run. The join handle is taken by whoever waits for it; the
/// abort handle stays so the task can still be cancelled while being waited on.
struct RunTask {
    handle: Option<JoinHandle<()>>,
    abort: AbortHandle,
}

impl RunTask {
    fn is_live(&self) -> bool {
        !self.abort.is_finished()
    }
}

/// Identity half of a server, as resolved during bring-up
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub name: String,
    pub server_type: ServerType,
    pub uuid: String,
    pub bind_ip: String,
    pub bind_port: u16,
}

impl Server {
    pub fn new(
        identity: ServerIdentity,
        statistics: Option<RegistrationClient>,
        state: Option<RegistrationClient>,
        instance: Arc<dyn Instance>,
    ) -> Self {
        let span = server_span(&identity.name, &identity.uuid);
        Self {
            name: identity.name,
            server_type: identity.server_type,
            uuid: identity.uuid,
            bind_ip: identity.bind_ip,
            bind_port: identity.bind_port,
            statistics,
            state,
            instance,
            enabled: false,
            span,
            run_task: Mutex::new(None),
        }
    }

    pub(crate) fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server_type(&self) -> ServerType {
        self.server_type
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn bind_ip(&self) -> &str {
        &self.bind_ip
    }

    pub fn bind_port(&self) -> u16 {
        self.bind_port
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn statistics(&self) -> Option<&RegistrationClient> {
        self.statistics.as_ref()
    }

    pub fn state(&self) -> Option<&RegistrationClient> {
        self.state.as_ref()
    }

    pub fn instance(&self) -> &Arc<dyn Instance> {
        &self.instance
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// True while a started run task has not yet finished
    pub fn is_running(&self) -> bool {
        self.lock_run_task().as_ref().is_some_and(RunTask::is_live)
    }

    /// Spawn the instance's run on its own task and retain the handle.
    ///
    /// Returns false when a previous run task is still live.
    pub(crate) fn start(&self, metrics: &Metrics) -> bool {
        let mut slot = self.lock_run_task();
        if slot.as_ref().is_some_and(RunTask::is_live) {
            warn!(parent: &self.span, "{} is already running", self.name);
            return false;
        }

        let instance = Arc::clone(&self.instance);
        let metrics = metrics.clone();
        let name = self.name.clone();

        metrics.server_started();
        let task = async move {
            match instance.run().await {
                Ok(()) => {
                    info!("{name} stopped serving");
                    metrics.server_finished("ok");
                }
                Err(e) => {
                    error!("{name} run failed: {e}");
                    metrics.server_finished("error");
                }
            }
        };

        let handle = tokio::spawn(task.instrument(self.span.clone()));
        *slot = Some(RunTask {
            abort: handle.abort_handle(),
            handle: Some(handle),
        });
        true
    }

    /// Graceful teardown: instance shutdown, wait for the run task, close clients.
    ///
    /// Every step runs even if an earlier one failed; all failures are returned.
    pub async fn shutdown(&self) -> Vec<CoreError> {
        async {
            let mut errors = Vec::new();

            match self.instance.shutdown().await {
                Ok(()) => {
                    if let Err(e) = self.join_run_task().await {
                        errors.push(e);
                    }
                }
                Err(e) => errors.push(e),
            }

            self.close_clients().await;
            debug!("{} torn down", self.name);
            errors
        }
        .instrument(self.span.clone())
        .await
    }

    /// Forced teardown: instance abort, cancel the run task, close clients.
    pub async fn abort(&self) -> Vec<CoreError> {
        async {
            let mut errors = Vec::new();

            if let Err(e) = self.instance.abort().await {
                errors.push(e);
            }

            let run_abort = self
                .lock_run_task()
                .as_ref()
                .map(|task| task.abort.clone());
            if let Some(run_abort) = run_abort {
                run_abort.abort();
            }

            self.close_clients().await;
            debug!("{} aborted", self.name);
            errors
        }
        .instrument(self.span.clone())
        .await
    }

    async fn close_clients(&self) {
        if let Some(client) = &self.statistics {
            client.close().await;
        }
        if let Some(client) = &self.state {
            client.close().await;
        }
    }

    async fn join_run_task(&self) -> Result<(), CoreError> {
        let handle = self
            .lock_run_task()
            .as_mut()
            .and_then(|task| task.handle.take());
        let Some(handle) = handle else {
            return Ok(());
        };

        match handle.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(CoreError::instance(format!(
                "run task for '{}' failed: {e}",
                self.name
            ))),
        }
    }

    fn lock_run_task(&self) -> MutexGuard<'_, Option<RunTask>> {
        self.run_task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("name", &self.name)
            .field("server_type", &self.server_type)
            .field("uuid", &self.uuid)
            .field("enabled", &self.enabled)
            .field("statistics", &self.statistics)
            .field("state", &self.state)
            .field("instance_state", &self.instance.state())
            .finish_non_exhaustive()
    }
}
