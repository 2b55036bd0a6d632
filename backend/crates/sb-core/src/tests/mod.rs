mod router;

use crate::{
    CollectorConnector, CollectorKind, CollectorTransport, CoreError, Instance, InstanceFactory,
    InstanceState, LifecycleOp, Result as CoreResult, Router, ServerType,
};

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sb_config::{CollectorEndpoint, InstanceConfig, ServerConfig};
use sb_proto::{RegisterReq, RegisterRes, ReportReq, ReportRes};
use tokio::sync::Notify;
use tonic::Status;

// =========================================================================
// Spy instance
// =========================================================================

#[derive(Default)]
pub(crate) struct SpyCalls {
    pub initialize: AtomicUsize,
    pub run: AtomicUsize,
    pub shutdown: AtomicUsize,
    pub abort: AtomicUsize,
    pub attach_router: AtomicUsize,
}

impl SpyCalls {
    pub(crate) fn total(&self) -> usize {
        self.initialize.load(Ordering::SeqCst)
            + self.run.load(Ordering::SeqCst)
            + self.shutdown.load(Ordering::SeqCst)
            + self.abort.load(Ordering::SeqCst)
            + self.attach_router.load(Ordering::SeqCst)
    }
}

/// Instance that records calls and runs until told to stop
pub(crate) struct SpyInstance {
    pub calls: SpyCalls,
    state: Mutex<InstanceState>,
    stop: Notify,
    router: Mutex<Option<Router>>,
    fail_initialize: bool,
    fail_shutdown: bool,
    stuck: bool,
}

impl SpyInstance {
    fn new(fail_initialize: bool, fail_shutdown: bool, stuck: bool) -> Self {
        Self {
            calls: SpyCalls::default(),
            state: Mutex::new(InstanceState::Uninitialized),
            stop: Notify::new(),
            router: Mutex::new(None),
            fail_initialize,
            fail_shutdown,
            stuck,
        }
    }

    fn wake_run(&self) {
        if !self.stuck {
            self.stop.notify_one();
        }
    }

    pub(crate) fn attached_routes(&self) -> usize {
        self.router
            .lock()
            .unwrap()
            .as_ref()
            .map_or(0, Router::len)
    }

    fn apply(&self, op: LifecycleOp) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        *state = state.transition(op)?;
        Ok(())
    }
}

#[async_trait]
impl Instance for SpyInstance {
    async fn initialize(&self, _config: &InstanceConfig) -> CoreResult<()> {
        self.calls.initialize.fetch_add(1, Ordering::SeqCst);
        if self.fail_initialize {
            return Err(CoreError::instance("spy refused to initialize"));
        }
        self.apply(LifecycleOp::Initialize)
    }

    async fn run(&self) -> CoreResult<()> {
        self.calls.run.fetch_add(1, Ordering::SeqCst);
        self.apply(LifecycleOp::Run)?;
        self.stop.notified().await;
        Ok(())
    }

    async fn shutdown(&self) -> CoreResult<()> {
        self.calls.shutdown.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            return Err(CoreError::instance("spy refused to shut down"));
        }
        self.apply(LifecycleOp::Shutdown)?;
        self.wake_run();
        Ok(())
    }

    async fn abort(&self) -> CoreResult<()> {
        self.calls.abort.fetch_add(1, Ordering::SeqCst);
        self.apply(LifecycleOp::Abort)?;
        self.wake_run();
        Ok(())
    }

    async fn attach_router(&self, router: Router) -> CoreResult<()> {
        self.calls.attach_router.fetch_add(1, Ordering::SeqCst);
        *self.router.lock().unwrap() = Some(router);
        Ok(())
    }

    fn state(&self) -> InstanceState {
        *self.state.lock().unwrap()
    }
}

/// Hands out spy instances and keeps them reachable by server name
#[derive(Clone, Default)]
pub(crate) struct SpyFactory {
    instances: Arc<Mutex<BTreeMap<String, Arc<SpyInstance>>>>,
    fail_initialize: Arc<HashSet<String>>,
    fail_shutdown: Arc<HashSet<String>>,
    stuck: Arc<HashSet<String>>,
}

impl SpyFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_initialize(mut self, names: &[&str]) -> Self {
        self.fail_initialize = Arc::new(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub(crate) fn failing_shutdown(mut self, names: &[&str]) -> Self {
        self.fail_shutdown = Arc::new(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Instances whose run ignores shutdown and abort
    pub(crate) fn stuck_running(mut self, names: &[&str]) -> Self {
        self.stuck = Arc::new(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub(crate) fn factory(&self) -> InstanceFactory {
        let spies = self.clone();
        InstanceFactory::new().with(ServerType::Http, move |context| {
            let spy = Arc::new(SpyInstance::new(
                spies.fail_initialize.contains(&context.name),
                spies.fail_shutdown.contains(&context.name),
                spies.stuck.contains(&context.name),
            ));
            spies
                .instances
                .lock()
                .unwrap()
                .insert(context.name.clone(), Arc::clone(&spy));
            let instance: Arc<dyn Instance> = spy;
            instance
        })
    }

    pub(crate) fn spy(&self, name: &str) -> Arc<SpyInstance> {
        Arc::clone(&self.instances.lock().unwrap()[name])
    }

    /// Names of every server an instance was constructed for
    pub(crate) fn created(&self) -> Vec<String> {
        self.instances.lock().unwrap().keys().cloned().collect()
    }
}

// =========================================================================
// Fake collectors
// =========================================================================

/// Everything the fake collectors observed
#[derive(Default)]
pub(crate) struct CollectorLog {
    pub connects: Mutex<Vec<(CollectorKind, String)>>,
    pub registrations: Mutex<Vec<RegisterReq>>,
    pub reports: Mutex<Vec<ReportReq>>,
    pub closes: AtomicUsize,
}

impl CollectorLog {
    pub(crate) fn connected_addresses(&self) -> Vec<String> {
        self.connects
            .lock()
            .unwrap()
            .iter()
            .map(|(_, address)| address.clone())
            .collect()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub(crate) struct FakeTransport {
    log: Arc<CollectorLog>,
    enrolled: bool,
    unavailable: bool,
}

impl FakeTransport {
    pub(crate) fn new(log: Arc<CollectorLog>, enrolled: bool, unavailable: bool) -> Self {
        Self {
            log,
            enrolled,
            unavailable,
        }
    }
}

#[async_trait]
impl CollectorTransport for FakeTransport {
    async fn register(&self, request: RegisterReq) -> Result<RegisterRes, Status> {
        if self.unavailable {
            return Err(Status::unavailable("collector went away"));
        }
        self.log.registrations.lock().unwrap().push(request);
        Ok(RegisterRes {
            enrolled: self.enrolled,
        })
    }

    async fn report_state(&self, request: ReportReq) -> Result<ReportRes, Status> {
        if self.unavailable {
            return Err(Status::unavailable("collector went away"));
        }
        self.log.reports.lock().unwrap().push(request);
        Ok(ReportRes {})
    }

    async fn close(&self) {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Connector handing out fake transports; some addresses refuse to connect
pub(crate) struct FakeConnector {
    pub log: Arc<CollectorLog>,
    enrolled: bool,
    unavailable: bool,
    unreachable: HashSet<String>,
    refusals_left: AtomicU32,
}

impl FakeConnector {
    pub(crate) fn new() -> Self {
        Self {
            log: Arc::new(CollectorLog::default()),
            enrolled: true,
            unavailable: false,
            unreachable: HashSet::new(),
            refusals_left: AtomicU32::new(0),
        }
    }

    pub(crate) fn rejecting(mut self) -> Self {
        self.enrolled = false;
        self
    }

    pub(crate) fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub(crate) fn unreachable(mut self, address: &str) -> Self {
        self.unreachable.insert(address.to_string());
        self
    }

    /// Refuse the first `count` dials regardless of address
    pub(crate) fn refusing_first(self, count: u32) -> Self {
        self.refusals_left.store(count, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl CollectorConnector for FakeConnector {
    async fn connect(
        &self,
        kind: CollectorKind,
        address: &str,
    ) -> CoreResult<Arc<dyn CollectorTransport>> {
        self.log
            .connects
            .lock()
            .unwrap()
            .push((kind, address.to_string()));

        if self.unreachable.contains(address) {
            return Err(CoreError::connection(address, "connection refused"));
        }

        let refused = self
            .refusals_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            return Err(CoreError::connection(address, "connection refused"));
        }

        Ok(Arc::new(FakeTransport::new(
            Arc::clone(&self.log),
            self.enrolled,
            self.unavailable,
        )))
    }
}

// =========================================================================
// Config builders
// =========================================================================

pub(crate) fn endpoint(port: u16) -> CollectorEndpoint {
    CollectorEndpoint {
        enabled: true,
        host: "127.0.0.1".to_string(),
        port,
    }
}

pub(crate) fn server_config(server_type: &str, bind_port: u16) -> ServerConfig {
    ServerConfig {
        server_type: server_type.to_string(),
        bind_ip: "127.0.0.1".to_string(),
        bind_port,
        ..ServerConfig::default()
    }
}

/// Server config reporting to both collectors
pub(crate) fn monitored_config(bind_port: u16, stats_port: u16, state_port: u16) -> ServerConfig {
    ServerConfig {
        statistics: endpoint(stats_port),
        state: endpoint(state_port),
        ..server_config("http", bind_port)
    }
}

pub(crate) fn configs(entries: Vec<(&str, ServerConfig)>) -> BTreeMap<String, ServerConfig> {
    entries
        .into_iter()
        .map(|(name, config)| (name.to_string(), config))
        .collect()
}
