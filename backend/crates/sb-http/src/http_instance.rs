use crate::connections::Connections;
use crate::{HttpError, HttpInstanceConfig, StopCoordinator, StopGuard, StopMode, build_app};

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use sb_config::InstanceConfig;
use sb_core::{
    Instance, InstanceContext, InstanceFactory, InstanceState, LifecycleOp, Result as CoreResult,
    Router, ServerType,
};
use tokio::net::TcpListener;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// The `http` server variant: an axum app over a listener bound at initialize.
pub struct HttpInstance {
    context: InstanceContext,
    coordinator: StopCoordinator,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    state: InstanceState,
    config: HttpInstanceConfig,
    listener: Option<StdTcpListener>,
    stop: Option<StopGuard>,
    router: Option<Router>,
    local_addr: Option<SocketAddr>,
}

impl HttpInstance {
    pub fn new(context: InstanceContext) -> Self {
        Self {
            context,
            coordinator: StopCoordinator::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Constructor to register under [`ServerType::Http`]
    pub fn constructor() -> impl Fn(InstanceContext) -> Arc<dyn Instance> + Send + Sync + 'static
    {
        |context| -> Arc<dyn Instance> { Arc::new(HttpInstance::new(context)) }
    }

    /// Register this variant with `factory`
    pub fn register(factory: &mut InstanceFactory) {
        factory.register(ServerType::Http, Self::constructor());
    }

    pub fn context(&self) -> &InstanceContext {
        &self.context
    }

    /// Address actually bound, known once initialized
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock().local_addr
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bind(&self) -> Result<StdTcpListener, HttpError> {
        let address = self.context.bind_address();
        let listener =
            StdTcpListener::bind((self.context.bind_ip.as_str(), self.context.bind_port))
                .map_err(|e| HttpError::bind(&address, e))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| HttpError::bind(&address, e))?;
        Ok(listener)
    }

    /// Move to the state `op` leads to and signal the serve loop.
    ///
    /// An abort after a shutdown still signals, so a drain in progress is cut short.
    fn stop(&self, op: LifecycleOp, mode: StopMode) -> CoreResult<()> {
        let mut inner = self.lock();
        let previous = inner.state;
        let next = previous.transition(op)?;
        if next == previous {
            return Ok(());
        }
        inner.state = next;

        inner.listener = None;
        drop(inner);

        let listening = self.coordinator.stop(mode);
        debug!(
            "{} asked to stop ({mode:?}), {listening} listener(s)",
            self.context.name
        );
        Ok(())
    }
}

#[async_trait]
impl Instance for HttpInstance {
    async fn initialize(&self, config: &InstanceConfig) -> CoreResult<()> {
        let mut inner = self.lock();
        let next = inner.state.transition(LifecycleOp::Initialize)?;

        let settings: HttpInstanceConfig = config.decode().map_err(HttpError::from)?;
        let listener = self.bind()?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| HttpError::bind(self.context.bind_address(), e))?;

        inner.config = settings;
        inner.listener = Some(listener);
        inner.stop = Some(self.coordinator.subscribe_guard());
        inner.local_addr = Some(local_addr);
        inner.state = next;

        info!("{} bound to {local_addr}", self.context.name);
        Ok(())
    }

    async fn run(&self) -> CoreResult<()> {
        let (listener, mut stop, router, config) = {
            let mut inner = self.lock();
            let next = inner.state.transition(LifecycleOp::Run)?;

            let listener = inner
                .listener
                .take()
                .ok_or_else(|| HttpError::state("listener missing before run"))?;
            let listener = TcpListener::from_std(listener).map_err(HttpError::serve)?;
            let stop = inner
                .stop
                .take()
                .ok_or_else(|| HttpError::state("stop signal missing before run"))?;

            inner.state = next;
            (listener, stop, inner.router.clone(), inner.config.clone())
        };

        let app = build_app(router, &config);
        let mut connections = Connections::new();
        let name = &self.context.name;

        info!("{name} serving on {}", self.context.bind_address());
        let mode = loop {
            tokio::select! {
                mode = stop.wait() => break mode,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => connections.spawn(stream, peer, app.clone()),
                    Err(e) => {
                        warn!("{name} failed to accept a connection: {e}");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                Some(()) = connections.join_next(), if !connections.is_empty() => {}
            }
        };
        drop(listener);

        if mode == StopMode::Graceful {
            connections.drain();
            debug!("{name} draining {} connection(s)", connections.len());
            loop {
                tokio::select! {
                    joined = connections.join_next() => {
                        if joined.is_none() {
                            info!("{name} drained and stopped");
                            return Ok(());
                        }
                    }
                    mode = stop.wait() => {
                        if mode == StopMode::Abort {
                            break;
                        }
                    }
                }
            }
        }

        let open = connections.len();
        connections.abort().await;
        warn!("{name} aborted, dropped {open} open connection(s)");
        Ok(())
    }

    async fn shutdown(&self) -> CoreResult<()> {
        self.stop(LifecycleOp::Shutdown, StopMode::Graceful)
    }

    async fn abort(&self) -> CoreResult<()> {
        self.stop(LifecycleOp::Abort, StopMode::Abort)
    }

    async fn attach_router(&self, router: Router) -> CoreResult<()> {
        let mut inner = self.lock();
        match inner.state {
            InstanceState::Initialized => {
                debug!(
                    "{} attached router with {} route(s)",
                    self.context.name,
                    router.len()
                );
                inner.router = Some(router);
                Ok(())
            }
            state => Err(HttpError::state(format!("cannot attach a router while {state}")).into()),
        }
    }

    fn state(&self) -> InstanceState {
        self.lock().state
    }
}
