use crate::{
    BringUpError, CollectorConnector, CollectorKind, CoreError, GrpcConnector, InstanceContext,
    InstanceFactory, Metrics, RegistrationClient, Result as CoreResult, RetryPolicy, Server,
    ServerIdentity, ServerType, derive_uuid,
};

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::Arc;

use log::{debug, error, info};
use sb_config::{CollectorEndpoint, ServerConfig};

/// Every server that completed bring-up, keyed by name.
///
/// Built once and never changed structurally afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    servers: BTreeMap<String, Arc<Server>>,
}

impl Registry {
    pub fn get(&self, name: &str) -> Option<&Arc<Server>> {
        self.servers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Servers in name order
    pub fn iter(&self) -> btree_map::Values<'_, String, Arc<Server>> {
        self.servers.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    fn insert(&mut self, server: Server) {
        self.servers
            .insert(server.name().to_string(), Arc::new(server));
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Arc<Server>;
    type IntoIter = btree_map::Values<'a, String, Arc<Server>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Brings configured servers up one by one into a [`Registry`]
pub struct RegistryBuilder {
    factory: InstanceFactory,
    connector: Arc<dyn CollectorConnector>,
    retry: RetryPolicy,
    metrics: Metrics,
}

impl RegistryBuilder {
    /// Builder dialling collectors over gRPC with default timeouts
    pub fn new(factory: InstanceFactory) -> Self {
        Self {
            factory,
            connector: Arc::new(GrpcConnector::default()),
            retry: RetryPolicy::default(),
            metrics: Metrics::new(),
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn CollectorConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Bring up every configured server in name order.
    ///
    /// Stops at the first failing server. Servers already up stay in the
    /// registry handed back inside the error; later entries are never touched.
    pub async fn build(
        &self,
        configs: &BTreeMap<String, ServerConfig>,
    ) -> Result<Registry, BringUpError> {
        let mut registry = Registry::default();

        for (name, config) in configs {
            match self.bring_up(name, config).await {
                Ok(server) => {
                    info!("Server '{}' is up as {}", name, server.uuid());
                    self.metrics.server_brought_up(server.server_type().as_str());
                    registry.insert(server);
                }
                Err(source) => {
                    error!("Bring-up failed for server '{name}': {source}");
                    self.metrics.bring_up_failed(failure_reason(&source));
                    self.metrics.servers_enabled(registry.len());
                    return Err(BringUpError {
                        server: name.clone(),
                        registry,
                        source,
                    });
                }
            }
        }

        self.metrics.servers_enabled(registry.len());
        Ok(registry)
    }

    async fn bring_up(&self, name: &str, config: &ServerConfig) -> CoreResult<Server> {
        let server_type: ServerType = config.server_type.parse()?;
        let uuid = derive_uuid(name, &config.bind_ip, config.bind_port);
        debug!("Bringing up '{name}' ({server_type}) as {uuid}");

        let statistics = self
            .dial(CollectorKind::Statistics, &config.statistics)
            .await?;

        let state = match self.dial(CollectorKind::State, &config.state).await {
            Ok(state) => state,
            Err(e) => {
                close(statistics).await;
                return Err(e);
            }
        };

        let context = InstanceContext {
            name: name.to_string(),
            uuid: uuid.clone(),
            bind_ip: config.bind_ip.clone(),
            bind_port: config.bind_port,
        };

        let instance = match self.factory.create(server_type, context) {
            Ok(instance) => instance,
            Err(e) => {
                close(statistics).await;
                close(state).await;
                return Err(e);
            }
        };

        if let Err(e) = instance.initialize(&config.instance_config).await {
            close(statistics).await;
            close(state).await;
            return Err(e);
        }

        let identity = ServerIdentity {
            name: name.to_string(),
            server_type,
            uuid,
            bind_ip: config.bind_ip.clone(),
            bind_port: config.bind_port,
        };

        let mut server = Server::new(identity, statistics, state, instance);
        server.enable();
        Ok(server)
    }

    async fn dial(
        &self,
        kind: CollectorKind,
        endpoint: &CollectorEndpoint,
    ) -> CoreResult<Option<RegistrationClient>> {
        if !endpoint.enabled {
            return Ok(None);
        }

        let client = RegistrationClient::connect(
            kind,
            &endpoint.address(),
            self.connector.as_ref(),
            &self.retry,
        )
        .await?;

        Ok(Some(client))
    }
}

async fn close(client: Option<RegistrationClient>) {
    if let Some(client) = client {
        client.close().await;
    }
}

fn failure_reason(error: &CoreError) -> &'static str {
    match error {
        CoreError::Config { .. } => "config",
        CoreError::Connection { .. } => "connection",
        CoreError::Registration { .. } => "registration",
        CoreError::Instance { .. } => "instance",
        CoreError::Route { .. } => "route",
        CoreError::Batch { .. } => "batch",
    }
}
