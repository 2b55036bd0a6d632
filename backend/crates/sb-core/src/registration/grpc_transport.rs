use crate::{CollectorConnector, CollectorKind, CollectorTransport, CoreError, Result as CoreResult};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use sb_proto::{RegisterReq, RegisterRes, ReportReq, ReportRes, StateClient, StatisticsClient};
use tonic::Status;
use tonic::transport::Endpoint;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Plaintext gRPC dialer for statistics/state collectors
#[derive(Debug, Clone)]
pub struct GrpcConnector {
    connect_timeout: Duration,
}

impl GrpcConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for GrpcConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl CollectorConnector for GrpcConnector {
    async fn connect(
        &self,
        kind: CollectorKind,
        address: &str,
    ) -> CoreResult<Arc<dyn CollectorTransport>> {
        debug!("dialling {kind} collector: {address}");

        let endpoint = Endpoint::from_shared(format!("http://{address}"))
            .map_err(|e| CoreError::connection(address, e.to_string()))?
            .connect_timeout(self.connect_timeout);

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| CoreError::connection(address, e.to_string()))?;

        let transport = match kind {
            CollectorKind::Statistics => GrpcTransport::Statistics(StatisticsClient::new(channel)),
            CollectorKind::State => GrpcTransport::State(StateClient::new(channel)),
        };

        Ok(Arc::new(transport))
    }
}

/// tonic-backed transport; dropping the last client closes the channel
pub enum GrpcTransport {
    Statistics(StatisticsClient),
    State(StateClient),
}

#[async_trait]
impl CollectorTransport for GrpcTransport {
    async fn register(&self, request: RegisterReq) -> Result<RegisterRes, Status> {
        let response = match self {
            Self::Statistics(client) => client.clone().register_for_stats(request).await?,
            Self::State(client) => client.clone().register_for_state(request).await?,
        };
        Ok(response.into_inner())
    }

    async fn report_state(&self, request: ReportReq) -> Result<ReportRes, Status> {
        match self {
            Self::Statistics(_) => Err(Status::unimplemented(
                "statistics collector does not accept state reports",
            )),
            Self::State(client) => Ok(client.clone().report_state(request).await?.into_inner()),
        }
    }

    /// Only logs. The tonic channel closes once the last clone of this
    /// transport, and with it the channel, is dropped.
    async fn close(&self) {
        debug!("closing collector channel");
    }
}
