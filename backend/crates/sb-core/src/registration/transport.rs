use crate::{CollectorKind, Result as CoreResult};

use std::sync::Arc;

use async_trait::async_trait;
use sb_proto::{RegisterReq, RegisterRes, ReportReq, ReportRes};
use tonic::Status;

/// An established connection to one collector
#[async_trait]
pub trait CollectorTransport: Send + Sync {
    async fn register(&self, request: RegisterReq) -> Result<RegisterRes, Status>;

    async fn report_state(&self, request: ReportReq) -> Result<ReportRes, Status>;

    /// Called at most once, when the owning client closes.
    ///
    /// The underlying connection is released when the last reference to the
    /// transport drops; implementations only need to stop using it here.
    async fn close(&self);
}

/// Dials collectors. One call is one dial attempt.
#[async_trait]
pub trait CollectorConnector: Send + Sync {
    async fn connect(
        &self,
        kind: CollectorKind,
        address: &str,
    ) -> CoreResult<Arc<dyn CollectorTransport>>;
}
