use crate::registration::retry::dial_with_retry;
use crate::{
    CollectorConnector, CollectorKind, CollectorTransport, CoreError, RegistrationErrorKind,
    RegistrationType, ReportedState, Result as CoreResult, RetryPolicy,
};

use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use sb_proto::{RegisterReq, ReportReq, register_req, report_req};
use tokio::sync::Mutex;

/// Client for one statistics or state collector.
///
/// Holds at most one transport; once closed it stays closed.
pub struct RegistrationClient {
    kind: CollectorKind,
    address: String,
    transport: Mutex<Option<Arc<dyn CollectorTransport>>>,
}

impl RegistrationClient {
    /// Dial `address`, retrying only as far as `retry` allows
    pub async fn connect(
        kind: CollectorKind,
        address: &str,
        connector: &dyn CollectorConnector,
        retry: &RetryPolicy,
    ) -> CoreResult<Self> {
        let transport =
            dial_with_retry(retry, kind, address, || connector.connect(kind, address)).await?;

        info!("Connected to {kind} collector at {address}");

        Ok(Self::from_transport(kind, address, transport))
    }

    pub fn from_transport(
        kind: CollectorKind,
        address: impl Into<String>,
        transport: Arc<dyn CollectorTransport>,
    ) -> Self {
        Self {
            kind,
            address: address.into(),
            transport: Mutex::new(Some(transport)),
        }
    }

    pub fn kind(&self) -> CollectorKind {
        self.kind
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn is_open(&self) -> bool {
        self.transport.lock().await.is_some()
    }

    /// Enroll `uuid` with the collector.
    ///
    /// A failed call is `Transport`; a reply with `enrolled = false` is `Rejected`.
    pub async fn register(&self, uuid: &str, registration: RegistrationType) -> CoreResult<()> {
        let transport = self.open_transport(uuid).await?;

        let request = RegisterReq {
            uuid: uuid.to_string(),
            r#type: register_req::Type::from(registration) as i32,
        };

        let response = transport.register(request).await.map_err(|status| {
            CoreError::registration(
                RegistrationErrorKind::Transport,
                uuid,
                format!("{} collector call failed: {}", self.kind, status.message()),
            )
        })?;

        if !response.enrolled {
            return Err(CoreError::registration(
                RegistrationErrorKind::Rejected,
                uuid,
                format!("{} collector refused enrollment", self.kind),
            ));
        }

        debug!("{uuid} enrolled with {} collector as {registration}", self.kind);
        Ok(())
    }

    /// Report the health of `target_uuid`. Only the state collector accepts reports.
    pub async fn report_state(
        &self,
        target_uuid: &str,
        state: ReportedState,
        reportee_uuid: &str,
        reason: &str,
    ) -> CoreResult<()> {
        if self.kind != CollectorKind::State {
            return Err(CoreError::registration(
                RegistrationErrorKind::Unsupported,
                target_uuid,
                format!("{} collector does not accept state reports", self.kind),
            ));
        }

        let transport = self.open_transport(target_uuid).await?;

        let request = ReportReq {
            target_uuid: target_uuid.to_string(),
            state: report_req::State::from(state) as i32,
            reportee_uuid: reportee_uuid.to_string(),
            reason: reason.to_string(),
        };

        transport.report_state(request).await.map_err(|status| {
            CoreError::registration(
                RegistrationErrorKind::Transport,
                target_uuid,
                format!("state report failed: {}", status.message()),
            )
        })?;

        debug!("reported {target_uuid} as {state}");
        Ok(())
    }

    /// Close the connection. Closing twice is a no-op.
    pub async fn close(&self) {
        let transport = self.transport.lock().await.take();
        if let Some(transport) = transport {
            transport.close().await;
            debug!("Closed {} collector connection to {}", self.kind, self.address);
        }
    }

    async fn open_transport(&self, uuid: &str) -> CoreResult<Arc<dyn CollectorTransport>> {
        self.transport.lock().await.clone().ok_or_else(|| {
            CoreError::registration(
                RegistrationErrorKind::Transport,
                uuid,
                format!("{} collector connection is closed", self.kind),
            )
        })
    }
}

impl fmt::Debug for RegistrationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationClient")
            .field("kind", &self.kind)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
