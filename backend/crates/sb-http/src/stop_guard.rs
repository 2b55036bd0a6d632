use crate::{StopCoordinator, StopMode};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Receiving end of a [`StopCoordinator`]
pub struct StopGuard {
    stop_rx: broadcast::Receiver<StopMode>,
}

impl StopGuard {
    pub fn new(coordinator: &StopCoordinator) -> Self {
        Self {
            stop_rx: coordinator.subscribe(),
        }
    }

    /// Wait for a stop request.
    ///
    /// A dropped coordinator means nobody can ask for a graceful stop
    /// anymore, so it reads as an abort.
    pub async fn wait(&mut self) -> StopMode {
        loop {
            match self.stop_rx.recv().await {
                Ok(mode) => return mode,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return StopMode::Abort,
            }
        }
    }
}
