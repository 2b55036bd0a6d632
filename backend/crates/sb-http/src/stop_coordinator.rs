use crate::StopGuard;

use tokio::sync::broadcast;

/// How a running server should stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Stop accepting, finish in-flight requests
    Graceful,
    /// Drop everything now
    Abort,
}

/// Fans a stop request out to everything serving for one instance
#[derive(Clone)]
pub struct StopCoordinator {
    stop_tx: broadcast::Sender<StopMode>,
}

impl StopCoordinator {
    pub fn new() -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self { stop_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StopMode> {
        self.stop_tx.subscribe()
    }

    /// Signal every subscriber. Returns how many were listening.
    pub fn stop(&self, mode: StopMode) -> usize {
        log::debug!("Stop requested ({mode:?})");
        self.stop_tx.send(mode).unwrap_or(0)
    }

    pub fn subscribe_guard(&self) -> StopGuard {
        StopGuard::new(self)
    }
}

impl Default for StopCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
