use std::net::SocketAddr;

use axum::Router as AxumRouter;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use log::debug;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Connections accepted by one serve loop, each served on its own task.
///
/// Draining lets every connection finish the request it is on before
/// closing. Aborting cancels the tasks, which drops the sockets mid-request.
pub(crate) struct Connections {
    tasks: JoinSet<()>,
    drain_tx: watch::Sender<bool>,
}

impl Connections {
    pub(crate) fn new() -> Self {
        let (drain_tx, _) = watch::channel(false);
        Self {
            tasks: JoinSet::new(),
            drain_tx,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn spawn(&mut self, stream: TcpStream, peer: SocketAddr, app: AxumRouter) {
        let drain = self.drain_tx.subscribe();
        self.tasks.spawn(serve_connection(stream, peer, app, drain));
    }

    /// Wait for the next connection to close. None once there are none left.
    pub(crate) async fn join_next(&mut self) -> Option<()> {
        self.tasks.join_next().await.map(|_| ())
    }

    pub(crate) fn drain(&self) {
        self.drain_tx.send_replace(true);
    }

    pub(crate) async fn abort(&mut self) {
        self.tasks.shutdown().await;
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    app: AxumRouter,
    mut drain: watch::Receiver<bool>,
) {
    let service = TowerToHyperService::new(app);
    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let mut draining = false;
    loop {
        tokio::select! {
            result = connection.as_mut() => {
                if let Err(e) = result {
                    debug!("connection from {peer} ended: {e}");
                }
                return;
            }
            _ = drain.changed(), if !draining => {
                draining = true;
                connection.as_mut().graceful_shutdown();
            }
        }
    }
}
