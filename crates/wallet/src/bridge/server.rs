use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::bridge::{router::build_router, state::BridgeState};

/// How long [`BridgeServer::stop`] waits for open connections to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Local HTTP server the relay page talks to.
#[derive(Debug)]
pub(crate) struct BridgeServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl BridgeServer {
    /// Binds `127.0.0.1:port` (`0` picks a free port) and starts serving.
    pub async fn start(state: Arc<BridgeState>, port: u16) -> std::io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await?;
        let addr = listener.local_addr()?;
        let router = build_router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                error!(%err, "wallet bridge server failed");
            }
        });
        debug!(%addr, "wallet bridge listening");

        Ok(Self { addr, shutdown_tx: Some(shutdown_tx), task: Some(task) })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stops accepting connections and waits briefly for in-flight ones.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take()
            && tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err()
        {
            debug!(addr = %self.addr, "wallet bridge did not drain in time");
        }
    }
}
