//! Shutdown coordination between the signal watcher and the HTTP server.
//!
//! `startup::run` hands one receiver to `HttpServer::run` and the
//! coordinator itself to `signals::wait_for_signal`. Tests trigger it
//! directly to stop a server bound on an ephemeral port.

use tokio::sync::broadcast;

/// One-shot stop signal for the HTTP server.
///
/// Once triggered, `axum::serve` stops accepting and drains in-flight
/// requests before `HttpServer::run` returns.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to pass to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop the server. A no-op once the server has already stopped.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Servers still listening for the stop signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
