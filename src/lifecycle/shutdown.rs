//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;

/// Broadcast handle that tells the server to stop accepting and drain.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` observes a trigger or every `Shutdown` handle is gone.
pub async fn wait_for(mut rx: broadcast::Receiver<()>) {
    // Lagged cannot lose the signal: a lag means a trigger was sent.
    let _ = rx.recv().await;
}
