//! Shutdown coordination for the proxy.
//!
//! Backed by a `watch` channel holding a "stopping" flag, so a task that
//! subscribes after the trigger still sees it.

use tokio::sync::watch;

pub struct Shutdown {
    stopping: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopping, _) = watch::channel(false);
        Self { stopping }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal(self.stopping.subscribe())
    }

    pub fn trigger(&self) {
        self.stopping.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopping.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Handed to long-running tasks; resolves once shutdown starts.
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    /// Wait for the trigger. Also returns if the coordinator is dropped.
    pub async fn recv(mut self) {
        let _ = self.0.wait_for(|stopping| *stopping).await;
    }
}
