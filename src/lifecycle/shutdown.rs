//! Graceful shutdown broadcast: one signal wait task fans out to every
//! subscriber (the HTTP server, the initialization-file watcher).

use tokio::sync::broadcast;

use super::signals::wait_for_shutdown_signal;

pub struct Shutdown {
    sender: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);

        let task_sender = sender.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            let _ = task_sender.send(());
        });

        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Trigger shutdown without waiting for an OS signal. Used by tests
    /// that spin up a real server on an ephemeral port and need to tear
    /// it down deterministically.
    pub fn trigger(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
