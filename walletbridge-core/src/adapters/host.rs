//! Host-process restart signal

use tokio::sync::watch;
use tracing::info;

use crate::ports::HostProcess;

/// Restart request delivered over a watch channel
///
/// The owner of the process waits on `restart_requested` and exits so a
/// supervisor can relaunch it with the applied update.
pub struct ShutdownSignal {
    sender: watch::Sender<bool>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn is_requested(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Resolve once a restart has been requested
    pub async fn restart_requested(&self) {
        let mut receiver = self.sender.subscribe();
        // Only fails when the sender is gone, which cannot happen while &self lives
        let _ = receiver.wait_for(|requested| *requested).await;
    }
}

impl HostProcess for ShutdownSignal {
    fn request_restart(&self) {
        info!("Restart requested");
        self.sender.send_replace(true);
    }
}
