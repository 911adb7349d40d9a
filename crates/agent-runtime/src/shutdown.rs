//! Cooperative shutdown signal for the agent loop

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Cloneable stop flag checked at the top of every loop iteration
///
/// Stopping never interrupts a read, handler call or sleep that is already
/// in progress; the loop notices on its next iteration.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request a graceful stop
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until a stop has been requested
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Spawn a task that requests a stop on Ctrl-C
    pub fn stop_on_ctrl_c(&self) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current cycle");
                handle.stop();
            }
        })
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_shared_between_clones() {
        let handle = ShutdownHandle::new();
        let other = handle.clone();
        assert!(!other.is_stopped());

        handle.stop();
        assert!(other.is_stopped());
    }

    #[tokio::test]
    async fn test_stopped_resolves_after_stop() {
        let handle = ShutdownHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.stopped().await });

        handle.stop();
        tokio_test::assert_ok!(task.await);
    }
}
