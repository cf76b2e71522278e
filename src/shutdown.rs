//! Graceful shutdown coordination.
//!
//! A [`ShutdownSignal`] is cloned into the supervisor and the consumer so a
//! single trigger (typically the Ctrl-C handler) wakes every component,
//! including one parked on an idle delivery stream. Triggering is
//! synchronous and callable from a signal-handler thread; waiting resolves
//! immediately when the signal was already triggered.

use tokio::sync::watch;

/// Shared stop signal for the daemon's long-running loops.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// Requests shutdown. Safe to call from non-async contexts.
    pub fn trigger(&self) {
        let _ = self.sender.send(true);
    }

    /// Non-blocking check of the current state.
    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes once shutdown has been requested, immediately if it
    /// already was.
    pub async fn triggered(&self) {
        let mut receiver = self.sender.subscribe();
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_starts_untriggered() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
    }

    #[tokio::test]
    async fn test_trigger_wakes_pending_waiter() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();

        let handle = tokio::spawn(async move { waiter.triggered().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.trigger();

        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .expect("waiter should wake after trigger")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_after_trigger_resolves_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        tokio::time::timeout(Duration::from_millis(100), signal.triggered())
            .await
            .expect("already-triggered signal should resolve at once");
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        clone.trigger();
        assert!(signal.is_triggered());
    }
}
