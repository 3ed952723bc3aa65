//! Shutdown coordination.
//!
//! A [`Shutdown`] is the single writer of a one-shot cancellation state;
//! any number of [`ShutdownToken`]s observe it. The state lives in a
//! [`watch`] channel, a single-slot mailbox: triggering twice is a no-op and
//! a token created after the trigger sees the cancellation immediately.

use std::future::Future;

use tokio::sync::watch;

/// Write side of the cancellation state. Not cloneable.
#[derive(Debug)]
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }
}

impl Shutdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token observing this shutdown.
    #[must_use]
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            receiver: self.sender.subscribe(),
        }
    }

    /// Request cancellation.
    ///
    /// Returns `true` only for the call that actually cancelled.
    pub fn trigger(&self) -> bool {
        self.sender.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Read side of the cancellation state.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    receiver: watch::Receiver<bool>,
}

impl ShutdownToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until cancellation is requested.
    ///
    /// Never resolves if the [`Shutdown`] is dropped without triggering.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let closed = receiver.wait_for(|cancelled| *cancelled).await.is_err();
        // the sender may have been dropped right after triggering
        let cancelled = *receiver.borrow();
        if closed && !cancelled {
            std::future::pending::<()>().await;
        }
    }

    /// Raw receiver on the cancellation state.
    ///
    /// Adapters wrap it in a stream to end long-lived responses (such as an
    /// event stream) on shutdown.
    #[must_use]
    pub fn receiver(&self) -> watch::Receiver<bool> {
        self.receiver.clone()
    }
}

/// Wait for `signal`, then trigger `shutdown`.
///
/// The signal future is consumed (and therefore dropped) before the trigger,
/// so whatever it registered is released before anyone observes the
/// cancellation. Returns what the signal produced.
pub async fn cancel_on<F>(signal: F, shutdown: Shutdown) -> F::Output
where
    F: Future,
{
    let received = signal.await;
    shutdown.trigger();
    received
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn should_start_not_cancelled() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());
        assert!(!shutdown.token().is_cancelled());
    }

    #[test]
    fn should_trigger_only_once() {
        let shutdown = Shutdown::new();
        let token = shutdown.token();
        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn should_resolve_cancelled_after_trigger() {
        let shutdown = Shutdown::new();
        let token = shutdown.token();

        let waiter = tokio::spawn(async move { token.cancelled().await });
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("token should observe cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn should_resolve_immediately_when_already_cancelled() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let token = shutdown.token();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already cancelled");
    }

    #[tokio::test]
    async fn should_never_resolve_when_shutdown_dropped_untriggered() {
        let shutdown = Shutdown::new();
        let token = shutdown.token();
        drop(shutdown);
        let result = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn should_resolve_when_shutdown_dropped_after_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let token = shutdown.token();
        drop(shutdown);
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("cancellation survives the sender");
    }

    #[tokio::test]
    async fn should_cancel_when_signal_resolves() {
        let shutdown = Shutdown::new();
        let token = shutdown.token();
        let (tx, rx) = tokio::sync::oneshot::channel::<&'static str>();

        let watcher = tokio::spawn(cancel_on(rx, shutdown));
        assert!(!token.is_cancelled());

        tx.send("SIGTERM").unwrap();
        let received = watcher.await.unwrap().unwrap();
        assert_eq!(received, "SIGTERM");
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn should_observe_cancellation_from_every_clone() {
        let shutdown = Shutdown::new();
        let token = shutdown.token();
        let other = token.clone();
        shutdown.trigger();
        token.cancelled().await;
        other.cancelled().await;
    }
}
