//! Process signal handling.
//!
//! Interest in SIGINT and SIGTERM is registered up front, before the server
//! runs. The watcher waits for exactly one of them, releases its signal
//! streams, then triggers the shared shutdown. The runtime keeps its handler
//! installed afterwards, so further signals are absorbed instead of killing
//! the process mid-drain.

use hapdemo_app::lifecycle::{Shutdown, cancel_on};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Registered interest in the termination signals.
#[cfg(unix)]
pub struct Signals {
    interrupt: Signal,
    terminate: Signal,
}

#[cfg(unix)]
impl Signals {
    /// Register interest in SIGINT and SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler cannot be installed.
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the first signal and return its name. The streams are
    /// dropped on return.
    pub async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
pub struct Signals;

#[cfg(not(unix))]
impl Signals {
    pub fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    pub async fn recv(self) -> &'static str {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    }
}

/// Wait for one termination signal, then trigger `shutdown` exactly once.
pub async fn watch(signals: Signals, shutdown: Shutdown) {
    let received = cancel_on(
        async move {
            let received = signals.recv().await;
            tracing::info!("Received SIGTERM signal !");
            received
        },
        shutdown,
    )
    .await;
    tracing::debug!(signal = received, "shutdown requested");
}
