//! Signal handling for graceful shutdown

use tracing::debug;

/// Waits for shutdown signals: ctrl-c everywhere, SIGTERM on Unix
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    #[cfg(unix)]
    pub async fn wait(&self) {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("received ctrl-c");
            }
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
        }
    }

    /// Wait for a shutdown signal
    #[cfg(not(unix))]
    pub async fn wait(&self) {
        let _ = tokio::signal::ctrl_c().await;
        debug!("received ctrl-c");
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
