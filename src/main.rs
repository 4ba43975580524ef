//! Demo daemon for the hotkey-essentials facade
//!
//! Builds the facade from the environment, registers a quit hotkey, and
//! logs listener events until ctrl-c/SIGTERM or ctrl+alt+q.
//!
//! Useful for checking that the chords of interest reach this process on a
//! given desktop before wiring the crate into an application.

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use hotkey_essentials::{Binding, Config, Essentials, ShutdownSignal};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let essentials = Essentials::with_config(config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "hotkey-essentials demo starting"
    );

    let (quit_tx, mut quit_rx) = mpsc::channel::<()>(1);
    essentials.register_hotkey(
        "ctrl+alt+q",
        Binding::new("request_shutdown", move || {
            let _ = quit_tx.blocking_send(());
        }),
    )?;

    let mut events = essentials.subscribe();

    if let Err(e) = essentials.enable_hotkeys() {
        error!(?e, "failed to enable hotkey listener");
        warn!("continuing without hotkey support - check input permissions");
    }

    let shutdown = ShutdownSignal::new();
    let shutdown_wait = shutdown.wait();
    tokio::pin!(shutdown_wait);

    loop {
        tokio::select! {
            _ = &mut shutdown_wait => {
                info!("shutdown signal received");
                break;
            }
            _ = quit_rx.recv() => {
                info!("quit hotkey pressed");
                break;
            }
            event = events.recv() => {
                match event {
                    Ok(event) => info!(%event, "listener event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "listener event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    info!("shutting down...");
    essentials.shutdown();
    info!("hotkey-essentials demo stopped");

    Ok(())
}
