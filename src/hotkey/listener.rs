//! Background hotkey listener
//!
//! Hooks every registered chord with the OS through the global-hotkey
//! backend and dispatches callbacks from a dedicated thread. The thread is
//! signalled through an atomic flag and joined with a bounded timeout;
//! dropping the backend manager unhooks every chord, so the registry itself
//! survives a disable/enable cycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::events::ListenerEvent;

use super::keys::ChordError;
use super::registry::{HotkeyRegistry, RegisteredHotkey};

/// How long `start` waits for the listener thread to hook every chord
const STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that can occur in the hotkey listener
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey listener is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Chord(#[from] ChordError),

    #[error("failed to initialise hotkey backend: {0}")]
    Backend(String),

    #[error("failed to hook chord {chord}: {message}")]
    Hook { chord: String, message: String },

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("listener thread did not report startup in time")]
    StartupTimeout,
}

/// Global hotkey listener: owns the dispatch thread lifecycle
pub struct HotkeyListener {
    registry: Arc<Mutex<HotkeyRegistry>>,
    event_tx: broadcast::Sender<ListenerEvent>,
    pub(crate) running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    poll_interval: Duration,
    shutdown_timeout: Duration,
}

impl HotkeyListener {
    /// Create a new listener over a shared binding registry
    pub fn new(
        registry: Arc<Mutex<HotkeyRegistry>>,
        event_tx: broadcast::Sender<ListenerEvent>,
        poll_interval: Duration,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
            poll_interval,
            shutdown_timeout,
        }
    }

    /// Start the listener thread.
    ///
    /// Snapshots the registry, spawns the dispatch thread, and waits for it
    /// to confirm that the backend accepted every chord. Backend failures
    /// inside the thread are surfaced here through the startup channel.
    pub fn start(&self) -> Result<(), HotkeyError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyRunning);
        }

        let bindings = self.lock_registry().snapshot();
        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);
        let poll_interval = self.poll_interval;

        let (ready_tx, ready_rx) = bounded::<Result<(), HotkeyError>>(1);

        let spawned = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                info!("hotkey listener thread started");

                run_dispatch_loop(bindings, event_tx, Arc::clone(&running), poll_interval, ready_tx);

                running.store(false, Ordering::SeqCst);
                info!("hotkey listener thread stopped");
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(HotkeyError::ThreadSpawn(e.to_string()));
            }
        };

        match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(())) => {
                *self.lock_handle() = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                Err(HotkeyError::StartupTimeout)
            }
        }
    }

    /// Stop the listener thread, joining it with a bounded timeout.
    ///
    /// On timeout the thread is detached with a warning; it will still exit
    /// on its next poll of the running flag.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.lock_handle().take() {
            let deadline = Instant::now() + self.shutdown_timeout;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }

            if handle.is_finished() {
                if handle.join().is_err() {
                    error!("hotkey listener thread panicked");
                }
            } else {
                warn!(
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    "hotkey listener thread did not stop in time, detaching"
                );
            }
        }

        let _ = self.event_tx.send(ListenerEvent::ListenerDisabled);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, HotkeyRegistry> {
        self.registry
            .lock()
            .expect("hotkey registry mutex poisoned")
    }

    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle
            .lock()
            .expect("listener handle mutex poisoned")
    }
}

/// Hook every chord, ack startup, then dispatch until the flag clears
fn run_dispatch_loop(
    bindings: Vec<RegisteredHotkey>,
    event_tx: broadcast::Sender<ListenerEvent>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
    ready_tx: Sender<Result<(), HotkeyError>>,
) {
    // The manager must outlive the loop: dropping it unhooks every chord.
    let manager = match GlobalHotKeyManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            let _ = ready_tx.send(Err(HotkeyError::Backend(e.to_string())));
            return;
        }
    };

    let mut dispatch = HashMap::new();
    for entry in bindings {
        let hotkey = entry.chord.to_hotkey();
        if let Err(e) = manager.register(hotkey) {
            let _ = ready_tx.send(Err(HotkeyError::Hook {
                chord: entry.chord.canonical(),
                message: e.to_string(),
            }));
            return;
        }
        debug!(chord = %entry.chord, binding = entry.binding.name(), "hooked chord");
        dispatch.insert(hotkey.id(), entry);
    }

    let receiver = GlobalHotKeyEvent::receiver();

    // Drop events queued before this session; the channel is process-global.
    while receiver.try_recv().is_ok() {}

    let _ = ready_tx.send(Ok(()));
    let _ = event_tx.send(ListenerEvent::ListenerEnabled);

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(poll_interval) {
            Ok(event) => {
                let Some(entry) = dispatch.get(&event.id()) else {
                    continue;
                };
                let fire_on_release = entry.binding.triggers_on_release();
                let released = event.state() == HotKeyState::Released;
                if released != fire_on_release {
                    continue;
                }

                debug!(
                    chord = %entry.chord,
                    binding = entry.binding.name(),
                    "dispatching hotkey"
                );
                entry.binding.invoke();

                let _ = event_tx.send(ListenerEvent::HotkeyDispatched {
                    chord: entry.chord.canonical(),
                    binding: entry.binding.name().to_string(),
                });
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("hotkey event channel closed, stopping listener");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_listener() -> HotkeyListener {
        let registry = Arc::new(Mutex::new(HotkeyRegistry::new()));
        let (event_tx, _event_rx) = broadcast::channel(16);
        HotkeyListener::new(
            registry,
            event_tx,
            Duration::from_millis(100),
            Duration::from_secs(2),
        )
    }

    #[test]
    fn test_listener_creation() {
        let listener = create_listener();
        assert!(!listener.is_running());
    }

    #[test]
    fn test_stop_when_not_running_is_noop() {
        let listener = create_listener();
        listener.stop();
        assert!(!listener.is_running());
    }

    #[test]
    fn test_start_guards_against_double_start() {
        let listener = create_listener();
        listener.running.store(true, Ordering::SeqCst);

        assert!(matches!(
            listener.start(),
            Err(HotkeyError::AlreadyRunning)
        ));
        assert!(listener.is_running());
    }

    #[test]
    fn test_stop_clears_running_flag() {
        let listener = create_listener();
        listener.running.store(true, Ordering::SeqCst);
        listener.stop();
        assert!(!listener.is_running());
    }
}
