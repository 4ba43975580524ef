//! The facade bundling the logging context and the hotkey facility
//!
//! Construct once, reconfigure logging as needed, register bindings, then
//! enable the listener. Two bindings are present out of the box (unless
//! overwritten): ctrl+alt+d toggles debug logging and ctrl+alt+l logs the
//! current registry as pretty-printed JSON.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::events::ListenerEvent;
use crate::hotkey::{Binding, Chord, HotkeyError, HotkeyListener, HotkeyRegistry};
use crate::logging::{LogContext, LogError, LoggerOptions};

/// Chord of the built-in debug logging toggle
pub const DEBUG_TOGGLE_CHORD: &str = "ctrl+alt+d";
/// Chord of the built-in hotkey listing
pub const HOTKEY_LIST_CHORD: &str = "ctrl+alt+l";

/// Pre-configured logging plus global hotkey registration and listening
pub struct Essentials {
    log: LogContext,
    registry: Arc<Mutex<HotkeyRegistry>>,
    listener: HotkeyListener,
    event_tx: broadcast::Sender<ListenerEvent>,
}

impl Essentials {
    /// Build a facade with default configuration
    pub fn new() -> Result<Self, LogError> {
        Self::with_config(Config::default())
    }

    /// Build a facade from explicit configuration.
    ///
    /// Initialises the logging context (installing the console sink if this
    /// is the first context in the process) and seeds the registry with the
    /// built-in bindings.
    pub fn with_config(config: Config) -> Result<Self, LogError> {
        let log = LogContext::init(
            &config.logger_name,
            config.log_level,
            config.log_file.as_deref(),
        )?;

        let (event_tx, _) = broadcast::channel(64);
        let registry = Arc::new(Mutex::new(HotkeyRegistry::new()));

        {
            let mut bindings = registry.lock().expect("hotkey registry mutex poisoned");

            let toggle_log = log.clone();
            bindings.insert(
                Chord::parse(DEBUG_TOGGLE_CHORD).expect("built-in chord is valid"),
                Binding::new("toggle_debug_logging", move || {
                    if let Err(e) = toggle_log.toggle_debug() {
                        error!(error = %e, "failed to toggle debug logging");
                    }
                }),
            );

            let listing = Arc::clone(&registry);
            bindings.insert(
                Chord::parse(HOTKEY_LIST_CHORD).expect("built-in chord is valid"),
                Binding::new("display_hotkeys", move || {
                    let names = listing
                        .lock()
                        .expect("hotkey registry mutex poisoned")
                        .names();
                    match serde_json::to_string_pretty(&names) {
                        Ok(rendered) => info!("registered hotkeys:\n{rendered}"),
                        Err(e) => error!(error = %e, "failed to render hotkey listing"),
                    }
                }),
            );
        }

        let listener = HotkeyListener::new(
            Arc::clone(&registry),
            event_tx.clone(),
            config.poll_interval,
            config.shutdown_timeout,
        );

        Ok(Self {
            log,
            registry,
            listener,
            event_tx,
        })
    }

    /// Reconfigure the logging pipeline and return the context.
    ///
    /// A logfile differing from the attached one swaps the file sink; the
    /// same path is a no-op. A level reloads the global filter.
    pub fn get_logger(&self, options: LoggerOptions) -> Result<&LogContext, LogError> {
        if let Some(level) = options.level {
            self.log.set_level(level)?;
        }
        if let Some(path) = &options.logfile {
            self.log.attach_file(path)?;
        }
        Ok(&self.log)
    }

    /// The facade's logging context
    pub fn logger(&self) -> &LogContext {
        &self.log
    }

    /// Register a hotkey binding.
    ///
    /// Must be called before the listener is enabled: a registration while
    /// the listener runs is logged as an error and ignored, leaving the
    /// registry untouched. Re-registering a chord replaces the existing
    /// binding (last write wins, with a logged warning).
    pub fn register_hotkey(&self, chord: &str, binding: Binding) -> Result<(), HotkeyError> {
        if self.listener.is_running() {
            error!(chord, "cannot register hotkeys after the listener has been enabled");
            return Ok(());
        }

        let chord = Chord::parse(chord)?;
        self.lock_registry().insert(chord, binding);
        Ok(())
    }

    /// Enable the hotkey listener. No-op when already enabled.
    pub fn enable_hotkeys(&self) -> Result<(), HotkeyError> {
        if self.listener.is_running() {
            debug!("hotkey listener already enabled");
            return Ok(());
        }

        info!("enabling hotkey listener");
        match self.listener.start() {
            Err(HotkeyError::AlreadyRunning) => Ok(()),
            other => other,
        }
    }

    /// Disable the hotkey listener. No-op when already disabled.
    ///
    /// Unhooks every chord from the OS; the registry is retained, so a
    /// later enable reinstates all bindings including later additions.
    pub fn disable_hotkeys(&self) {
        if !self.listener.is_running() {
            debug!("hotkey listener already disabled");
            return;
        }

        info!("disabling hotkey listener");
        self.listener.stop();
    }

    /// Whether the listener is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.listener.is_running()
    }

    /// Chord -> binding-name listing of every registered hotkey
    pub fn get_hotkeys(&self) -> BTreeMap<String, String> {
        self.lock_registry().names()
    }

    /// Subscribe to listener lifecycle and dispatch events
    pub fn subscribe(&self) -> broadcast::Receiver<ListenerEvent> {
        self.event_tx.subscribe()
    }

    /// Disable the listener and flush the logging sinks
    pub fn shutdown(self) {
        self.teardown();
    }

    fn teardown(&self) {
        self.disable_hotkeys();
        self.log.flush();
    }

    fn lock_registry(&self) -> MutexGuard<'_, HotkeyRegistry> {
        self.registry
            .lock()
            .expect("hotkey registry mutex poisoned")
    }
}

impl Drop for Essentials {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "hotkey-essentials-facade-{}-{}.log",
            std::process::id(),
            tag
        ))
    }

    #[test]
    fn test_defaults_are_registered() {
        let essentials = Essentials::new().unwrap();
        let hotkeys = essentials.get_hotkeys();

        assert_eq!(hotkeys.len(), 2);
        assert_eq!(hotkeys[DEBUG_TOGGLE_CHORD], "toggle_debug_logging");
        assert_eq!(hotkeys[HOTKEY_LIST_CHORD], "display_hotkeys");
    }

    #[test]
    fn test_registered_chords_are_listed() {
        let essentials = Essentials::new().unwrap();
        essentials
            .register_hotkey("ctrl+shift+p", Binding::new("print_report", || {}))
            .unwrap();

        let hotkeys = essentials.get_hotkeys();
        assert_eq!(hotkeys.len(), 3);
        assert_eq!(hotkeys["ctrl+shift+p"], "print_report");
    }

    #[test]
    fn test_reregistration_replaces_binding() {
        let essentials = Essentials::new().unwrap();
        essentials
            .register_hotkey(DEBUG_TOGGLE_CHORD, Binding::new("custom_toggle", || {}))
            .unwrap();

        let hotkeys = essentials.get_hotkeys();
        assert_eq!(hotkeys.len(), 2);
        assert_eq!(hotkeys[DEBUG_TOGGLE_CHORD], "custom_toggle");
    }

    #[test]
    fn test_malformed_chord_is_rejected() {
        let essentials = Essentials::new().unwrap();
        let result = essentials.register_hotkey("ctrl+flurb", Binding::new("broken", || {}));
        assert!(matches!(result, Err(HotkeyError::Chord(_))));
        assert_eq!(essentials.get_hotkeys().len(), 2);
    }

    #[test]
    fn test_registration_after_enable_is_ignored() {
        let essentials = Essentials::new().unwrap();
        essentials.listener.running.store(true, Ordering::SeqCst);

        let result = essentials.register_hotkey("ctrl+shift+x", Binding::new("late", || {}));
        assert!(result.is_ok());
        assert_eq!(essentials.get_hotkeys().len(), 2);

        essentials.listener.running.store(false, Ordering::SeqCst);
    }

    #[test]
    fn test_enable_when_running_is_noop() {
        let essentials = Essentials::new().unwrap();
        essentials.listener.running.store(true, Ordering::SeqCst);

        assert!(essentials.enable_hotkeys().is_ok());
        assert!(essentials.is_enabled());

        essentials.listener.running.store(false, Ordering::SeqCst);
    }

    #[test]
    fn test_disable_before_enable_is_noop() {
        let essentials = Essentials::new().unwrap();
        assert!(!essentials.is_enabled());
        essentials.disable_hotkeys();
        assert!(!essentials.is_enabled());
    }

    #[test]
    fn test_subscribe_receives_listener_events() {
        let essentials = Essentials::new().unwrap();
        let mut rx = essentials.subscribe();

        essentials
            .event_tx
            .send(ListenerEvent::ListenerEnabled)
            .unwrap();

        let event = tokio_test::block_on(rx.recv()).unwrap();
        assert!(matches!(event, ListenerEvent::ListenerEnabled));
    }

    #[test]
    fn test_get_logger_swaps_logfile() {
        let first = temp_path("swap-a");
        let second = temp_path("swap-b");

        let essentials = Essentials::new().unwrap();
        essentials
            .get_logger(LoggerOptions::new().logfile(&first))
            .unwrap();
        assert_eq!(essentials.logger().logfile().as_deref(), Some(first.as_path()));

        essentials
            .get_logger(LoggerOptions::new().logfile(&second))
            .unwrap();
        assert_eq!(
            essentials.logger().logfile().as_deref(),
            Some(second.as_path())
        );

        let _ = std::fs::remove_file(&first);
        let _ = std::fs::remove_file(&second);
    }
}
