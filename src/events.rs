//! Listener lifecycle and dispatch events
//!
//! Observers subscribe through the facade and receive these over a
//! broadcast channel; the demo binary logs them as they arrive.

use serde::{Deserialize, Serialize};

/// Events emitted by the hotkey listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerEvent {
    /// The listener thread started and every chord is hooked
    ListenerEnabled,

    /// The listener thread stopped and all chords are unhooked
    ListenerDisabled,

    /// A chord matched and its callback was invoked
    HotkeyDispatched {
        /// Canonical chord string that fired
        chord: String,
        /// Name of the binding that was invoked
        binding: String,
    },
}

impl std::fmt::Display for ListenerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerEvent::ListenerEnabled => write!(f, "LISTENER_ENABLED"),
            ListenerEvent::ListenerDisabled => write!(f, "LISTENER_DISABLED"),
            ListenerEvent::HotkeyDispatched { chord, binding } => {
                write!(f, "HOTKEY_DISPATCHED ({chord} -> {binding})")
            }
        }
    }
}
