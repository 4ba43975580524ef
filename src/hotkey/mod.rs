//! Hotkey module: chord grammar, binding registry, and the global listener
//!
//! Chords are parsed and validated at registration time; the listener hooks
//! them with the OS through the global-hotkey backend and dispatches
//! callbacks from a dedicated thread.

mod keys;
mod listener;
mod registry;

pub use keys::{Chord, ChordError};
pub use listener::{HotkeyError, HotkeyListener};
pub use registry::{Binding, Callback, HotkeyRegistry};
