//! hotkey-essentials: reusable logging and global hotkey plumbing
//!
//! This crate bundles two concerns most desktop tools re-implement:
//! - a pre-configured logging context: console sink, optional single file
//!   sink (swappable at runtime), reloadable level filter, and a hotkey-
//!   driven debug toggle
//! - a global hotkey facility: a registry of chord -> callback bindings and
//!   a background listener that dispatches them until disabled
//!
//! ```no_run
//! use hotkey_essentials::{Binding, Essentials, LoggerOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let essentials = Essentials::new()?;
//! essentials.get_logger(LoggerOptions::new().logfile("app.log"))?;
//! essentials.register_hotkey("ctrl+shift+p", Binding::new("print_report", || {
//!     tracing::info!("report requested");
//! }))?;
//! essentials.enable_hotkeys()?;
//! // ... run the application ...
//! essentials.disable_hotkeys();
//! # Ok(())
//! # }
//! ```

pub mod config;
mod essentials;
pub mod events;
pub mod hotkey;
pub mod lifecycle;
pub mod logging;

pub use config::Config;
pub use essentials::{Essentials, DEBUG_TOGGLE_CHORD, HOTKEY_LIST_CHORD};
pub use events::ListenerEvent;
pub use hotkey::{Binding, Callback, Chord, ChordError, HotkeyError, HotkeyRegistry};
pub use lifecycle::ShutdownSignal;
pub use logging::{LogContext, LogError, LoggerOptions};
