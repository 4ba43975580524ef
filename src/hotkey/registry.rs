//! Hotkey binding registry
//!
//! Maps canonical chord strings to callbacks. The registry outlives the
//! listener: disabling the listener unhooks chords from the OS but keeps
//! every entry here, so re-enabling restores all bindings.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use super::keys::Chord;

/// Callback invoked when a chord fires. Runs on the listener thread.
pub type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

/// A named callback plus its trigger options.
///
/// The name stands in for the callback identity in listings; anything the
/// callback needs at invocation time is captured by the closure.
#[derive(Clone)]
pub struct Binding {
    name: String,
    action: Callback,
    on_release: bool,
}

impl Binding {
    /// Create a binding that fires on key press
    pub fn new(name: impl Into<String>, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            action: Arc::new(action),
            on_release: false,
        }
    }

    /// Fire on key release instead of press
    pub fn on_release(mut self) -> Self {
        self.on_release = true;
        self
    }

    /// The binding's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the binding fires on release rather than press
    pub fn triggers_on_release(&self) -> bool {
        self.on_release
    }

    pub(crate) fn invoke(&self) {
        (self.action)();
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("on_release", &self.on_release)
            .finish()
    }
}

/// A registered entry: the parsed chord plus its binding
#[derive(Debug, Clone)]
pub(crate) struct RegisteredHotkey {
    pub(crate) chord: Chord,
    pub(crate) binding: Binding,
}

/// Registry of chord -> binding, keyed by canonical chord string.
///
/// Canonical keys make uniqueness alias-insensitive: registering
/// "option+control+d" replaces an existing "ctrl+alt+d" entry.
#[derive(Debug, Default)]
pub struct HotkeyRegistry {
    bindings: BTreeMap<String, RegisteredHotkey>,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding, replacing any existing entry for the same chord.
    ///
    /// Replacement is last-write-wins and logs a warning; every insert logs
    /// the chord and binding name.
    pub fn insert(&mut self, chord: Chord, binding: Binding) -> Option<Binding> {
        let key = chord.canonical();
        let name = binding.name().to_string();
        let replaced = self
            .bindings
            .insert(key.clone(), RegisteredHotkey { chord, binding })
            .map(|entry| entry.binding);

        if let Some(old) = &replaced {
            warn!(chord = %key, old = old.name(), "replacing existing hotkey binding");
        }
        info!(chord = %key, binding = %name, "registered hotkey");

        replaced
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn contains(&self, chord: &Chord) -> bool {
        self.bindings.contains_key(&chord.canonical())
    }

    /// Chord -> binding-name listing, deterministically ordered
    pub fn names(&self) -> BTreeMap<String, String> {
        self.bindings
            .iter()
            .map(|(chord, entry)| (chord.clone(), entry.binding.name().to_string()))
            .collect()
    }

    /// Clone out every entry for the listener to hook
    pub(crate) fn snapshot(&self) -> Vec<RegisteredHotkey> {
        self.bindings.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(s: &str) -> Chord {
        Chord::parse(s).unwrap()
    }

    #[test]
    fn test_insert_and_list() {
        let mut registry = HotkeyRegistry::new();
        assert!(registry.is_empty());

        registry.insert(chord("ctrl+alt+d"), Binding::new("toggle_debug", || {}));
        registry.insert(chord("ctrl+shift+p"), Binding::new("print_report", || {}));

        let names = registry.names();
        assert_eq!(names.len(), 2);
        assert_eq!(names["ctrl+alt+d"], "toggle_debug");
        assert_eq!(names["ctrl+shift+p"], "print_report");
        assert!(registry.contains(&chord("ctrl+alt+d")));
        assert!(!registry.contains(&chord("ctrl+alt+x")));
    }

    #[test]
    fn test_on_release_flag() {
        let press = Binding::new("press", || {});
        let release = Binding::new("release", || {}).on_release();
        assert!(!press.triggers_on_release());
        assert!(release.triggers_on_release());
    }

    #[test]
    fn test_replace_is_last_write_wins() {
        let mut registry = HotkeyRegistry::new();
        registry.insert(chord("ctrl+alt+d"), Binding::new("first", || {}));
        let replaced = registry.insert(chord("ctrl+alt+d"), Binding::new("second", || {}));

        assert_eq!(replaced.unwrap().name(), "first");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names()["ctrl+alt+d"], "second");
    }

    #[test]
    fn test_replace_matches_through_aliases() {
        let mut registry = HotkeyRegistry::new();
        registry.insert(chord("ctrl+alt+d"), Binding::new("first", || {}));
        registry.insert(chord("option+control+d"), Binding::new("second", || {}));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names()["ctrl+alt+d"], "second");
    }

    #[test]
    fn test_snapshot_carries_invocable_bindings() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let count = Arc::new(AtomicUsize::new(0));
        let count_in_binding = Arc::clone(&count);

        let mut registry = HotkeyRegistry::new();
        registry.insert(
            chord("ctrl+alt+k"),
            Binding::new("bump", move || {
                count_in_binding.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        snapshot[0].binding.invoke();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
