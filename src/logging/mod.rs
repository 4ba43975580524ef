//! Logging context: console sink, optional file sink, reloadable level
//!
//! The tracing pipeline is installed once per process: a console fmt layer,
//! a file fmt layer writing through a swappable [`FileSink`], and a
//! reloadable `EnvFilter` seeded from `RUST_LOG` (default `info`). The
//! [`LogContext`] handle reconfigures the pipeline at runtime: attach or
//! swap the logfile, set the level, and toggle debug logging on and off.

mod file_sink;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use file_sink::FileSink;

/// Errors from logging reconfiguration
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to open logfile {path}: {source}")]
    OpenLogfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to update log level filter: {0}")]
    Reload(String),
}

/// Optional knobs for [`crate::Essentials::get_logger`]
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    /// Attach (or swap to) this logfile, opened in truncate mode
    pub logfile: Option<PathBuf>,
    /// Set the global level filter to this level
    pub level: Option<Level>,
}

impl LoggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.logfile = Some(path.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }
}

/// Reload handle and file sink for the once-installed pipeline
struct Pipeline {
    filter: reload::Handle<EnvFilter, Registry>,
    sink: FileSink,
}

static PIPELINE: OnceLock<Pipeline> = OnceLock::new();

/// Install the tracing pipeline on first use.
///
/// If the host application already installed a subscriber, `try_init`
/// backs off and level/file reconfiguration becomes a no-op against the
/// dormant layers.
fn pipeline() -> &'static Pipeline {
    PIPELINE.get_or_init(|| {
        let sink = FileSink::default();
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let (env_filter, filter) = reload::Layer::new(env_filter);

        let console = fmt::layer().with_target(false);
        let file = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(sink.clone());

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .with(file)
            .try_init();

        Pipeline { filter, sink }
    })
}

/// Per-level state the debug toggle transitions over
#[derive(Debug, Default)]
struct LevelMemory {
    /// Explicitly configured level; None means "as set by the environment"
    current: Option<Level>,
    /// Level remembered by the debug toggle, restored on the next toggle
    previous: Option<Level>,
    /// Path of the attached logfile, if any
    logfile: Option<PathBuf>,
}

/// Handle to the process-wide logging pipeline.
///
/// Cheap to clone; clones share the same level memory and file sink.
#[derive(Clone)]
pub struct LogContext {
    name: String,
    state: Arc<Mutex<LevelMemory>>,
}

impl LogContext {
    /// Build a context, installing the console sink if this is the first
    /// context in the process, then apply the initial level and logfile.
    pub(crate) fn init(
        name: impl Into<String>,
        level: Option<Level>,
        logfile: Option<&Path>,
    ) -> Result<Self, LogError> {
        pipeline();

        let context = Self {
            name: name.into(),
            state: Arc::new(Mutex::new(LevelMemory::default())),
        };
        if let Some(level) = level {
            context.set_level(level)?;
        }
        if let Some(path) = logfile {
            context.attach_file(path)?;
        }
        debug!(name = %context.name, "logging context initialised");
        Ok(context)
    }

    /// The context's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The effective level: explicitly configured, or INFO
    pub fn level(&self) -> Level {
        self.lock().current.unwrap_or(Level::INFO)
    }

    /// Path of the attached logfile, if any
    pub fn logfile(&self) -> Option<PathBuf> {
        self.lock().logfile.clone()
    }

    /// Set the global level filter
    pub fn set_level(&self, level: Level) -> Result<(), LogError> {
        apply_level(level)?;
        self.lock().current = Some(level);
        Ok(())
    }

    /// Two-state debug toggle.
    ///
    /// Not at DEBUG: remember the current level and switch to DEBUG. At
    /// DEBUG: restore the remembered level, falling back to INFO when
    /// nothing was recorded. Returns the level now in effect.
    pub fn toggle_debug(&self) -> Result<Level, LogError> {
        info!("toggling debug logging");

        let mut state = self.lock();
        let (next, remembered) = if state.current == Some(Level::DEBUG) {
            (state.previous.unwrap_or(Level::INFO), None)
        } else {
            (Level::DEBUG, Some(state.current.unwrap_or(Level::INFO)))
        };

        apply_level(next)?;
        state.current = Some(next);
        state.previous = remembered;
        Ok(next)
    }

    /// Attach a logfile, opened in truncate mode.
    ///
    /// Attaching the currently-attached path is a no-op. A different path
    /// detaches (and flushes) the old sink before the new one takes over;
    /// at most one file sink is active at a time.
    pub fn attach_file(&self, path: impl AsRef<Path>) -> Result<(), LogError> {
        let path = path.as_ref();
        let mut state = self.lock();

        if state.logfile.as_deref() == Some(path) {
            return Ok(());
        }

        let file = File::create(path).map_err(|source| LogError::OpenLogfile {
            path: path.to_path_buf(),
            source,
        })?;
        let previous = pipeline().sink.replace(Some(file));
        if previous.is_some() {
            debug!(path = %path.display(), "swapped logfile sink");
        } else {
            debug!(path = %path.display(), "attached logfile sink");
        }

        state.logfile = Some(path.to_path_buf());
        Ok(())
    }

    /// Detach the logfile sink, if one is attached
    pub fn detach_file(&self) {
        let mut state = self.lock();
        if state.logfile.take().is_some() {
            pipeline().sink.replace(None);
        }
    }

    /// Flush the file sink
    pub fn flush(&self) {
        pipeline().sink.flush();
    }

    fn lock(&self) -> MutexGuard<'_, LevelMemory> {
        self.state.lock().expect("log context mutex poisoned")
    }
}

/// Reload the global filter to a single-level directive
fn apply_level(level: Level) -> Result<(), LogError> {
    let directive = level.to_string().to_lowercase();
    pipeline()
        .filter
        .reload(EnvFilter::new(directive))
        .map_err(|e| LogError::Reload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "hotkey-essentials-log-{}-{}.log",
            std::process::id(),
            tag
        ))
    }

    #[test]
    fn test_toggle_restores_prior_level() {
        let context = LogContext::init("test", Some(Level::WARN), None).unwrap();
        assert_eq!(context.level(), Level::WARN);

        assert_eq!(context.toggle_debug().unwrap(), Level::DEBUG);
        assert_eq!(context.level(), Level::DEBUG);

        assert_eq!(context.toggle_debug().unwrap(), Level::WARN);
        assert_eq!(context.level(), Level::WARN);
    }

    #[test]
    fn test_toggle_from_default_round_trips_to_info() {
        let context = LogContext::init("test", None, None).unwrap();
        assert_eq!(context.level(), Level::INFO);

        assert_eq!(context.toggle_debug().unwrap(), Level::DEBUG);
        assert_eq!(context.toggle_debug().unwrap(), Level::INFO);
    }

    #[test]
    fn test_toggle_starting_at_debug_falls_back_to_info() {
        let context = LogContext::init("test", Some(Level::DEBUG), None).unwrap();
        assert_eq!(context.toggle_debug().unwrap(), Level::INFO);
    }

    #[test]
    fn test_attach_file_swaps_single_sink() {
        let first = temp_path("swap-a");
        let second = temp_path("swap-b");

        let context = LogContext::init("test", None, None).unwrap();
        context.attach_file(&first).unwrap();
        assert_eq!(context.logfile().as_deref(), Some(first.as_path()));

        // Same path again: idempotent
        context.attach_file(&first).unwrap();
        assert_eq!(context.logfile().as_deref(), Some(first.as_path()));

        context.attach_file(&second).unwrap();
        assert_eq!(context.logfile().as_deref(), Some(second.as_path()));
        assert!(first.exists());
        assert!(second.exists());

        context.detach_file();
        assert!(context.logfile().is_none());
        let _ = fs::remove_file(&first);
        let _ = fs::remove_file(&second);
    }
}
