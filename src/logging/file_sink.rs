//! Swappable file sink for the logging pipeline
//!
//! The fmt layer holding this writer is installed once for the process
//! lifetime, so the sink swaps the underlying file instead: `None` discards
//! writes, `Some(file)` appends to the attached logfile.

use std::fs::File;
use std::io::{self, Write};
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

/// Shared handle to the (at most one) attached logfile
#[derive(Clone, Default)]
pub(crate) struct FileSink {
    file: Arc<Mutex<Option<File>>>,
}

impl FileSink {
    /// Swap the attached file, flushing and returning the old one
    pub(crate) fn replace(&self, file: Option<File>) -> Option<File> {
        let mut guard = self.lock();
        if let Some(old) = guard.as_mut() {
            let _ = old.flush();
        }
        mem::replace(&mut *guard, file)
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn flush(&self) {
        if let Some(file) = self.lock().as_mut() {
            let _ = file.flush();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().expect("file sink mutex poisoned")
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.lock().as_mut() {
            let _ = file.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.lock().as_mut() {
            file.flush()
        } else {
            Ok(())
        }
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
