//! Test-only helpers shared across unit and integration tests.
//!
//! Compiled for unit tests and under the `test-util` feature so integration
//! tests can inject the collecting sink through the public builder.

use crate::diagnostics::Diagnostics;
use crate::level::Level;
use parking_lot::Mutex;
use std::sync::Arc;

/// Diagnostic sink that stores every message it receives for later
/// inspection.
#[derive(Clone, Default)]
pub struct CollectingDiagnostics {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CollectingDiagnostics {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry received so far.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().clone()
    }

    /// Messages received at debug severity.
    pub fn debugs(&self) -> Vec<String> {
        self.messages_at(Level::Debug)
    }

    /// Messages received at warning severity.
    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(Level::Warn)
    }

    /// Messages received at error severity.
    pub fn errors(&self) -> Vec<String> {
        self.messages_at(Level::Error)
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn debug(&self, message: &str) {
        self.entries.lock().push((Level::Debug, message.to_owned()));
    }

    fn warn(&self, message: &str) {
        self.entries.lock().push((Level::Warn, message.to_owned()));
    }

    fn error(&self, message: &str) {
        self.entries.lock().push((Level::Error, message.to_owned()));
    }
}
