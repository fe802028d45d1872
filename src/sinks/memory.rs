//! # MemorySink: in-memory line recorder
//!
//! Keeps every line it receives, in order. Useful in tests and for dumping the
//! guard's trail after a failed invocation.

use std::sync::{Mutex, MutexGuard};

use super::LogSink;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    warning: bool,
    line: String,
}

/// Records lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Entry>>,
}

impl MemorySink {
    /// Construct an empty [`MemorySink`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        // A panicking writer cannot leave a half-pushed entry behind.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Every recorded line, in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.entries().iter().map(|e| e.line.clone()).collect()
    }

    /// Only the lines recorded through [`LogSink::warn`].
    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|e| e.warning)
            .map(|e| e.line.clone())
            .collect()
    }

    /// Number of lines starting with `prefix` (e.g. `"[check]"`).
    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.line.starts_with(prefix))
            .count()
    }

    /// True if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.line.contains(needle))
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drops every recorded line.
    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, line: &str) {
        self.entries().push(Entry {
            warning: false,
            line: line.to_owned(),
        });
    }

    fn warn(&self, line: &str) {
        self.entries().push(Entry {
            warning: true,
            line: line.to_owned(),
        });
    }

    fn name(&self) -> &'static str {
        "MemorySink"
    }
}
