//! # ConsoleSink: default line printer
//!
//! Informational lines go to stdout, warnings to stderr, each prefixed with
//! the crate tag.

use super::LogSink;

/// Prints lines to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Construct a new [`ConsoleSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for ConsoleSink {
    fn write(&self, line: &str) {
        println!("[deadline-guard] {line}");
    }

    fn warn(&self, line: &str) {
        eprintln!("[deadline-guard] {line}");
    }

    fn name(&self) -> &'static str {
        "ConsoleSink"
    }
}
