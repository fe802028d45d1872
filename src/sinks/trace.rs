//! # TracingSink: forward lines to `tracing`
//!
//! Emits each line as a `tracing` event under the `deadline_guard` target:
//! informational lines at `INFO`, warnings at `WARN`. Install any subscriber
//! (e.g. `tracing-subscriber`'s `fmt`) to collect them.

use super::LogSink;

/// Sink backed by the `tracing` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    /// Construct a new [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn write(&self, line: &str) {
        tracing::info!(target: "deadline_guard", "{line}");
    }

    fn warn(&self, line: &str) {
        tracing::warn!(target: "deadline_guard", "{line}");
    }

    fn name(&self) -> &'static str {
        "TracingSink"
    }
}
