//! # Core sink trait
//!
//! `LogSink` is the extension point for routing diagnostic lines. Lines are
//! written synchronously from inside the guarded invocation, so sinks must be
//! cheap and must not block.

use std::sync::Arc;

/// Shared handle to a log sink.
pub type LogSinkRef = Arc<dyn LogSink>;

/// Contract for diagnostic line consumers.
pub trait LogSink: Send + Sync + 'static {
    /// Accepts one informational line.
    fn write(&self, line: &str);

    /// Accepts one warning line (cleanup and hook failures).
    ///
    /// Defaults to [`write`](LogSink::write).
    fn warn(&self, line: &str) {
        self.write(line);
    }

    /// Human-readable name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Function-backed sink: every line, warning or not, goes to the closure.
///
/// ```rust
/// use deadline_guard::{LogSink, LogSinkRef, SinkFn};
///
/// let sink: LogSinkRef = SinkFn::arc(|line: &str| eprintln!("guard: {line}"));
/// sink.write("[check] remaining=900ms margin=500ms");
/// ```
pub struct SinkFn<F> {
    f: F,
}

impl<F> SinkFn<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    /// Wraps a closure as a sink.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> LogSink for SinkFn<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn write(&self, line: &str) {
        (self.f)(line)
    }

    fn name(&self) -> &'static str {
        "SinkFn"
    }
}
