//! # Log sinks for guard diagnostics.
//!
//! The guard reports its progress as single human-readable lines. A
//! [`LogSink`] decides where those lines go.
//!
//! ## Line format
//! ```text
//! [init] safety_margin=5000ms check_interval=1000ms cleanup_time=3000ms mode=live
//! [monitoring] started interval=1000ms margin=5000ms mode=live
//! [check] remaining=4200ms margin=5000ms
//! [imminent] remaining=4200ms margin=5000ms
//! [cleanup] starting hook="close-db" budget=3000ms
//! [cleanup] failed hook="close-db" err="did not finish within 3s"
//! [on-timeout] starting hook="notify"
//! [on-timeout] finished hook="notify"
//! [checker] stopped
//! ```
//!
//! ## Built-in sinks
//! - [`ConsoleSink`] - stdout/stderr (default)
//! - [`TracingSink`] - forwards to `tracing` events
//! - [`MemorySink`] - keeps lines in memory (tests, post-mortem dumps)
//! - [`SinkFn`] - wraps a closure

mod console;
mod memory;
mod sink;
mod trace;

pub use console::ConsoleSink;
pub use memory::MemorySink;
pub use sink::{LogSink, LogSinkRef, SinkFn};
pub use trace::TracingSink;
