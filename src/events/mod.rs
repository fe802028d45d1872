//! Diagnostic events and their delivery to the configured sink.
//!
//! - [`Event`] - everything the guard reports, rendered as one line each
//! - [`Reporter`] - renders events and routes them to a [`LogSink`](crate::LogSink)

mod event;
mod reporter;

pub(crate) use event::Event;
pub(crate) use reporter::Reporter;
