//! # Remaining-time sources.
//!
//! The guard never owns a wall clock of its own. It asks a [`RemainingTime`]
//! source how long is left before the host forcibly terminates the
//! invocation, or (in fallback mode) reads it once and counts down locally.
//!
//! - [`RemainingTime`] - trait implemented by every source
//! - [`RemainingTimeFn`] - closure-backed source
//! - [`RemainingTimeRef`] - shared handle (`Arc<dyn RemainingTime>`)
//! - [`FixedRemaining`] - constant value (local runs, tests)
//! - [`WallClockDeadline`] - absolute deadline, e.g. an epoch-millisecond deadline reported by the host

mod deadline;
mod source;

pub use deadline::WallClockDeadline;
pub use source::{FixedRemaining, RemainingTime, RemainingTimeFn, RemainingTimeRef};
