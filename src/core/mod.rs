//! Runtime core: the deadline race and its shutdown sequence.
//!
//! The public API from this module is [`DeadlineGuard`] plus its builder,
//! configuration, and state types.
//!
//! Internal modules:
//! - [`checker`]: periodic remaining-time checks and the timer handle;
//! - [`race`]: runs one task against the checker and maps the winner;
//! - [`shutdown`]: cleanup and timeout hooks after a breach;
//! - [`guard`]: the reusable guard and per-call [`Invocation`].

mod builder;
mod checker;
mod config;
mod guard;
mod race;
mod shutdown;
mod state;

pub use builder::GuardBuilder;
pub use config::{GuardConfig, DANGER_ZONE_FACTOR};
pub use guard::{DeadlineGuard, Invocation};
pub use state::InvocationState;
