//! # Remaining-time source abstraction and function-backed implementation.
//!
//! [`RemainingTime`] is the only interface the guard consumes from the host
//! environment. Implementations must be cheap and side-effect free: in live
//! mode the source is queried on every check.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use deadline_guard::{BoxError, RemainingTime, RemainingTimeFn, RemainingTimeRef};
//!
//! let src: RemainingTimeRef = RemainingTimeFn::arc(|| Ok::<_, BoxError>(Duration::from_secs(30)));
//! assert_eq!(src.remaining().unwrap(), Duration::from_secs(30));
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::BoxError;

/// Shared handle to a remaining-time source.
pub type RemainingTimeRef = Arc<dyn RemainingTime>;

/// # Reports time left until forced termination.
///
/// An `Err` is treated as an unexpected failure of the invocation, never as a
/// timeout.
pub trait RemainingTime: Send + Sync + 'static {
    /// Time remaining before the host terminates the invocation.
    fn remaining(&self) -> Result<Duration, BoxError>;
}

/// Function-backed remaining-time source.
pub struct RemainingTimeFn<F> {
    f: F,
}

impl<F> RemainingTimeFn<F>
where
    F: Fn() -> Result<Duration, BoxError> + Send + Sync + 'static,
{
    /// Wraps a closure as a source.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> RemainingTime for RemainingTimeFn<F>
where
    F: Fn() -> Result<Duration, BoxError> + Send + Sync + 'static,
{
    fn remaining(&self) -> Result<Duration, BoxError> {
        (self.f)()
    }
}

impl<F> std::fmt::Debug for RemainingTimeFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemainingTimeFn").finish_non_exhaustive()
    }
}

/// Source that always reports the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedRemaining(pub Duration);

impl RemainingTime for FixedRemaining {
    fn remaining(&self) -> Result<Duration, BoxError> {
        Ok(self.0)
    }
}
