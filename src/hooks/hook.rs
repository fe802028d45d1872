//! # Hook abstraction.
//!
//! A [`Hook`] is an async callable with a stable name. The guard invokes the
//! cleanup hook and the timeout hook at most once per invocation, and only
//! when the deadline becomes imminent.
//!
//! Hook failures never escape as panics: the shutdown sequence catches
//! unwinding and reports it as [`HookError::Panicked`](crate::HookError::Panicked).

use async_trait::async_trait;

use crate::error::BoxError;

/// # Named asynchronous hook.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use deadline_guard::{BoxError, Hook};
///
/// struct FlushMetrics;
///
/// #[async_trait]
/// impl Hook for FlushMetrics {
///     fn name(&self) -> &str { "flush-metrics" }
///
///     async fn call(&self) -> Result<(), BoxError> {
///         // push buffered metrics...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Hook: Send + Sync + 'static {
    /// Returns a stable, human-readable hook name (used in log lines).
    fn name(&self) -> &str;

    /// Runs the hook once.
    async fn call(&self) -> Result<(), BoxError>;
}
