//! Error types produced by a guarded invocation.
//!
//! - [`GuardError`]: the outcome of a failed [`Invocation::run`](crate::Invocation::run).
//! - [`ConfigError`]: invalid configuration, detected before any timer is set up.
//! - [`HookError`]: failure of a cleanup or timeout hook.
//!
//! Each enum exposes `as_label` for logs; [`GuardError`] also has a short
//! human-readable `as_message`.

use std::time::Duration;
use thiserror::Error;

use crate::core::InvocationState;

/// Boxed error used at the seams with caller code (sources and hooks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Invalid configuration.
///
/// Always raised at invocation start, before racing begins. Never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No remaining-time source was attached to the guard.
    #[error("remaining-time source is not configured")]
    MissingRemainingTime,

    /// The invocation was started without a timeout hook.
    #[error("timeout handler is required")]
    MissingTimeoutHandler,

    /// A duration setting was zero.
    #[error("`{field}` must be greater than zero")]
    ZeroDuration {
        /// Name of the offending [`GuardConfig`](crate::GuardConfig) field.
        field: &'static str,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingRemainingTime => "config_missing_remaining_time",
            ConfigError::MissingTimeoutHandler => "config_missing_timeout_handler",
            ConfigError::ZeroDuration { .. } => "config_zero_duration",
        }
    }
}

/// # Failure of a cleanup or timeout hook.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HookError {
    /// The hook returned an error.
    #[error(transparent)]
    Failed(BoxError),

    /// The hook panicked; carries the panic message.
    #[error("panicked: {0}")]
    Panicked(String),

    /// The hook did not finish within its budget (cleanup only).
    #[error("did not finish within {budget:?}")]
    Elapsed {
        /// The budget that was exceeded.
        budget: Duration,
    },
}

impl HookError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HookError::Failed(_) => "hook_failed",
            HookError::Panicked(_) => "hook_panicked",
            HookError::Elapsed { .. } => "hook_elapsed",
        }
    }
}

/// # Errors produced by a guarded invocation.
///
/// `E` is the task's own error type; it is returned untouched in
/// [`GuardError::Task`].
///
/// Use [`GuardError::is_timeout`] to tell a deadline-driven termination apart
/// from an application error, and [`GuardError::handler_error`] to see whether
/// the timeout hook itself failed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GuardError<E> {
    /// Invalid configuration; nothing was started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The task failed on its own.
    #[error("{0}")]
    Task(E),

    /// Computing the remaining time failed.
    #[error("remaining-time check failed: {0}")]
    Check(#[source] BoxError),

    /// The safety margin was reached before the task settled.
    #[error("deadline imminent: remaining {remaining:?} <= margin {margin:?}")]
    Timeout {
        /// Remaining time observed by the triggering check.
        remaining: Duration,
        /// Configured safety margin.
        margin: Duration,
        /// Set when the timeout hook itself failed.
        #[source]
        handler_error: Option<HookError>,
    },

    /// The runtime cancelled the task before it settled.
    #[error("task was aborted by the runtime")]
    TaskAborted,
}

impl<E> GuardError<E> {
    /// True for deadline-driven terminations, whether or not the timeout hook failed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GuardError::Timeout { .. })
    }

    /// The timeout hook's failure, if the invocation timed out and the hook failed.
    pub fn handler_error(&self) -> Option<&HookError> {
        match self {
            GuardError::Timeout { handler_error, .. } => handler_error.as_ref(),
            _ => None,
        }
    }

    /// The task's own error, if that is what ended the invocation.
    pub fn task_error(&self) -> Option<&E> {
        match self {
            GuardError::Task(e) => Some(e),
            _ => None,
        }
    }

    /// Consumes the error and returns the task's own error, if any.
    pub fn into_task_error(self) -> Result<E, Self> {
        match self {
            GuardError::Task(e) => Ok(e),
            other => Err(other),
        }
    }

    /// Terminal state the invocation ended in.
    ///
    /// `None` for configuration errors (the invocation never ran) and for
    /// runtime aborts.
    pub fn state(&self) -> Option<InvocationState> {
        match self {
            GuardError::Config(_) | GuardError::TaskAborted => None,
            GuardError::Task(_) => Some(InvocationState::Completed),
            GuardError::Check(_) => Some(InvocationState::CheckError),
            GuardError::Timeout {
                handler_error: None,
                ..
            } => Some(InvocationState::TimedOut),
            GuardError::Timeout {
                handler_error: Some(_),
                ..
            } => Some(InvocationState::TimedOutWithHandlerError),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use deadline_guard::GuardError;
    ///
    /// let err: GuardError<()> = GuardError::Timeout {
    ///     remaining: Duration::from_millis(50),
    ///     margin: Duration::from_millis(100),
    ///     handler_error: None,
    /// };
    /// assert_eq!(err.as_label(), "deadline_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GuardError::Config(_) => "config_invalid",
            GuardError::Task(_) => "task_failed",
            GuardError::Check(_) => "check_failed",
            GuardError::Timeout {
                handler_error: None,
                ..
            } => "deadline_timeout",
            GuardError::Timeout {
                handler_error: Some(_),
                ..
            } => "deadline_timeout_handler_failed",
            GuardError::TaskAborted => "task_aborted",
        }
    }
}

impl<E: std::fmt::Display> GuardError<E> {
    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            GuardError::Config(e) => format!("config: {e}"),
            GuardError::Task(e) => format!("task: {e}"),
            GuardError::Check(e) => format!("check: {e}"),
            GuardError::Timeout {
                remaining,
                margin,
                handler_error,
            } => match handler_error {
                None => format!("timeout: remaining={remaining:?} margin={margin:?}"),
                Some(h) => format!(
                    "timeout: remaining={remaining:?} margin={margin:?} handler_error={h}"
                ),
            },
            GuardError::TaskAborted => "task aborted".to_string(),
        }
    }
}
