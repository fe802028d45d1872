//! # Invocation states.
//!
//! ```text
//! Running ──► Completed
//!    │
//!    ├──────► ShuttingDown ──► TimedOut
//!    │                    └──► TimedOutWithHandlerError
//!    └──────► CheckError
//! ```

use std::fmt;

/// Where a single guarded invocation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationState {
    /// Task and deadline checker are racing.
    Running,
    /// The task settled first (with a value or its own error).
    Completed,
    /// The margin was breached; cleanup and timeout hooks are running.
    ShuttingDown,
    /// Timed out; the timeout hook succeeded.
    TimedOut,
    /// Timed out; the timeout hook failed too.
    TimedOutWithHandlerError,
    /// Computing the remaining time failed.
    CheckError,
}

impl InvocationState {
    /// True for states an invocation never leaves.
    pub fn is_terminal(self) -> bool {
        !matches!(self, InvocationState::Running | InvocationState::ShuttingDown)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            InvocationState::Running => "running",
            InvocationState::Completed => "completed",
            InvocationState::ShuttingDown => "shutting_down",
            InvocationState::TimedOut => "timed_out",
            InvocationState::TimedOutWithHandlerError => "timed_out_with_handler_error",
            InvocationState::CheckError => "check_error",
        }
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
