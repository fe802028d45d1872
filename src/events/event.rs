//! # Events reported by the guard.
//!
//! Each variant renders as a single `[kind] key=value ...` line. Durations are
//! always printed in whole milliseconds so lines stay grep-friendly.
//!
//! ## Order within one invocation
//! ```text
//! MonitoringStarted → Check* → (task settles)             → CheckerStopped
//!                            → Imminent → CheckerStopped
//!                                       → Cleanup{Started, Finished|Failed}?
//!                                       → Handler{Started, Finished|Failed}
//! ```

use std::fmt;
use std::time::Duration;

/// Classification of guard diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    /// Guard built; effective settings.
    Initialized {
        margin: Duration,
        interval: Duration,
        cleanup: Duration,
        mode: &'static str,
    },

    /// Deadline checker started for one invocation.
    MonitoringStarted {
        interval: Duration,
        margin: Duration,
        mode: &'static str,
    },

    /// Periodic check (rate-limited outside the danger zone).
    Check { remaining: Duration, margin: Duration },

    /// Safety margin reached; shutdown sequence begins.
    Imminent { remaining: Duration, margin: Duration },

    /// Cleanup hook started with its budget.
    CleanupStarted { hook: String, budget: Duration },

    /// Cleanup hook finished within budget.
    CleanupFinished { hook: String },

    /// Cleanup hook failed, panicked, or overran (swallowed).
    CleanupFailed { hook: String, reason: String },

    /// Timeout hook started.
    HandlerStarted { hook: String },

    /// Timeout hook finished.
    HandlerFinished { hook: String },

    /// Timeout hook failed or panicked.
    HandlerFailed { hook: String, reason: String },

    /// Periodic timer released.
    CheckerStopped,
}

impl Event {
    /// Lines that report a failure go through [`LogSink::warn`](crate::LogSink::warn).
    pub(crate) fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::CleanupFailed { .. } | Event::HandlerFailed { .. }
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Initialized {
                margin,
                interval,
                cleanup,
                mode,
            } => write!(
                f,
                "[init] safety_margin={}ms check_interval={}ms cleanup_time={}ms mode={mode}",
                margin.as_millis(),
                interval.as_millis(),
                cleanup.as_millis(),
            ),
            Event::MonitoringStarted {
                interval,
                margin,
                mode,
            } => write!(
                f,
                "[monitoring] started interval={}ms margin={}ms mode={mode}",
                interval.as_millis(),
                margin.as_millis(),
            ),
            Event::Check { remaining, margin } => write!(
                f,
                "[check] remaining={}ms margin={}ms",
                remaining.as_millis(),
                margin.as_millis()
            ),
            Event::Imminent { remaining, margin } => write!(
                f,
                "[imminent] remaining={}ms margin={}ms",
                remaining.as_millis(),
                margin.as_millis()
            ),
            Event::CleanupStarted { hook, budget } => write!(
                f,
                "[cleanup] starting hook={hook:?} budget={}ms",
                budget.as_millis()
            ),
            Event::CleanupFinished { hook } => write!(f, "[cleanup] finished hook={hook:?}"),
            Event::CleanupFailed { hook, reason } => {
                write!(f, "[cleanup] failed hook={hook:?} err={reason:?}")
            }
            Event::HandlerStarted { hook } => write!(f, "[on-timeout] starting hook={hook:?}"),
            Event::HandlerFinished { hook } => write!(f, "[on-timeout] finished hook={hook:?}"),
            Event::HandlerFailed { hook, reason } => {
                write!(f, "[on-timeout] failed hook={hook:?} err={reason:?}")
            }
            Event::CheckerStopped => write!(f, "[checker] stopped"),
        }
    }
}
