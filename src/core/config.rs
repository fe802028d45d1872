//! # Guard configuration.
//!
//! Provides [`GuardConfig`], the timing settings of a [`DeadlineGuard`](crate::DeadlineGuard).
//!
//! The remaining-time source and the log sink are not plain data and are
//! attached through [`GuardBuilder`](crate::GuardBuilder) instead.
//!
//! ## Validation
//! Every duration must be greater than zero. The check is deferred to
//! invocation time: a guard built from an invalid config still constructs,
//! and each [`Invocation::run`](crate::Invocation::run) fails fast with
//! [`ConfigError::ZeroDuration`] before any timer is started.

use std::time::Duration;

use crate::error::ConfigError;

/// Remaining time at or below `safety_margin × DANGER_ZONE_FACTOR` is logged on every check.
pub const DANGER_ZONE_FACTOR: u32 = 3;

/// Timing settings for the deadline guard.
///
/// ## Field semantics
/// - `safety_margin`: shutdown starts once remaining time is at or below this value
/// - `check_interval`: cadence of deadline polling (first check is immediate)
/// - `cleanup_time`: budget granted to the cleanup hook before it is abandoned
/// - `use_fallback_stopwatch`: derive remaining time from elapsed time since start
///
/// ## Notes
/// `cleanup_time` is not tied to `safety_margin`. Pick a margin wide enough to
/// cover both the cleanup budget and the timeout hook's own run time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardConfig {
    /// Remaining-time threshold that triggers shutdown.
    pub safety_margin: Duration,

    /// Interval between deadline checks.
    pub check_interval: Duration,

    /// Time budget for the cleanup hook.
    pub cleanup_time: Duration,

    /// Read the source once at invocation start and count down locally.
    ///
    /// - `false` = query the source on every check (live mode)
    /// - `true`  = `initial - elapsed`, where `initial` is read once
    pub use_fallback_stopwatch: bool,
}

impl GuardConfig {
    /// Upper bound of the "danger zone" in which every check is logged.
    #[inline]
    pub fn danger_zone(&self) -> Duration {
        self.safety_margin.saturating_mul(DANGER_ZONE_FACTOR)
    }

    /// Short name of the countdown mode, used in log lines.
    #[inline]
    pub fn mode_label(&self) -> &'static str {
        if self.use_fallback_stopwatch {
            "fallback"
        } else {
            "live"
        }
    }

    /// Checks that every duration is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("safety_margin", self.safety_margin),
            ("check_interval", self.check_interval),
            ("cleanup_time", self.cleanup_time),
        ];
        match fields.iter().find(|(_, d)| d.is_zero()) {
            Some(&(field, _)) => Err(ConfigError::ZeroDuration { field }),
            None => Ok(()),
        }
    }
}

impl Default for GuardConfig {
    /// Default configuration:
    ///
    /// - `safety_margin = 5s`
    /// - `check_interval = 1s`
    /// - `cleanup_time = 3s`
    /// - `use_fallback_stopwatch = false` (live source)
    fn default() -> Self {
        Self {
            safety_margin: Duration::from_millis(5000),
            check_interval: Duration::from_millis(1000),
            cleanup_time: Duration::from_millis(3000),
            use_fallback_stopwatch: false,
        }
    }
}
