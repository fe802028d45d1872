//! # Deadline checker.
//!
//! Polls the remaining time on a fixed cadence and reports a [`Breach`] once it
//! drops to or below the safety margin.
//!
//! ## Flow
//! ```text
//! tick (first one immediate)
//!   ├─► countdown.remaining()
//!   │      └─ Err ──► release timer, return Err (check error, not a timeout)
//!   ├─► CheckState::step(remaining)
//!   │      ├─ log?     → [check] line (every tick in danger zone, else every 10th)
//!   │      └─ breach?  → release timer, [imminent] line, return Ok(Breach)
//!   └─► wait for next tick
//! ```
//!
//! ## Rules
//! - The timer is owned by [`CheckerHandle`]; release is idempotent and also
//!   runs on `Drop`, so no exit path can leave it ticking.
//! - The log counter lives in [`CheckState`] and is passed explicitly to each step.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::{
    clock::RemainingTimeRef,
    core::config::GuardConfig,
    error::BoxError,
    events::{Event, Reporter},
};

/// Outside the danger zone, only every `LOG_EVERY`-th check is logged.
const LOG_EVERY: u8 = 10;

/// How remaining time is computed for one invocation.
pub(crate) enum Countdown {
    /// Query the source on every check.
    Live(RemainingTimeRef),
    /// `initial - (now - started)`, with `initial` read once.
    Fallback { started: Instant, initial: Duration },
}

impl Countdown {
    /// Builds the countdown for one invocation.
    ///
    /// In fallback mode this captures the start instant and reads the source
    /// exactly once.
    pub(crate) fn start(source: &RemainingTimeRef, fallback: bool) -> Result<Self, BoxError> {
        if !fallback {
            return Ok(Countdown::Live(source.clone()));
        }
        let started = Instant::now();
        let initial = source.remaining()?;
        Ok(Countdown::Fallback { started, initial })
    }

    pub(crate) fn remaining(&self) -> Result<Duration, BoxError> {
        match self {
            Countdown::Live(source) => source.remaining(),
            Countdown::Fallback { started, initial } => {
                Ok(initial.saturating_sub(started.elapsed()))
            }
        }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub(crate) log: bool,
    pub(crate) breached: bool,
}

/// Per-invocation check counter.
#[derive(Debug, Default)]
pub(crate) struct CheckState {
    count: u8,
}

impl CheckState {
    pub(crate) fn step(&mut self, remaining: Duration, cfg: &GuardConfig) -> Step {
        self.count = (self.count + 1) % LOG_EVERY;
        Step {
            log: remaining <= cfg.danger_zone() || self.count == 0,
            breached: remaining <= cfg.safety_margin,
        }
    }
}

/// The triggering observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Breach {
    pub(crate) remaining: Duration,
    pub(crate) margin: Duration,
}

/// Exclusive owner of the periodic timer.
pub(crate) struct CheckerHandle {
    interval: Option<Interval>,
    reporter: Reporter,
}

impl CheckerHandle {
    /// Starts the timer; the first tick completes immediately.
    pub(crate) fn start(cfg: &GuardConfig, reporter: Reporter) -> Self {
        let mut interval = time::interval(cfg.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        reporter.emit(Event::MonitoringStarted {
            interval: cfg.check_interval,
            margin: cfg.safety_margin,
            mode: cfg.mode_label(),
        });
        Self {
            interval: Some(interval),
            reporter,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Waits for the next tick. Never completes once released.
    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    /// Stops the timer. No-op if already released.
    pub(crate) fn release(&mut self) {
        if self.interval.take().is_some() {
            self.reporter.emit(Event::CheckerStopped);
        }
    }
}

impl Drop for CheckerHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Runs checks until the margin is breached or the countdown fails.
///
/// Does not complete otherwise; the race controller drops it when the task wins.
pub(crate) async fn watch(
    handle: &mut CheckerHandle,
    countdown: &Countdown,
    cfg: &GuardConfig,
    reporter: &Reporter,
) -> Result<Breach, BoxError> {
    let mut state = CheckState::default();
    loop {
        handle.tick().await;

        let remaining = match countdown.remaining() {
            Ok(r) => r,
            Err(e) => {
                handle.release();
                return Err(e);
            }
        };

        let step = state.step(remaining, cfg);
        if step.log {
            reporter.emit(Event::Check {
                remaining,
                margin: cfg.safety_margin,
            });
        }
        if step.breached {
            handle.release();
            reporter.emit(Event::Imminent {
                remaining,
                margin: cfg.safety_margin,
            });
            return Ok(Breach {
                remaining,
                margin: cfg.safety_margin,
            });
        }
    }
}
