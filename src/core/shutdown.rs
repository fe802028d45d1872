//! # Shutdown sequence.
//!
//! Runs once the deadline checker reports a [`Breach`]:
//!
//! ```text
//! 1. cleanup hook (optional), raced against cfg.cleanup_time
//!      ├─ Ok                    → [cleanup] finished
//!      └─ Err / panic / overrun → [cleanup] failed (warn), continue
//! 2. timeout hook (always, unbounded)
//!      ├─ Ok           → [on-timeout] finished → GuardError::Timeout { handler_error: None }
//!      └─ Err / panic  → [on-timeout] failed   → GuardError::Timeout { handler_error: Some(e) }
//! ```
//!
//! ## Rules
//! - Cleanup finishes (or is abandoned) strictly before the timeout hook starts.
//! - Cleanup failure is swallowed; it never changes the outcome.
//! - The sequence always ends in a failure.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::{
    core::{checker::Breach, config::GuardConfig},
    error::{GuardError, HookError},
    events::{Event, Reporter},
    hooks::Hook,
};

/// Runs cleanup then the timeout hook and builds the final timeout failure.
pub(crate) async fn run<E>(
    breach: Breach,
    cleanup: Option<&dyn Hook>,
    on_timeout: &dyn Hook,
    cfg: &GuardConfig,
    reporter: &Reporter,
) -> GuardError<E> {
    if let Some(hook) = cleanup {
        run_cleanup(hook, cfg.cleanup_time, reporter).await;
    }
    let handler_error = run_timeout_hook(on_timeout, reporter).await.err();

    GuardError::Timeout {
        remaining: breach.remaining,
        margin: breach.margin,
        handler_error,
    }
}

/// Stage 1: every outcome maps to "continue".
async fn run_cleanup(hook: &dyn Hook, budget: Duration, reporter: &Reporter) {
    reporter.emit(Event::CleanupStarted {
        hook: hook.name().to_owned(),
        budget,
    });

    let res = match time::timeout(budget, call_isolated(hook)).await {
        Ok(res) => res,
        Err(_elapsed) => Err(HookError::Elapsed { budget }),
    };

    match res {
        Ok(()) => reporter.emit(Event::CleanupFinished {
            hook: hook.name().to_owned(),
        }),
        Err(e) => reporter.emit(Event::CleanupFailed {
            hook: hook.name().to_owned(),
            reason: e.to_string(),
        }),
    }
}

/// Stage 2: the outcome becomes the nested handler error.
async fn run_timeout_hook(hook: &dyn Hook, reporter: &Reporter) -> Result<(), HookError> {
    reporter.emit(Event::HandlerStarted {
        hook: hook.name().to_owned(),
    });

    let res = call_isolated(hook).await;
    match &res {
        Ok(()) => reporter.emit(Event::HandlerFinished {
            hook: hook.name().to_owned(),
        }),
        Err(e) => reporter.emit(Event::HandlerFailed {
            hook: hook.name().to_owned(),
            reason: e.to_string(),
        }),
    }
    res
}

/// Calls the hook, turning a panic into [`HookError::Panicked`].
async fn call_isolated(hook: &dyn Hook) -> Result<(), HookError> {
    match AssertUnwindSafe(hook.call()).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(HookError::Failed(e)),
        Err(panic) => Err(HookError::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
