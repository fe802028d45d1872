//! # deadline-guard
//!
//! **deadline-guard** races a unit of work against the remaining execution time
//! of its host (a serverless invocation, a job with a hard wall-clock limit, a
//! request with a deadline) and runs a graceful shutdown sequence before that
//! time runs out.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!            ┌──────────────────────────────────────┐
//!            │ DeadlineGuard (built once per host)  │
//!            │  - GuardConfig                       │
//!            │  - RemainingTime source              │
//!            │  - Reporter ──► LogSink              │
//!            └──────────────────┬───────────────────┘
//!                               ▼ invoke(task).on_timeout(h).cleanup(c).run()
//!            ┌──────────────────────────────────────┐
//!            │ race (one per invocation)            │
//!            └───────┬─────────────────────┬────────┘
//!                    ▼                     ▼
//!        ┌──────────────────────┐  ┌───────────────────────┐
//!        │ task(token)          │  │ checker::watch        │
//!        │ (tokio::spawn)       │  │ every check_interval: │
//!        │                      │  │  remaining ≤ margin ? │
//!        └──────────┬───────────┘  └───────────┬───────────┘
//!                   │ settles first            │ breach first
//!                   ▼                          ▼
//!           Ok(T) / Task(E)          cancel token, detach task
//!                                              ▼
//!                                  ┌───────────────────────┐
//!                                  │ shutdown::run         │
//!                                  │ 1. cleanup (bounded)  │
//!                                  │ 2. on_timeout         │
//!                                  └───────────┬───────────┘
//!                                              ▼
//!                                     GuardError::Timeout
//! ```
//!
//! ### Checks
//! ```text
//! tick (first one fires immediately)
//!   ├─► remaining = source (live) | initial - elapsed (fallback)
//!   ├─► log [check] every 10th tick, or every tick once remaining ≤ 3 × margin
//!   └─► remaining ≤ margin ─► stop timer, [imminent], shutdown
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Guard**         | Reusable entry point; one race per invocation.                | [`DeadlineGuard`], [`Invocation`]           |
//! | **Configuration** | Margin, check interval, cleanup budget, fallback stopwatch.   | [`GuardConfig`], [`GuardBuilder`]           |
//! | **Time sources**  | Host-provided remaining time, or a wall-clock deadline.       | [`RemainingTime`], [`WallClockDeadline`]    |
//! | **Hooks**         | Cleanup and timeout handlers as trait objects or closures.    | [`Hook`], [`HookFn`]                        |
//! | **Diagnostics**   | Plain `[kind] key=value` lines to console, tracing or memory. | [`LogSink`], [`TracingSink`], [`MemorySink`] |
//! | **Errors**        | Typed outcome with the task's own error kept intact.          | [`GuardError`], [`ConfigError`], [`HookError`] |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use deadline_guard::{BoxError, DeadlineGuard, GuardConfig, HookFn, HookRef, WallClockDeadline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = GuardConfig::default();
//!     cfg.safety_margin = Duration::from_millis(200);
//!     cfg.check_interval = Duration::from_millis(50);
//!
//!     let guard = DeadlineGuard::new(cfg, Arc::new(WallClockDeadline::after(Duration::from_secs(10))));
//!
//!     let on_timeout: HookRef = HookFn::arc("report", || async {
//!         eprintln!("ran out of time");
//!         Ok::<_, BoxError>(())
//!     });
//!
//!     let out = guard
//!         .invoke(|ctx: CancellationToken| async move {
//!             if ctx.is_cancelled() {
//!                 return Err("cancelled");
//!             }
//!             Ok(42)
//!         })
//!         .on_timeout(on_timeout)
//!         .run()
//!         .await;
//!
//!     assert_eq!(out.unwrap(), 42);
//! }
//! ```
mod clock;
mod core;
mod error;
mod events;
mod hooks;
mod sinks;

// ---- Public re-exports ----

pub use clock::{FixedRemaining, RemainingTime, RemainingTimeFn, RemainingTimeRef, WallClockDeadline};
pub use core::{DeadlineGuard, GuardBuilder, GuardConfig, Invocation, InvocationState, DANGER_ZONE_FACTOR};
pub use error::{BoxError, ConfigError, GuardError, HookError};
pub use hooks::{Hook, HookFn, HookRef};
pub use sinks::{ConsoleSink, LogSink, LogSinkRef, MemorySink, SinkFn, TracingSink};
