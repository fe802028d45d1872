//! # DeadlineGuard: entry point for time-boxed invocations.
//!
//! A [`DeadlineGuard`] is built once per execution context and then used for
//! each unit of work. Every [`Invocation`] races its task against the deadline;
//! see [`core::race`](super::race) for the exact flow.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use deadline_guard::{
//!     BoxError, DeadlineGuard, FixedRemaining, GuardConfig, HookFn, HookRef, MemorySink,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = GuardConfig::default();
//!     cfg.safety_margin = Duration::from_millis(100);
//!     cfg.check_interval = Duration::from_millis(20);
//!
//!     let guard = DeadlineGuard::builder(cfg)
//!         .with_remaining_time(Arc::new(FixedRemaining(Duration::from_secs(30))))
//!         .with_sink(Arc::new(MemorySink::new()))
//!         .build();
//!
//!     let notify: HookRef = HookFn::arc("notify", || async { Ok::<_, BoxError>(()) });
//!
//!     let out = guard
//!         .invoke(|_ctx| async { Ok::<_, std::io::Error>("done") })
//!         .on_timeout(notify)
//!         .run()
//!         .await;
//!
//!     assert_eq!(out.unwrap(), "done");
//! }
//! ```

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::{
    builder::GuardBuilder,
    config::GuardConfig,
    race::{self, Hooks},
};
use crate::{clock::RemainingTimeRef, error::GuardError, events::Reporter, hooks::HookRef};

/// Races units of work against the host's deadline.
///
/// Holds no per-invocation state: concurrent invocations on the same guard are
/// independent.
pub struct DeadlineGuard {
    cfg: GuardConfig,
    source: Option<RemainingTimeRef>,
    reporter: Reporter,
}

impl DeadlineGuard {
    /// Starts building a guard with the given configuration.
    pub fn builder(cfg: GuardConfig) -> GuardBuilder {
        GuardBuilder::new(cfg)
    }

    /// Shortcut for a guard with `cfg`, `source`, and the default sink.
    pub fn new(cfg: GuardConfig, source: RemainingTimeRef) -> Self {
        GuardBuilder::new(cfg).with_remaining_time(source).build()
    }

    pub(super) fn new_internal(
        cfg: GuardConfig,
        source: Option<RemainingTimeRef>,
        reporter: Reporter,
    ) -> Self {
        Self {
            cfg,
            source,
            reporter,
        }
    }

    /// The guard's configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.cfg
    }

    /// Prepares an invocation of `task`.
    ///
    /// The task receives a [`CancellationToken`] that is cancelled when the
    /// deadline becomes imminent. The guard stops waiting for the task at that
    /// point but never interrupts it; honoring the token is up to the task.
    pub fn invoke<F, Fut>(&self, task: F) -> Invocation<'_, F>
    where
        F: FnOnce(CancellationToken) -> Fut,
    {
        Invocation {
            guard: self,
            task,
            hooks: Hooks::default(),
        }
    }

    /// Runs `task` with the given hooks in one call.
    pub async fn run<T, E, F, Fut>(
        &self,
        task: F,
        on_timeout: HookRef,
        cleanup: Option<HookRef>,
    ) -> Result<T, GuardError<E>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let mut inv = self.invoke(task).on_timeout(on_timeout);
        inv.hooks.cleanup = cleanup;
        inv.run().await
    }
}

impl std::fmt::Debug for DeadlineGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineGuard")
            .field("cfg", &self.cfg)
            .field("has_source", &self.source.is_some())
            .field("reporter", &self.reporter)
            .finish()
    }
}

/// One pending unit of work; nothing runs until [`Invocation::run`].
#[must_use = "an invocation does nothing until `.run().await`"]
pub struct Invocation<'g, F> {
    guard: &'g DeadlineGuard,
    task: F,
    hooks: Hooks,
}

impl<'g, F> Invocation<'g, F> {
    /// Sets the hook run once the deadline is imminent. Required.
    pub fn on_timeout(mut self, hook: HookRef) -> Self {
        self.hooks.on_timeout = Some(hook);
        self
    }

    /// Sets the cleanup hook, run before the timeout hook under `cleanup_time`.
    pub fn cleanup(mut self, hook: HookRef) -> Self {
        self.hooks.cleanup = Some(hook);
        self
    }

    /// Runs the task against the deadline.
    ///
    /// # Errors
    /// - [`GuardError::Config`]: missing source or timeout hook, or a zero duration
    /// - [`GuardError::Task`]: the task's own error, unchanged
    /// - [`GuardError::Check`]: the remaining-time source failed
    /// - [`GuardError::Timeout`]: the deadline became imminent first
    /// - [`GuardError::TaskAborted`]: the runtime cancelled the task
    ///
    /// # Panics
    /// Resumes a panic raised inside the task.
    pub async fn run<T, E, Fut>(self) -> Result<T, GuardError<E>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let guard = self.guard;
        race::race(
            &guard.cfg,
            guard.source.as_ref(),
            &guard.reporter,
            self.task,
            self.hooks,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedRemaining, RemainingTimeFn};
    use crate::error::{BoxError, ConfigError};
    use crate::hooks::HookFn;
    use crate::sinks::MemorySink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn cfg() -> GuardConfig {
        GuardConfig {
            safety_margin: Duration::from_millis(100),
            check_interval: Duration::from_millis(20),
            ..GuardConfig::default()
        }
    }

    fn noop(name: &'static str) -> HookRef {
        HookFn::arc(name, || async { Ok::<_, BoxError>(()) })
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_logs_single_init_line() {
        let sink = Arc::new(MemorySink::new());
        let guard = DeadlineGuard::builder(cfg())
            .with_remaining_time(Arc::new(FixedRemaining(Duration::from_secs(30))))
            .with_sink(sink.clone())
            .build();

        assert_eq!(
            sink.lines(),
            vec!["[init] safety_margin=100ms check_interval=20ms cleanup_time=3000ms mode=live"]
        );
        assert_eq!(guard.config(), &cfg());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_source_fails_at_invocation() {
        let sink = Arc::new(MemorySink::new());
        let guard = DeadlineGuard::builder(cfg()).with_sink(sink.clone()).build();

        let err = guard
            .invoke(|_ctx| async { Ok::<_, &str>(()) })
            .on_timeout(noop("on-timeout"))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GuardError::Config(ConfigError::MissingRemainingTime)
        ));
        assert_eq!(sink.count("[monitoring]"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_timeout_handler_fails_at_invocation() {
        let sink = Arc::new(MemorySink::new());
        let guard = DeadlineGuard::builder(cfg())
            .with_remaining_time(Arc::new(FixedRemaining(Duration::from_secs(30))))
            .with_sink(sink.clone())
            .build();

        let err = guard
            .invoke(|_ctx| async { Ok::<_, &str>(()) })
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "config_invalid");
        assert_eq!(sink.count("[monitoring]"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_cleanup_on_timeout() {
        let sink = Arc::new(MemorySink::new());
        let cleanups = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&cleanups);
        let cleanup: HookRef = HookFn::arc("flush", move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>(())
            }
        });
        let guard = DeadlineGuard::builder(cfg())
            .with_remaining_time(Arc::new(FixedRemaining(Duration::from_millis(50))))
            .with_sink(sink.clone())
            .build();

        let err = guard
            .run(
                |_ctx| std::future::pending::<Result<(), &str>>(),
                noop("on-timeout"),
                Some(cleanup),
            )
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert!(sink.contains("[cleanup] finished hook=\"flush\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_source_counting_down_triggers() {
        let sink = Arc::new(MemorySink::new());
        let start = tokio::time::Instant::now();
        let src = RemainingTimeFn::arc(move || {
            Ok(Duration::from_millis(1_000).saturating_sub(start.elapsed()))
        });
        let guard = DeadlineGuard::builder(cfg())
            .with_remaining_time(src)
            .with_sink(sink.clone())
            .build();

        let err = guard
            .invoke(|_ctx| std::future::pending::<Result<(), &str>>())
            .on_timeout(noop("on-timeout"))
            .run()
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(start.elapsed() >= Duration::from_millis(900));
        assert!(start.elapsed() < Duration::from_millis(1_000));
        assert!(sink.contains("[imminent]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_is_reusable() {
        let guard = DeadlineGuard::builder(cfg())
            .with_remaining_time(Arc::new(FixedRemaining(Duration::from_secs(30))))
            .with_sink(Arc::new(MemorySink::new()))
            .build();

        for n in 0..3u32 {
            let out = guard
                .invoke(move |_ctx| async move { Ok::<_, &str>(n * 2) })
                .on_timeout(noop("on-timeout"))
                .run()
                .await
                .unwrap();
            assert_eq!(out, n * 2);
        }
    }
}
