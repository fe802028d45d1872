//! # Race controller.
//!
//! Runs one task against the deadline checker; the first to settle decides the
//! outcome.
//!
//! ## Flow
//! ```text
//! validate(cfg, source, on_timeout) ── Err ──► GuardError::Config   (no timer started)
//!        │
//! Countdown::start (fallback: read source once) ── Err ──► GuardError::Check
//!        │
//! CheckerHandle::start ── tokio::spawn(task(token))
//!        │
//! select! (biased)
//!   ├─ task settled      → release timer → Ok(value) | GuardError::Task(e)
//!   └─ checker returned
//!        ├─ Err(e)       → (timer already released) → GuardError::Check(e)
//!        └─ Ok(breach)   → cancel token, detach task
//!                          → shutdown::run → GuardError::Timeout
//! ```
//!
//! ## Rules
//! - The timer is released exactly once on every path (explicit release plus `Drop`).
//! - The task is never interrupted. Once the checker wins, its join handle is
//!   dropped (detaching it) and its token is cancelled; a task that ignores the
//!   token keeps running until it finishes on its own.
//! - A panic inside the task is resumed on the caller.

use std::future::Future;

use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::{
    clock::RemainingTimeRef,
    core::{
        checker::{self, Breach, CheckerHandle, Countdown},
        config::GuardConfig,
        shutdown,
    },
    error::{BoxError, ConfigError, GuardError},
    events::Reporter,
    hooks::HookRef,
};

/// Hooks supplied for one invocation.
#[derive(Clone, Default)]
pub(crate) struct Hooks {
    pub(crate) on_timeout: Option<HookRef>,
    pub(crate) cleanup: Option<HookRef>,
}

enum Settled<T, E> {
    Task(Result<Result<T, E>, JoinError>),
    Deadline(Result<Breach, BoxError>),
}

/// Races `task` against the deadline and returns the winner's outcome.
pub(crate) async fn race<T, E, F, Fut>(
    cfg: &GuardConfig,
    source: Option<&RemainingTimeRef>,
    reporter: &Reporter,
    task: F,
    hooks: Hooks,
) -> Result<T, GuardError<E>>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let source = source.ok_or(ConfigError::MissingRemainingTime)?;
    let on_timeout = hooks.on_timeout.ok_or(ConfigError::MissingTimeoutHandler)?;
    cfg.validate()?;

    let countdown =
        Countdown::start(source, cfg.use_fallback_stopwatch).map_err(GuardError::Check)?;

    let token = CancellationToken::new();
    let mut handle = CheckerHandle::start(cfg, reporter.clone());
    let mut join = tokio::spawn(task(token.clone()));

    let settled = tokio::select! {
        biased;
        res = &mut join => Settled::Task(res),
        res = checker::watch(&mut handle, &countdown, cfg, reporter) => Settled::Deadline(res),
    };
    handle.release();

    match settled {
        Settled::Task(Ok(Ok(value))) => Ok(value),
        Settled::Task(Ok(Err(e))) => Err(GuardError::Task(e)),
        Settled::Task(Err(join_err)) => match join_err.try_into_panic() {
            Ok(panic) => std::panic::resume_unwind(panic),
            Err(_cancelled) => Err(GuardError::TaskAborted),
        },
        Settled::Deadline(Err(e)) => Err(GuardError::Check(e)),
        Settled::Deadline(Ok(breach)) => {
            token.cancel();
            drop(join);
            Err(shutdown::run(
                breach,
                hooks.cleanup.as_deref(),
                on_timeout.as_ref(),
                cfg,
                reporter,
            )
            .await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedRemaining, RemainingTimeFn};
    use crate::error::HookError;
    use crate::hooks::HookFn;
    use crate::sinks::MemorySink;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::{self, Instant};

    fn fast_cfg() -> GuardConfig {
        GuardConfig {
            safety_margin: Duration::from_millis(100),
            check_interval: Duration::from_millis(20),
            ..GuardConfig::default()
        }
    }

    fn fixed(ms: u64) -> RemainingTimeRef {
        Arc::new(FixedRemaining(Duration::from_millis(ms)))
    }

    fn counting_hook(name: &'static str, calls: &Arc<AtomicUsize>) -> HookRef {
        let calls = Arc::clone(calls);
        HookFn::arc(name, move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BoxError>(())
            }
        })
    }

    fn hooks(on_timeout: HookRef) -> Hooks {
        Hooks {
            on_timeout: Some(on_timeout),
            cleanup: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_path_returns_value_and_stops_checker() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let src = fixed(10_000);

        let res: Result<u32, GuardError<&str>> = race(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| async {
                time::sleep(Duration::from_millis(250)).await;
                Ok(42)
            },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await;

        assert_eq!(res.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(sink.count("[checker] stopped"), 1);

        let lines = sink.len();
        time::advance(Duration::from_secs(10)).await;
        assert_eq!(sink.len(), lines);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_error_propagates_unchanged() {
        let reporter = Reporter::new(Arc::new(MemorySink::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let src = fixed(10_000);

        let err = race::<(), _, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| async { Err("invalid payload") },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();

        assert!(!err.is_timeout());
        assert_eq!(err.task_error(), Some(&"invalid payload"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_runs_handler_once() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let src = fixed(50);

        let started = Instant::now();
        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| std::future::pending(),
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();

        assert!(started.elapsed() < Duration::from_millis(20));
        assert!(err.is_timeout());
        assert!(err.handler_error().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sink.count("[checker] stopped"), 1);
        assert_eq!(sink.count("[check]"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_cleanup_then_handler() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let trail = Arc::new(Mutex::new(Vec::new()));

        let t1 = Arc::clone(&trail);
        let cleanup: HookRef = HookFn::arc("cleanup", move || {
            let t = Arc::clone(&t1);
            async move {
                t.lock().unwrap().push("cleanup");
                Ok::<_, BoxError>(())
            }
        });
        let t2 = Arc::clone(&trail);
        let on_timeout: HookRef = HookFn::arc("on-timeout", move || {
            let t = Arc::clone(&t2);
            async move {
                t.lock().unwrap().push("on-timeout");
                Ok::<_, BoxError>(())
            }
        });

        let src = fixed(50);
        let started = Instant::now();
        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| std::future::pending(),
            Hooks {
                on_timeout: Some(on_timeout),
                cleanup: Some(cleanup),
            },
        )
        .await
        .unwrap_err();

        assert!(started.elapsed() <= Duration::from_millis(20));
        assert!(err.is_timeout());
        assert_eq!(*trail.lock().unwrap(), vec!["cleanup", "on-timeout"]);

        let lines = sink.lines();
        let pos = |prefix: &str| lines.iter().position(|l| l.starts_with(prefix)).unwrap();
        assert!(pos("[imminent]") < pos("[cleanup] starting"));
        assert!(pos("[cleanup] finished") < pos("[on-timeout] starting"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_fallback_stopwatch_triggers_before_task() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let reads = Arc::new(AtomicU64::new(0));

        let r = Arc::clone(&reads);
        let src: RemainingTimeRef = RemainingTimeFn::arc(move || {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(Duration::from_millis(10_000))
        });
        let cfg = GuardConfig {
            safety_margin: Duration::from_millis(2_000),
            use_fallback_stopwatch: true,
            ..GuardConfig::default()
        };

        let f = Arc::clone(&finished);
        let started = Instant::now();
        let err = race::<(), &str, _, _>(
            &cfg,
            Some(&src),
            &reporter,
            move |_ctx| async move {
                time::sleep(Duration::from_millis(9_000)).await;
                f.store(true, Ordering::SeqCst);
                Ok(())
            },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(8_000) && waited < Duration::from_millis(9_000));
        assert!(!finished.load(Ordering::SeqCst));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert!(sink.contains("[imminent]"));
        assert!(sink.contains("mode=fallback"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_failure_keeps_clean_timeout() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let cleanup: HookRef =
            HookFn::arc("cleanup", || async { Err::<(), BoxError>("disk full".into()) });
        let src = fixed(50);

        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| std::future::pending(),
            Hooks {
                on_timeout: Some(counting_hook("on-timeout", &calls)),
                cleanup: Some(cleanup),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.as_label(), "deadline_timeout");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sink.contains("[cleanup] failed hook=\"cleanup\" err=\"disk full\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_failure_message_is_nested() {
        let reporter = Reporter::new(Arc::new(MemorySink::new()));
        let on_timeout: HookRef =
            HookFn::arc("on-timeout", || async { Err::<(), BoxError>("alarm failed".into()) });
        let src = fixed(50);

        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| std::future::pending(),
            hooks(on_timeout),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        let nested = err.handler_error().unwrap();
        assert!(matches!(nested, HookError::Failed(_)));
        assert_eq!(nested.to_string(), "alarm failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_error_is_not_a_timeout() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let src: RemainingTimeRef = RemainingTimeFn::arc(|| Err("context gone".into()));

        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| std::future::pending(),
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();

        assert!(!err.is_timeout());
        assert!(matches!(err, GuardError::Check(ref e) if e.to_string() == "context gone"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(sink.count("[checker] stopped"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_baseline_error_fails_before_racing() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let src: RemainingTimeRef = RemainingTimeFn::arc(|| Err("no deadline".into()));
        let cfg = GuardConfig {
            use_fallback_stopwatch: true,
            ..fast_cfg()
        };

        let err = race::<(), &str, _, _>(
            &cfg,
            Some(&src),
            &reporter,
            |_ctx| async { Ok(()) },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.as_label(), "check_failed");
        assert!(sink.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_errors_start_no_timer() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let src = fixed(10_000);

        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            None,
            &reporter,
            |_ctx| async { Ok(()) },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            GuardError::Config(ConfigError::MissingRemainingTime)
        ));

        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| async { Ok(()) },
            Hooks::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            GuardError::Config(ConfigError::MissingTimeoutHandler)
        ));

        let cfg = GuardConfig {
            check_interval: Duration::ZERO,
            ..fast_cfg()
        };
        let err = race::<(), &str, _, _>(
            &cfg,
            Some(&src),
            &reporter,
            |_ctx| async { Ok(()) },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            GuardError::Config(ConfigError::ZeroDuration {
                field: "check_interval"
            })
        ));

        assert!(sink.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_task_keeps_running() {
        let reporter = Reporter::new(Arc::new(MemorySink::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let src = fixed(50);

        let f = Arc::clone(&finished);
        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            move |_ctx| async move {
                time::sleep(Duration::from_secs(1)).await;
                f.store(true, Ordering::SeqCst);
                Ok(())
            },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();
        assert!(err.is_timeout());
        assert!(!finished.load(Ordering::SeqCst));

        time::sleep(Duration::from_secs(2)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_token_cancelled_on_timeout() {
        let reporter = Reporter::new(Arc::new(MemorySink::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = Arc::new(AtomicBool::new(false));
        let src = fixed(50);

        let o = Arc::clone(&observed);
        let err = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            move |ctx: CancellationToken| async move {
                ctx.cancelled().await;
                o.store(true, Ordering::SeqCst);
                Ok(())
            },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await
        .unwrap_err();
        assert!(err.is_timeout());

        time::sleep(Duration::from_millis(1)).await;
        assert!(observed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "task exploded")]
    async fn test_task_panic_is_resumed() {
        let reporter = Reporter::new(Arc::new(MemorySink::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let src = fixed(10_000);

        let _ = race::<(), &str, _, _>(
            &fast_cfg(),
            Some(&src),
            &reporter,
            |_ctx| async {
                if true {
                    panic!("task exploded");
                }
                Ok(())
            },
            hooks(counting_hook("on-timeout", &calls)),
        )
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timer_left_after_many_invocations() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let remaining = Arc::new(AtomicU64::new(0));

        let r = Arc::clone(&remaining);
        let src: RemainingTimeRef =
            RemainingTimeFn::arc(move || Ok(Duration::from_millis(r.load(Ordering::SeqCst))));

        for i in 0..1_000u32 {
            let fast = i % 2 == 0;
            remaining.store(if fast { 10_000 } else { 50 }, Ordering::SeqCst);
            let res = race::<u32, &str, _, _>(
                &fast_cfg(),
                Some(&src),
                &reporter,
                move |_ctx| async move {
                    if fast {
                        time::sleep(Duration::from_millis(30)).await;
                        Ok(i)
                    } else {
                        std::future::pending().await
                    }
                },
                hooks(counting_hook("on-timeout", &calls)),
            )
            .await;

            match res {
                Ok(v) => assert!(fast && v == i),
                Err(e) => assert!(!fast && e.is_timeout()),
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 500);
        assert_eq!(sink.count("[monitoring]"), 1_000);
        assert_eq!(sink.count("[checker] stopped"), 1_000);

        let lines = sink.len();
        time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(sink.len(), lines);
    }
}
