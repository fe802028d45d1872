use std::sync::Arc;

use super::{config::GuardConfig, guard::DeadlineGuard};
use crate::{
    clock::RemainingTimeRef,
    events::{Event, Reporter},
    sinks::{ConsoleSink, LogSinkRef},
};

/// Builder for constructing a [`DeadlineGuard`].
pub struct GuardBuilder {
    cfg: GuardConfig,
    source: Option<RemainingTimeRef>,
    sink: LogSinkRef,
}

impl GuardBuilder {
    /// Creates a new builder with the given configuration and a [`ConsoleSink`].
    pub fn new(cfg: GuardConfig) -> Self {
        Self {
            cfg,
            source: None,
            sink: Arc::new(ConsoleSink::new()),
        }
    }

    /// Sets the host's remaining-time source.
    ///
    /// Required: invocations on a guard without a source fail with
    /// [`ConfigError::MissingRemainingTime`](crate::ConfigError::MissingRemainingTime).
    pub fn with_remaining_time(mut self, source: RemainingTimeRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets where diagnostic lines go.
    pub fn with_sink(mut self, sink: LogSinkRef) -> Self {
        self.sink = sink;
        self
    }

    /// Builds the guard and logs its effective settings.
    pub fn build(self) -> DeadlineGuard {
        let reporter = Reporter::new(self.sink);
        reporter.emit(Event::Initialized {
            margin: self.cfg.safety_margin,
            interval: self.cfg.check_interval,
            cleanup: self.cfg.cleanup_time,
            mode: self.cfg.mode_label(),
        });
        DeadlineGuard::new_internal(self.cfg, self.source, reporter)
    }
}
