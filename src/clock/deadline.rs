//! # Absolute wall-clock deadline.
//!
//! Serverless hosts commonly hand the invocation an absolute deadline (epoch
//! milliseconds) rather than a live "time remaining" call. [`WallClockDeadline`]
//! turns such a deadline into a [`RemainingTime`] source.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::RemainingTime;
use crate::error::BoxError;

/// Remaining time measured against a fixed [`SystemTime`] deadline.
///
/// Once the deadline has passed, reports [`Duration::ZERO`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClockDeadline {
    deadline: SystemTime,
}

impl WallClockDeadline {
    /// Creates a source for the given deadline.
    pub fn new(deadline: SystemTime) -> Self {
        Self { deadline }
    }

    /// Creates a source from a deadline expressed in milliseconds since the Unix epoch.
    pub fn from_epoch_millis(millis: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_millis(millis))
    }

    /// Creates a source whose deadline is `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self::new(SystemTime::now() + budget)
    }

    /// The configured deadline.
    pub fn deadline(&self) -> SystemTime {
        self.deadline
    }
}

impl RemainingTime for WallClockDeadline {
    fn remaining(&self) -> Result<Duration, BoxError> {
        Ok(self
            .deadline
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO))
    }
}
