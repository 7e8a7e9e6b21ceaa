// ABOUTME: Traits at the scheduler seams
// ABOUTME: The work run on every tick and where the tick interval comes from

use async_trait::async_trait;
use std::time::Duration;

use crate::SchedulerError;

/// Work executed once per tick.
///
/// Implementations handle their own errors. The scheduler never retries and a
/// failing tick must simply return so the next tick can run.
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    async fn run(&self);

    /// Label used in log lines
    fn name(&self) -> &str {
        "background task"
    }
}

/// Authoritative source of the tick interval, read on every start
pub trait IntervalSource: Send + Sync {
    fn poll_interval(&self) -> Result<Duration, SchedulerError>;
}

/// Constant interval
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval(pub Duration);

impl IntervalSource for FixedInterval {
    fn poll_interval(&self) -> Result<Duration, SchedulerError> {
        Ok(self.0)
    }
}
