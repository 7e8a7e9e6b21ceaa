// ABOUTME: Background polling scheduler for Client Watch
// ABOUTME: One repeating task per generation with a stop/wait/start restart protocol

pub mod error;
pub mod scheduler;
pub mod task;

pub use error::SchedulerError;
pub use scheduler::{Scheduler, SchedulerStatus};
pub use task::{FixedInterval, IntervalSource, ScheduledTask};
