// ABOUTME: Restartable scheduler running one task on a fixed interval
// ABOUTME: Each start creates a fresh loop generation with its own stop and exit signals

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::SchedulerError;
use crate::task::{IntervalSource, ScheduledTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    Stopped,
    Running,
    /// Stop signalled, loop still finishing its current tick
    Stopping,
}

/// Handles for one run of the loop
#[derive(Debug, Clone)]
struct LoopGeneration {
    id: u64,
    interval: Duration,
    stop: CancellationToken,
    exited: CancellationToken,
}

/// Runs a single [`ScheduledTask`] repeatedly.
///
/// At most one loop is ever live. `restart` is the stop, wait, start sequence
/// performed under a lifecycle lock so concurrent restarts serialize and
/// always end with exactly one running loop.
pub struct Scheduler {
    source: Arc<dyn IntervalSource>,
    task: Mutex<Option<Arc<dyn ScheduledTask>>>,
    current: Mutex<Option<LoopGeneration>>,
    generations: AtomicU64,
    live_loops: Arc<AtomicUsize>,
    lifecycle: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("status", &self.status())
            .field("generation", &self.generation())
            .finish()
    }
}

impl Scheduler {
    pub fn new(source: Arc<dyn IntervalSource>) -> Self {
        Self {
            source,
            task: Mutex::new(None),
            current: Mutex::new(None),
            generations: AtomicU64::new(0),
            live_loops: Arc::new(AtomicUsize::new(0)),
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Read the interval and launch a new loop running `task`.
    ///
    /// Fails without starting anything when the interval cannot be determined
    /// or a loop is already live. Returns the new generation id.
    pub async fn start(&self, task: Arc<dyn ScheduledTask>) -> Result<u64, SchedulerError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.launch(task)
    }

    /// Signal the running loop to exit after its current tick. No-op when stopped.
    ///
    /// Returns whether a stop signal was delivered.
    pub fn stop(&self) -> bool {
        let current = lock(&self.current);
        match current.as_ref() {
            Some(generation)
                if !generation.stop.is_cancelled() && !generation.exited.is_cancelled() =>
            {
                info!(generation = generation.id, "Stopping background task loop");
                generation.stop.cancel();
                true
            }
            _ => {
                debug!("Stop requested with no running loop");
                false
            }
        }
    }

    /// Resolve once the most recently started loop has fully exited.
    ///
    /// Returns immediately when nothing was ever started or the loop is gone.
    /// Any number of callers may wait at once.
    pub async fn wait_until_stopped(&self) {
        let exited = lock(&self.current).as_ref().map(|g| g.exited.clone());
        if let Some(exited) = exited {
            exited.cancelled().await;
        }
    }

    /// Stop the current loop, wait for it, then start a new one with a freshly
    /// read interval.
    ///
    /// Returns `Ok(None)` when no task was ever started. If the new interval is
    /// unusable the scheduler is left stopped and the error is returned.
    ///
    /// The sequence runs on its own task. Dropping the returned future detaches
    /// the caller but the restart still completes.
    pub async fn restart(self: &Arc<Self>) -> Result<Option<u64>, SchedulerError> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.restart_sequence().await })
            .await
            .map_err(|e| SchedulerError::RestartAborted(e.to_string()))?
    }

    async fn restart_sequence(&self) -> Result<Option<u64>, SchedulerError> {
        let _lifecycle = self.lifecycle.lock().await;

        let task = lock(&self.task).clone();
        let Some(task) = task else {
            info!("Restart requested before any task was started, ignoring");
            return Ok(None);
        };

        self.stop();
        self.wait_until_stopped().await;

        match self.launch(task) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                error!("Background task not restarted: {}", e);
                Err(e)
            }
        }
    }

    /// Stop and wait
    pub async fn shutdown(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.stop();
        self.wait_until_stopped().await;
    }

    pub fn status(&self) -> SchedulerStatus {
        match lock(&self.current).as_ref() {
            None => SchedulerStatus::Stopped,
            Some(g) if g.exited.is_cancelled() => SchedulerStatus::Stopped,
            Some(g) if g.stop.is_cancelled() => SchedulerStatus::Stopping,
            Some(_) => SchedulerStatus::Running,
        }
    }

    /// Id of the latest generation, 0 before the first start
    pub fn generation(&self) -> u64 {
        self.generations.load(Ordering::SeqCst)
    }

    /// Interval of the latest generation
    pub fn interval(&self) -> Option<Duration> {
        lock(&self.current).as_ref().map(|g| g.interval)
    }

    /// Loops that have entered but not yet left their run loop
    pub fn live_loops(&self) -> usize {
        self.live_loops.load(Ordering::SeqCst)
    }

    /// Caller must hold the lifecycle lock
    fn launch(&self, task: Arc<dyn ScheduledTask>) -> Result<u64, SchedulerError> {
        {
            let current = lock(&self.current);
            if let Some(generation) = current.as_ref() {
                if !generation.exited.is_cancelled() {
                    warn!(generation = generation.id, "Background task loop already running");
                    return Err(SchedulerError::AlreadyRunning(generation.id));
                }
            }
        }

        // Remember the task even when the interval is bad so a later restart can
        // pick it up once the operator fixes the preference.
        *lock(&self.task) = Some(task.clone());

        let interval = self.source.poll_interval()?;
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval {
                value: "0".to_string(),
                reason: "interval must be positive".to_string(),
            });
        }

        let id = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = LoopGeneration {
            id,
            interval,
            stop: CancellationToken::new(),
            exited: CancellationToken::new(),
        };

        self.live_loops.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(run_loop(
            generation.clone(),
            task,
            LiveGuard(self.live_loops.clone()),
        ));

        info!(generation = id, interval_secs = interval.as_secs_f64(), "Started background task loop");
        *lock(&self.current) = Some(generation);
        Ok(id)
    }
}

/// Decrements the live loop count when the loop future is dropped
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_loop(generation: LoopGeneration, task: Arc<dyn ScheduledTask>, live: LiveGuard) {
    // Drop order: live count first, then the exit signal waiters observe.
    let _exited = generation.exited.drop_guard();
    let _live = live;

    let period = generation.interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!(generation = generation.id, task = task.name(), "Entering background task loop");

    loop {
        tokio::select! {
            biased;
            _ = generation.stop.cancelled() => break,
            _ = ticker.tick() => {
                debug!(generation = generation.id, task = task.name(), "Tick");
                if AssertUnwindSafe(task.run()).catch_unwind().await.is_err() {
                    error!(generation = generation.id, task = task.name(), "Background task panicked during tick");
                }
            }
        }
    }

    info!(generation = generation.id, task = task.name(), "Exiting background task loop");
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
