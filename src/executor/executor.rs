//! Bounded executor facade

use crate::error::{ExecutorError, ExecutorResult};
use crate::task::WorkItem;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tracing::debug;

use super::builder::BoundedExecutorBuilder;
use super::config::ExecutorConfig;
use super::gate::{AdmissionGate, Submission};
use super::limiter::ConcurrencyLimiter;
use super::pool::WorkerPool;
use super::types::{ExecutorStats, StatsInner};

/// Bounded-concurrency task executor
///
/// At most `max_concurrency` asynchronously submitted tasks execute at
/// once, and submission itself never blocks: every task passes through a
/// single-lane FIFO admission gate, and the gate alone waits on the
/// concurrency limiter. A backlog of any depth therefore parks exactly
/// one lane.
///
/// # Examples
///
/// ```
/// use gatepool::{BoundedExecutor, PoolMode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> gatepool::ExecutorResult<()> {
/// let executor = BoundedExecutor::builder()
///     .with_label("uploads")
///     .with_max_concurrency(3)
///     .with_pool_mode(PoolMode::Parallel)
///     .build()?;
///
/// for _ in 0..10 {
///     executor.submit(async {
///         // upload one chunk
///     })?;
/// }
///
/// executor.shutdown().await;
/// assert_eq!(executor.stats().completed, 10);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BoundedExecutor {
    config: ExecutorConfig,
    limiter: ConcurrencyLimiter,
    gate: AdmissionGate,
    pool: WorkerPool,
    stats: Arc<StatsInner>,
    shut_down: AtomicBool,
    drain: tokio::sync::Mutex<()>,
}

impl BoundedExecutor {
    /// Create an executor with a label and concurrency bound
    pub fn new(label: impl Into<String>, max_concurrency: usize) -> ExecutorResult<Self> {
        Self::with_config(ExecutorConfig::new(label, max_concurrency))
    }

    /// Create an executor from a full configuration
    pub fn with_config(config: ExecutorConfig) -> ExecutorResult<Self> {
        let runtime = Handle::try_current().map_err(|_| ExecutorError::NoRuntime)?;
        Self::with_config_on(config, runtime)
    }

    /// Create an executor whose lanes run on a specific runtime
    pub fn with_config_on(config: ExecutorConfig, runtime: Handle) -> ExecutorResult<Self> {
        config.validate()?;

        let stats = Arc::new(StatsInner::default());
        let limiter = ConcurrencyLimiter::new(config.max_concurrency);
        let pool = WorkerPool::start(
            config.job_label(),
            config.pool_mode,
            stats.clone(),
            &runtime,
        );
        let gate = AdmissionGate::start(
            config.gate_label(),
            limiter.clone(),
            pool.clone(),
            config.backlog_limit,
            stats.clone(),
            &runtime,
        );

        debug!(
            "bounded executor '{}' created (max_concurrency={}, pool={:?}, qos={:?})",
            config.label, config.max_concurrency, config.pool_mode, config.qos
        );

        Ok(Self {
            config,
            limiter,
            gate,
            pool,
            stats,
            shut_down: AtomicBool::new(false),
            drain: tokio::sync::Mutex::new(()),
        })
    }

    /// Builder for an executor
    pub fn builder() -> BoundedExecutorBuilder {
        BoundedExecutorBuilder::new()
    }

    // ========== Asynchronous submission ==========

    /// Submit a task; returns as soon as it is queued
    ///
    /// The task executes once the admission gate obtains a concurrency
    /// slot for it. Completion is not reported; use
    /// [`Self::submit_tracked`] to wait for a batch.
    pub fn submit<F>(&self, task: F) -> ExecutorResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.submit_item(WorkItem::new(task))
    }

    /// Submit a cancellable work item; returns as soon as it is queued
    ///
    /// If the item's token is cancelled before execution starts, the body
    /// is skipped. The item still cycles through its concurrency slot, so
    /// accounting stays exact.
    pub fn submit_item(&self, item: WorkItem) -> ExecutorResult<()> {
        self.submit_inner(item, None)
    }

    /// Submit a task whose completion the given tracker observes
    ///
    /// The tracker is entered at submission and exited when the task
    /// finishes or is skipped. `tracker.close()` followed by
    /// `tracker.wait().await` then blocks until the whole batch is done.
    pub fn submit_tracked<F>(&self, task: F, tracker: &TaskTracker) -> ExecutorResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.submit_inner(WorkItem::new(task), Some(tracker.token()))
    }

    fn submit_inner(
        &self,
        item: WorkItem,
        tracker_token: Option<TaskTrackerToken>,
    ) -> ExecutorResult<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ExecutorError::ShutDown);
        }
        self.gate.submit(Submission {
            item,
            tracker_token,
        })
    }

    // ========== Synchronous execution ==========

    /// Run a task on the worker pool and wait for it to finish
    ///
    /// Bypasses the admission gate and the concurrency limiter: the
    /// configured bound applies to asynchronous submissions only, so this
    /// completes even when every slot is held. On a serial pool the task
    /// still waits its turn in the lane; calling this from inside a task
    /// running on the same serial pool therefore deadlocks.
    pub async fn execute<F>(&self, task: F) -> ExecutorResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.execute_item(WorkItem::new(task)).await
    }

    /// Run a work item on the worker pool and wait for it to finish
    ///
    /// A pre-cancelled item returns once the pool has observed the skip.
    /// Task-body failures are not reported; returning means the item is
    /// no longer running.
    pub async fn execute_item(&self, item: WorkItem) -> ExecutorResult<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ExecutorError::ShutDown);
        }
        self.pool.run_direct(item).await
    }

    // ========== Lifecycle ==========

    /// Stop accepting work and wait for everything accepted to finish
    ///
    /// Drains the admission backlog through the limiter, then waits for
    /// all in-flight tasks. Safe to call more than once; every caller
    /// returns only after the drain is complete.
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        let _drain = self.drain.lock().await;
        self.gate.close().await;
        self.pool.close().await;
        debug!("bounded executor '{}' shut down", self.config.label);
    }

    /// Whether `shutdown` has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    // ========== Introspection ==========

    /// Executor label
    pub fn label(&self) -> &str {
        &self.config.label
    }

    /// Configured concurrency bound
    pub fn max_concurrency(&self) -> usize {
        self.config.max_concurrency
    }

    /// Concurrency slots currently free
    pub fn available_slots(&self) -> usize {
        self.limiter.available_slots()
    }

    /// Concurrency slots currently held by admitted tasks
    pub fn in_flight(&self) -> usize {
        self.limiter.slots_in_use()
    }

    /// Snapshot of the activity counters
    pub fn stats(&self) -> ExecutorStats {
        self.stats.snapshot()
    }

    /// Full configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}
