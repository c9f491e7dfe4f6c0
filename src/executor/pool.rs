//! Worker pool lanes that run admitted tasks

use crate::error::{ExecutorError, ExecutorResult};
use crate::task::WorkItem;
use futures::FutureExt;
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tracing::{debug, trace};

use super::config::PoolMode;
use super::limiter::SlotPermit;
use super::types::{ExecutingGuard, StatsInner};

/// A task on its way through a pool lane
pub(crate) struct PoolJob {
    item: WorkItem,
    permit: Option<SlotPermit>,
    tracker_token: Option<TaskTrackerToken>,
    completion: Option<oneshot::Sender<()>>,
}

impl PoolJob {
    /// Job admitted through the gate, holding its concurrency slot
    pub(crate) fn gated(
        item: WorkItem,
        permit: SlotPermit,
        tracker_token: Option<TaskTrackerToken>,
    ) -> Self {
        Self {
            item,
            permit: Some(permit),
            tracker_token,
            completion: None,
        }
    }

    /// Job dispatched directly, signalling the caller when finished
    pub(crate) fn direct(item: WorkItem, completion: oneshot::Sender<()>) -> Self {
        Self {
            item,
            permit: None,
            tracker_token: None,
            completion: Some(completion),
        }
    }
}

/// Executes admitted tasks, serially or in parallel
#[derive(Debug, Clone)]
pub(crate) struct WorkerPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    label: String,
    mode: PoolMode,
    runtime: Handle,
    tracker: TaskTracker,
    serial_sender: Mutex<Option<mpsc::UnboundedSender<PoolJob>>>,
    serial_worker: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<StatsInner>,
}

impl WorkerPool {
    /// Spawn the pool lane on the given runtime
    pub(crate) fn start(
        label: String,
        mode: PoolMode,
        stats: Arc<StatsInner>,
        runtime: &Handle,
    ) -> Self {
        let (serial_sender, serial_worker) = match mode {
            PoolMode::Serial => {
                let (sender, receiver) = mpsc::unbounded_channel();
                let worker = runtime.spawn(serial_loop(label.clone(), receiver, stats.clone()));
                (Some(sender), Some(worker))
            }
            PoolMode::Parallel => (None, None),
        };
        Self {
            inner: Arc::new(PoolInner {
                label,
                mode,
                runtime: runtime.clone(),
                tracker: TaskTracker::new(),
                serial_sender: Mutex::new(serial_sender),
                serial_worker: Mutex::new(serial_worker),
                stats,
            }),
        }
    }

    /// Hand a job to the pool; never waits
    pub(crate) fn dispatch(&self, job: PoolJob) -> ExecutorResult<()> {
        match self.inner.mode {
            PoolMode::Serial => match &*self.inner.serial_sender.lock() {
                Some(sender) => sender.send(job).map_err(|_| ExecutorError::ShutDown),
                None => Err(ExecutorError::ShutDown),
            },
            PoolMode::Parallel => {
                let stats = self.inner.stats.clone();
                let tracked = self.inner.tracker.track_future(run_job(job, stats));
                self.inner.runtime.spawn(tracked);
                Ok(())
            }
        }
    }

    /// Run an item on the pool and suspend until it finishes
    ///
    /// Returning means the item is no longer running; the body's outcome
    /// is not reported.
    pub(crate) async fn run_direct(&self, item: WorkItem) -> ExecutorResult<()> {
        let (completion, done) = oneshot::channel();
        self.dispatch(PoolJob::direct(item, completion))?;
        // A dropped signal means the body panicked; the job still finished.
        let _ = done.await;
        self.inner.stats.record_direct_run();
        Ok(())
    }

    /// Close the serial lane and wait for every running task
    pub(crate) async fn close(&self) {
        drop(self.inner.serial_sender.lock().take());
        let worker = self.inner.serial_worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        debug!("worker pool '{}' drained", self.inner.label);
    }
}

async fn serial_loop(
    label: String,
    mut receiver: mpsc::UnboundedReceiver<PoolJob>,
    stats: Arc<StatsInner>,
) {
    debug!("serial worker '{}' started", label);
    while let Some(job) = receiver.recv().await {
        // Contain panics so one failing task cannot take the lane down.
        let _ = AssertUnwindSafe(run_job(job, stats.clone())).catch_unwind().await;
    }
    debug!("serial worker '{}' drained", label);
}

/// Execute one job: skip if cancelled, release held resources afterwards
async fn run_job(job: PoolJob, stats: Arc<StatsInner>) {
    let PoolJob {
        item,
        permit,
        tracker_token,
        completion,
    } = job;
    if item.is_cancelled() {
        stats.record_skipped();
        trace!("cancelled task skipped before execution");
    } else {
        let guard = ExecutingGuard::enter(stats.clone());
        item.future.await;
        stats.record_completed();
        drop(guard);
    }
    drop(permit);
    drop(tracker_token);
    if let Some(completion) = completion {
        let _ = completion.send(());
    }
}
