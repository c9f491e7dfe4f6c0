//! Single-lane FIFO admission gate

use crate::error::{ExecutorError, ExecutorResult};
use crate::task::WorkItem;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tracing::debug;

use super::limiter::ConcurrencyLimiter;
use super::pool::{PoolJob, WorkerPool};
use super::types::StatsInner;

/// A queued submission on its way to the worker pool
pub(crate) struct Submission {
    pub(crate) item: WorkItem,
    pub(crate) tracker_token: Option<TaskTrackerToken>,
}

/// FIFO stage owning the only wait on the concurrency limiter
///
/// All asynchronous submissions flow through one consumer task, so no
/// matter how deep the backlog grows, exactly one lane is ever parked in
/// an acquire.
#[derive(Debug)]
pub(crate) struct AdmissionGate {
    sender: Mutex<Option<mpsc::UnboundedSender<Submission>>>,
    consumer: Mutex<Option<JoinHandle<()>>>,
    backlog_limit: Option<usize>,
    stats: Arc<StatsInner>,
}

impl AdmissionGate {
    /// Spawn the gate consumer on the given runtime
    pub(crate) fn start(
        label: String,
        limiter: ConcurrencyLimiter,
        pool: WorkerPool,
        backlog_limit: Option<usize>,
        stats: Arc<StatsInner>,
        runtime: &Handle,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let consumer = runtime.spawn(gate_loop(label, receiver, limiter, pool, stats.clone()));
        Self {
            sender: Mutex::new(Some(sender)),
            consumer: Mutex::new(Some(consumer)),
            backlog_limit,
            stats,
        }
    }

    /// Queue a submission; never waits
    pub(crate) fn submit(&self, submission: Submission) -> ExecutorResult<()> {
        if let Some(limit) = self.backlog_limit {
            let pending = self.stats.backlog_enter();
            if pending >= limit {
                self.stats.backlog_exit();
                return Err(ExecutorError::BacklogFull { limit });
            }
        } else {
            self.stats.backlog_enter();
        }

        let sent = match &*self.sender.lock() {
            Some(sender) => sender.send(submission).is_ok(),
            None => false,
        };
        if !sent {
            self.stats.backlog_exit();
            return Err(ExecutorError::ShutDown);
        }
        self.stats.record_submitted();
        Ok(())
    }

    /// Stop accepting submissions and wait for the backlog to drain
    pub(crate) async fn close(&self) {
        drop(self.sender.lock().take());
        let consumer = self.consumer.lock().take();
        if let Some(consumer) = consumer {
            let _ = consumer.await;
        }
    }
}

async fn gate_loop(
    label: String,
    mut receiver: mpsc::UnboundedReceiver<Submission>,
    limiter: ConcurrencyLimiter,
    pool: WorkerPool,
    stats: Arc<StatsInner>,
) {
    debug!("admission gate '{}' started", label);
    while let Some(Submission {
        item,
        tracker_token,
    }) = receiver.recv().await
    {
        stats.backlog_exit();
        let permit = match limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        if pool
            .dispatch(PoolJob::gated(item, permit, tracker_token))
            .is_err()
        {
            debug!("admission gate '{}' stopping: worker pool closed", label);
            break;
        }
    }
    debug!("admission gate '{}' drained", label);
}
