//! Statistics for the bounded executor

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Point-in-time snapshot of executor activity
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorStats {
    /// Tasks accepted through the admission gate
    pub submitted: usize,
    /// Task bodies that ran to completion
    pub completed: usize,
    /// Tasks skipped because they were cancelled before execution
    pub skipped: usize,
    /// Tasks run through the direct (caller-suspending) path
    pub direct_runs: usize,
    /// Tasks currently executing, direct runs included
    pub executing: usize,
    /// Highest simultaneous execution count observed, direct runs included
    pub peak_executing: usize,
    /// Submissions waiting in the admission backlog
    pub backlog: usize,
}

/// Shared atomic counters behind the snapshot
#[derive(Debug, Default)]
pub(crate) struct StatsInner {
    submitted: AtomicUsize,
    completed: AtomicUsize,
    skipped: AtomicUsize,
    direct_runs: AtomicUsize,
    executing: AtomicUsize,
    peak_executing: AtomicUsize,
    backlog: AtomicUsize,
}

impl StatsInner {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_direct_run(&self) {
        self.direct_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Reserve a backlog slot; returns the depth before this reservation
    pub(crate) fn backlog_enter(&self) -> usize {
        self.backlog.fetch_add(1, Ordering::AcqRel)
    }

    pub(crate) fn backlog_exit(&self) {
        self.backlog.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn snapshot(&self) -> ExecutorStats {
        ExecutorStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            direct_runs: self.direct_runs.load(Ordering::Relaxed),
            executing: self.executing.load(Ordering::Relaxed),
            peak_executing: self.peak_executing.load(Ordering::Relaxed),
            backlog: self.backlog.load(Ordering::Relaxed),
        }
    }
}

/// RAII marker for one executing task; panic-safe via Drop
pub(crate) struct ExecutingGuard {
    stats: Arc<StatsInner>,
}

impl ExecutingGuard {
    pub(crate) fn enter(stats: Arc<StatsInner>) -> Self {
        let now = stats.executing.fetch_add(1, Ordering::AcqRel) + 1;
        stats.peak_executing.fetch_max(now, Ordering::AcqRel);
        Self { stats }
    }
}

impl Drop for ExecutingGuard {
    fn drop(&mut self) {
        self.stats.executing.fetch_sub(1, Ordering::AcqRel);
    }
}
