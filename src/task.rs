//! Work items submitted to the executor

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A unit of work paired with a pre-execution cancellation flag
///
/// The flag is consulted exactly once, immediately before the body would
/// run. A cancelled item skips its body but still passes through the full
/// admission and slot-accounting cycle, so counters stay exact.
pub struct WorkItem {
    pub(crate) future: BoxFuture<'static, ()>,
    pub(crate) cancellation: CancellationToken,
}

impl WorkItem {
    /// Wrap a future as a cancellable work item
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            future: future.boxed(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Token for cancelling this item before it starts executing
    ///
    /// Cancelling after execution has started has no effect.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Mark the item as cancelled
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether the item has been marked cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItem")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
