//! Counting-slot concurrency limiter

use crate::error::{ExecutorError, ExecutorResult};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting semaphore that caps simultaneous executions
///
/// A slot is held for exactly as long as the returned [`SlotPermit`] is
/// alive. Dropping the permit is the only release path, so a slot can
/// never be released twice nor leaked across a panic.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_slots: usize,
}

impl ConcurrencyLimiter {
    /// Create a limiter with the given number of slots
    pub fn new(max_slots: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_slots)),
            max_slots,
        }
    }

    /// Wait until a slot is free and take it
    pub async fn acquire(&self) -> ExecutorResult<SlotPermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ExecutorError::ShutDown)?;
        Ok(SlotPermit { _permit: permit })
    }

    /// Number of slots currently free
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of slots currently held
    pub fn slots_in_use(&self) -> usize {
        self.max_slots - self.semaphore.available_permits()
    }

    /// Total number of slots
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }
}

/// Held concurrency slot; dropping it releases the slot
#[derive(Debug)]
pub struct SlotPermit {
    _permit: OwnedSemaphorePermit,
}
