//! Bounded-concurrency task execution with single-lane admission
//!
//! This module provides an executor that:
//! - Caps simultaneously executing tasks at a configured maximum
//! - Never blocks the submitting task or thread
//! - Admits tasks strictly in submission order through a dedicated gate
//! - Runs admitted work on a serial or parallel pool lane
//! - Supports pre-execution cancellation and batch completion tracking

mod builder;
mod config;
mod executor;
mod gate;
mod limiter;
mod pool;
mod types;

pub use builder::BoundedExecutorBuilder;
pub use config::{ExecutorConfig, PoolMode, QosHint};
pub use executor::BoundedExecutor;
pub use limiter::{ConcurrencyLimiter, SlotPermit};
pub use types::ExecutorStats;

#[cfg(test)]
mod tests;
