//! Bounded-concurrency task executor with a single-lane admission gate
//!
//! At most a configured number of submitted tasks execute at once, while
//! submission itself never blocks. A dedicated gate task is the only lane
//! that ever waits on the concurrency limiter, so a backlog of thousands
//! parks one task, not thousands.
//!
//! # Quick start
//!
//! ```
//! use gatepool::BoundedExecutor;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> gatepool::ExecutorResult<()> {
//! let executor = BoundedExecutor::new("mailer", 3)?;
//! executor.submit(async {
//!     // deliver one message
//! })?;
//! executor.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod task;

pub use error::{ExecutorError, ExecutorResult};
pub use executor::{
    BoundedExecutor, BoundedExecutorBuilder, ConcurrencyLimiter, ExecutorConfig, ExecutorStats,
    PoolMode, QosHint, SlotPermit,
};
pub use task::WorkItem;
