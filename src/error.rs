//! Error types for the bounded executor

use thiserror::Error;

/// Result type used throughout the crate
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;

/// Errors surfaced by executor construction and submission
///
/// Task-body failures are deliberately absent: what a task does while it
/// runs is the task's own concern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Maximum concurrency must allow at least one task
    #[error("Invalid max concurrency: {value} (must be > 0)")]
    InvalidMaxConcurrency { value: usize },

    /// A backlog limit of zero would reject every submission
    #[error("Invalid backlog limit: 0 (omit the limit for an unbounded backlog)")]
    InvalidBacklogLimit,

    /// The configured admission backlog is full
    #[error("Admission backlog is full ({limit} submissions pending)")]
    BacklogFull { limit: usize },

    /// The executor no longer accepts work
    #[error("Executor has been shut down")]
    ShutDown,

    /// Constructed outside a tokio runtime without an explicit handle
    #[error("No tokio runtime available to host the executor lanes")]
    NoRuntime,
}
