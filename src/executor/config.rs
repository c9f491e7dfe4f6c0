//! Configuration for the bounded executor

use crate::error::{ExecutorError, ExecutorResult};
use serde::{Deserialize, Serialize};

/// Execution mode of the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolMode {
    /// One task at a time, in admission order
    Serial,
    /// Admitted tasks run concurrently on the runtime
    Parallel,
}

/// Advisory quality-of-service class, recorded for diagnostics
///
/// Carried through configuration and logging only; the runtime schedules
/// all lanes identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QosHint {
    Background,
    Utility,
    #[default]
    Default,
    UserInitiated,
    UserInteractive,
}

/// Configuration for a bounded executor
///
/// # Examples
///
/// ```
/// use gatepool::{ExecutorConfig, PoolMode};
///
/// let config = ExecutorConfig::new("indexer", 4).with_pool_mode(PoolMode::Parallel);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.gate_label(), "indexer.gatekeeper");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Human-readable name; the gate and pool lane labels derive from it
    #[serde(default = "default_label")]
    pub label: String,

    /// Upper bound on simultaneously executing asynchronous submissions
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Whether admitted tasks run one at a time or concurrently
    #[serde(default = "default_pool_mode")]
    pub pool_mode: PoolMode,

    /// Advisory scheduling class
    #[serde(default)]
    pub qos: QosHint,

    /// Optional bound on the admission backlog
    /// If None, the backlog grows without limit
    #[serde(default)]
    pub backlog_limit: Option<usize>,
}

fn default_label() -> String {
    "gatepool".to_string()
}
fn default_max_concurrency() -> usize {
    3
}
fn default_pool_mode() -> PoolMode {
    PoolMode::Serial
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            max_concurrency: default_max_concurrency(),
            pool_mode: PoolMode::Serial,
            qos: QosHint::Default,
            backlog_limit: None,
        }
    }
}

impl ExecutorConfig {
    /// Create a configuration with a label and concurrency bound
    pub fn new(label: impl Into<String>, max_concurrency: usize) -> Self {
        Self {
            label: label.into(),
            max_concurrency,
            ..Default::default()
        }
    }

    /// Create a serial-pool configuration
    pub fn serial(label: impl Into<String>, max_concurrency: usize) -> Self {
        Self::new(label, max_concurrency)
    }

    /// Create a parallel-pool configuration
    pub fn parallel(label: impl Into<String>, max_concurrency: usize) -> Self {
        Self::new(label, max_concurrency).with_pool_mode(PoolMode::Parallel)
    }

    // ========== Builder methods ==========

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the concurrency bound
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Set the pool mode
    pub fn with_pool_mode(mut self, mode: PoolMode) -> Self {
        self.pool_mode = mode;
        self
    }

    /// Set the advisory QoS class
    pub fn with_qos(mut self, qos: QosHint) -> Self {
        self.qos = qos;
        self
    }

    /// Bound the admission backlog
    pub fn with_backlog_limit(mut self, limit: usize) -> Self {
        self.backlog_limit = Some(limit);
        self
    }

    /// Check for values the executor cannot honor
    pub fn validate(&self) -> ExecutorResult<()> {
        if self.max_concurrency == 0 {
            return Err(ExecutorError::InvalidMaxConcurrency { value: 0 });
        }
        if self.backlog_limit == Some(0) {
            return Err(ExecutorError::InvalidBacklogLimit);
        }
        Ok(())
    }

    /// Diagnostic label of the admission gate lane
    pub fn gate_label(&self) -> String {
        format!("{}.gatekeeper", self.label)
    }

    /// Diagnostic label of the worker pool lane
    pub fn job_label(&self) -> String {
        format!("{}.job", self.label)
    }
}
