//! Builder pattern for BoundedExecutor

use crate::error::ExecutorResult;
use tokio::runtime::Handle;

use super::config::{ExecutorConfig, PoolMode, QosHint};
use super::executor::BoundedExecutor;

/// Builder for [`BoundedExecutor`]
#[derive(Debug)]
pub struct BoundedExecutorBuilder {
    config: ExecutorConfig,
    runtime: Option<Handle>,
}

impl BoundedExecutorBuilder {
    pub fn new() -> Self {
        Self {
            config: ExecutorConfig::default(),
            runtime: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.config.max_concurrency = max;
        self
    }

    pub fn with_pool_mode(mut self, mode: PoolMode) -> Self {
        self.config.pool_mode = mode;
        self
    }

    pub fn with_qos(mut self, qos: QosHint) -> Self {
        self.config.qos = qos;
        self
    }

    pub fn with_backlog_limit(mut self, limit: usize) -> Self {
        self.config.backlog_limit = Some(limit);
        self
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the executor's lanes on a specific runtime
    pub fn on_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validate the configuration and start the executor
    pub fn build(self) -> ExecutorResult<BoundedExecutor> {
        match self.runtime {
            Some(runtime) => BoundedExecutor::with_config_on(self.config, runtime),
            None => BoundedExecutor::with_config(self.config),
        }
    }
}

impl Default for BoundedExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
