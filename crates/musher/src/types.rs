//! Configuration and execution statistics for the pool

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Configuration for the musher executor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Number of concurrent workers the pool starts per batch
    ///
    /// The bound is advisory with respect to the batch size: a value larger
    /// than the number of tasks is tolerated, and the excess workers simply
    /// find nothing to claim and terminate immediately.
    pub concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get(),
        }
    }
}

impl ExecutorConfig {
    /// Create a new executor configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of concurrent workers
    pub fn with_concurrency(mut self, concurrency: usize) -> ConfigResult<Self> {
        if concurrency == 0 {
            return Err(ConfigError::invalid_concurrency(concurrency));
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::invalid_concurrency(self.concurrency));
        }
        Ok(())
    }

    /// Serial configuration, useful for deterministic tests
    pub fn for_testing() -> Self {
        Self { concurrency: 1 }
    }
}

/// Statistics for one executed batch
///
/// Delivered in the final
/// [`TaskExecutionEvent::Completed`](crate::TaskExecutionEvent::Completed)
/// event. Diagnostics only; the pool's contract is the returned outcome
/// sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Number of tasks in the batch
    pub total_tasks: usize,

    /// Number of tasks that completed successfully
    pub successful_tasks: usize,

    /// Number of tasks whose failure was captured
    pub failed_tasks: usize,

    /// Workers that claimed at least one task (at most
    /// `min(concurrency, total_tasks)`)
    pub workers_engaged: usize,

    /// Wall-clock duration of the batch
    pub total_duration: Duration,

    /// Tasks per second over the whole batch
    pub tasks_per_second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.concurrency > 0);
    }

    #[test]
    fn test_config_builder() {
        let config = ExecutorConfig::new().with_concurrency(4).unwrap();
        assert_eq!(config.concurrency, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(ExecutorConfig::new().with_concurrency(0).is_err());

        let config = ExecutorConfig { concurrency: 0 };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidConcurrency { value: 0 })
        );
    }

    #[test]
    fn test_testing_preset() {
        let config = ExecutorConfig::for_testing();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_stats_default() {
        let stats = ExecutionStats::default();
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.successful_tasks, 0);
        assert_eq!(stats.failed_tasks, 0);
        assert_eq!(stats.workers_engaged, 0);
        assert_eq!(stats.tasks_per_second, 0.0);
    }
}
