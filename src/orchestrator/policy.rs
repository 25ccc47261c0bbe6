//! Retry and timeout policy for one task

use crate::config::OrchestrationConfig;
use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which failures the orchestrator retries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryOn {
    /// Retry every failure
    #[default]
    AllFailures,
    /// Fail fast on structural errors (schema, empty data, shapes, bad
    /// artifacts, bad labels); retry the rest
    TransientOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskPolicy {
    /// Retries after the first attempt; `3` allows four attempts
    pub retries: u32,
    pub retry_delay: Duration,
    pub exponential_backoff: bool,
    pub max_retry_delay: Duration,
    pub execution_timeout: Duration,
    pub retry_on: RetryOn,
}

impl Default for TaskPolicy {
    fn default() -> Self {
        Self::from(&OrchestrationConfig::default())
    }
}

impl From<&OrchestrationConfig> for TaskPolicy {
    fn from(config: &OrchestrationConfig) -> Self {
        Self {
            retries: config.retries,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            exponential_backoff: config.exponential_backoff,
            max_retry_delay: Duration::from_secs(config.max_retry_delay_secs),
            execution_timeout: Duration::from_secs(config.execution_timeout_secs),
            retry_on: config.retry_on,
        }
    }
}

impl TaskPolicy {
    /// No retries, the default timeout
    pub fn no_retry() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_max_retry_delay(mut self, delay: Duration) -> Self {
        self.max_retry_delay = delay;
        self
    }

    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    pub fn with_retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }

    /// Delay after the `failed_attempts`-th failure (1-based):
    /// `min(retry_delay * 2^(n-1), max_retry_delay)` with backoff enabled
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        let delay = if self.exponential_backoff {
            let factor = 2u32.saturating_pow(failed_attempts.saturating_sub(1));
            self.retry_delay.saturating_mul(factor)
        } else {
            self.retry_delay
        };
        delay.min(self.max_retry_delay)
    }

    /// Whether another attempt follows `failed_attempts` failures ending in `kind`
    pub fn should_retry(&self, kind: ErrorKind, failed_attempts: u32) -> bool {
        if failed_attempts > self.retries {
            return false;
        }
        match self.retry_on {
            RetryOn::AllFailures => true,
            RetryOn::TransientOnly => !kind.is_structural(),
        }
    }

    /// Upper bound on attempts for one task
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}
