//! Unified Timeout Configuration
//!
//! Operation timeouts resolved from `Config`, plus helpers for wrapping
//! async operations.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::{TimeoutConfig, with_timeout};
//!
//! let timeouts = TimeoutConfig::from_config(&config);
//! let result = with_timeout(
//!     timeouts.llm_request,
//!     async { /* LLM call */ },
//!     "LLM request"
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::types::{FlowError, Result};

/// Timeouts for every external call the pipeline makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// LLM API requests and CLI invocations
    pub llm_request: Duration,
    /// Publishing tool subprocess
    pub tool_process: Duration,
    /// Workspace and connectivity probes
    pub service_probe: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TimeoutConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            llm_request: Duration::from_secs(config.llm.timeout_secs),
            tool_process: Duration::from_secs(config.publish.timeout_secs),
            service_probe: Duration::from_secs(config.publish.probe_timeout_secs),
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
///
/// # Arguments
///
/// * `timeout` - Maximum duration to wait
/// * `future` - The async operation to execute
/// * `operation_name` - Description of the operation (for error messages)
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(FlowError::timeout(operation_name, timeout)),
    }
}

/// Execute an async operation with a timeout, mapping the inner result
///
/// This variant accepts futures that return non-Result types and wraps them.
pub async fn with_timeout_map<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => Ok(result),
        Err(_) => Err(FlowError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.llm_request.as_secs(), 300);
        assert_eq!(config.tool_process.as_secs(), 30);
        assert_eq!(config.service_probe.as_secs(), 5);
    }

    #[test]
    fn test_timeout_config_follows_config() {
        let mut config = Config::default();
        config.publish.probe_timeout_secs = 9;
        assert_eq!(
            TimeoutConfig::from_config(&config).service_probe,
            Duration::from_secs(9)
        );
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, FlowError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, FlowError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), FlowError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_with_timeout_map_wraps_value() {
        let result = with_timeout_map(Duration::from_secs(1), async { "done" }, "quick").await;
        assert_eq!(result.unwrap(), "done");
    }
}
