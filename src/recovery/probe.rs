//! Environment probes used while recovering from a failed publish.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::types::{FlowError, Result};

/// Resolves a tool name or path to an executable
pub trait ToolLocator: Send + Sync {
    fn locate(&self, candidate: &str) -> Option<PathBuf>;
}

/// `PATH` lookup for bare names, existence check for paths
#[derive(Debug, Clone, Copy, Default)]
pub struct WhichToolLocator;

impl ToolLocator for WhichToolLocator {
    fn locate(&self, candidate: &str) -> Option<PathBuf> {
        let found = which::which(candidate).ok();
        debug!("Locating {}: {:?}", candidate, found);
        found
    }
}

/// HTTP reachability checks against the workspace service
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    /// Status of `HEAD {service_endpoint}/workspace/{id}`
    async fn workspace_status(&self, service_endpoint: &str, workspace_id: &str) -> Result<u16>;

    /// Status of `GET {web_url}`
    async fn connectivity_status(&self, web_url: &str) -> Result<u16>;
}

pub struct HttpServiceProbe {
    client: reqwest::Client,
}

impl HttpServiceProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlowError::Publish(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ServiceProbe for HttpServiceProbe {
    async fn workspace_status(&self, service_endpoint: &str, workspace_id: &str) -> Result<u16> {
        let url = format!(
            "{}/workspace/{}",
            service_endpoint.trim_end_matches('/'),
            workspace_id
        );
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| FlowError::Publish(format!("Workspace probe failed: {}", e)))?;
        debug!("HEAD {} -> {}", url, response.status());
        Ok(response.status().as_u16())
    }

    async fn connectivity_status(&self, web_url: &str) -> Result<u16> {
        let response = self
            .client
            .get(web_url)
            .send()
            .await
            .map_err(|e| FlowError::Publish(format!("Connectivity probe failed: {}", e)))?;
        debug!("GET {} -> {}", web_url, response.status());
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_which_locator_misses_unknown_tool() {
        assert!(WhichToolLocator.locate("c4flow-no-such-tool-xyz").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_which_locator_finds_shell() {
        assert!(WhichToolLocator.locate("sh").is_some());
    }

    #[tokio::test]
    async fn test_probe_error_on_unroutable_host() {
        let probe = HttpServiceProbe::new(Duration::from_millis(500)).unwrap();
        assert!(
            probe
                .connectivity_status("http://c4flow.invalid")
                .await
                .is_err()
        );
    }
}
