//! Publish Failure Recovery
//!
//! Classifies a failed publish from its error text and runs one
//! category-specific remediation. Recovery never fails: every probe or retry
//! error only closes that avenue, and the caller always receives an outcome
//! with either a successful method or concrete manual steps.

mod classify;
mod probe;

pub use classify::{FailureCategory, classify_failure};
pub use probe::{HttpServiceProbe, ServiceProbe, ToolLocator, WhichToolLocator};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{PublishConfig, PublishCredentials};
use crate::constants::service;
use crate::publish::{PublishRequest, Publisher};

const DEFAULT_WEB_URL: &str = "https://structurizr.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub category: FailureCategory,
    pub succeeded: bool,
    /// How the publish was eventually made to work
    pub method: Option<String>,
    /// Short statement of what went wrong
    pub diagnosis: Option<String>,
    /// Manual steps when automated recovery did not succeed
    pub instructions: Vec<String>,
}

impl RecoveryOutcome {
    fn recovered(category: FailureCategory, method: impl Into<String>) -> Self {
        Self {
            category,
            succeeded: true,
            method: Some(method.into()),
            diagnosis: None,
            instructions: Vec::new(),
        }
    }

    fn exhausted(
        category: FailureCategory,
        diagnosis: impl Into<String>,
        instructions: Vec<String>,
    ) -> Self {
        Self {
            category,
            succeeded: false,
            method: None,
            diagnosis: Some(diagnosis.into()),
            instructions,
        }
    }
}

pub struct RecoveryCoordinator {
    publisher: Arc<dyn Publisher>,
    locator: Arc<dyn ToolLocator>,
    probe: Arc<dyn ServiceProbe>,
    publish: PublishConfig,
}

impl RecoveryCoordinator {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        locator: Arc<dyn ToolLocator>,
        probe: Arc<dyn ServiceProbe>,
        publish: PublishConfig,
    ) -> Self {
        Self {
            publisher,
            locator,
            probe,
            publish,
        }
    }

    /// Classify `error_text` and run the matching remediation
    pub async fn diagnose_and_retry(
        &self,
        error_text: &str,
        draft_path: &Path,
        credentials: Option<&PublishCredentials>,
    ) -> RecoveryOutcome {
        let category = classify_failure(error_text, &self.publish.tool_name);
        info!("Publish failed ({}), attempting recovery", category);

        let outcome = match category {
            FailureCategory::MissingTool => self.recover_missing_tool(draft_path, credentials).await,
            FailureCategory::AuthError => self.recover_auth(credentials).await,
            FailureCategory::NetworkError => self.recover_network(draft_path, credentials).await,
            FailureCategory::WorkspaceError => RecoveryOutcome::exhausted(
                category,
                "Workspace access error",
                workspace_instructions(),
            ),
            FailureCategory::Unknown => RecoveryOutcome::exhausted(
                category,
                "Could not auto-recover",
                manual_upload_instructions(draft_path),
            ),
        };

        if outcome.succeeded {
            info!(
                "Recovered via {}",
                outcome.method.as_deref().unwrap_or("unknown method")
            );
        } else {
            warn!(
                "Recovery exhausted: {}",
                outcome.diagnosis.as_deref().unwrap_or("no diagnosis")
            );
        }
        outcome
    }

    async fn recover_missing_tool(
        &self,
        draft_path: &Path,
        credentials: Option<&PublishCredentials>,
    ) -> RecoveryOutcome {
        let category = FailureCategory::MissingTool;

        let found = self
            .publish
            .probe_order()
            .iter()
            .find_map(|candidate| self.locator.locate(candidate));

        let Some(tool) = found else {
            return RecoveryOutcome::exhausted(
                category,
                format!("{} not found", self.publish.tool_name),
                install_instructions(&self.publish.tool_name),
            );
        };
        let tool = tool.to_string_lossy().into_owned();
        info!("Found publishing tool at {}", tool);

        let Some(creds) = credentials else {
            return RecoveryOutcome::exhausted(
                category,
                format!("Found {} but workspace credentials are incomplete", tool),
                manual_upload_instructions(draft_path),
            );
        };

        let retry = self
            .publisher
            .publish(PublishRequest::new(draft_path, creds).with_tool(&tool))
            .await;

        if retry.succeeded {
            RecoveryOutcome::recovered(category, format!("retry_with_tool_path:{}", tool))
        } else {
            RecoveryOutcome::exhausted(
                category,
                format!(
                    "Retry with {} failed: {}",
                    tool,
                    retry.error_text.as_deref().unwrap_or("unknown error")
                ),
                manual_upload_instructions(draft_path),
            )
        }
    }

    async fn recover_auth(&self, credentials: Option<&PublishCredentials>) -> RecoveryOutcome {
        let category = FailureCategory::AuthError;

        let Some(creds) = credentials else {
            return RecoveryOutcome::exhausted(
                category,
                "Missing workspace_id in config",
                vec![
                    "Add workspace_id to the [workspace_service] section of the config".to_string(),
                ],
            );
        };

        match self
            .probe
            .workspace_status(&creds.service_endpoint, &creds.workspace_id)
            .await
        {
            Ok(404) => RecoveryOutcome::exhausted(
                category,
                "Workspace not found",
                vec![
                    format!(
                        "Workspace {} does not exist or is private",
                        creds.workspace_id
                    ),
                    "Check workspace_id in the config".to_string(),
                    format!("Verify the workspace exists at {}", creds.workspace_url()),
                ],
            ),
            other => {
                if let Err(e) = other {
                    warn!("Workspace probe failed: {}", e);
                }
                RecoveryOutcome::exhausted(
                    category,
                    "Authentication failed",
                    credential_instructions(creds),
                )
            }
        }
    }

    async fn recover_network(
        &self,
        draft_path: &Path,
        credentials: Option<&PublishCredentials>,
    ) -> RecoveryOutcome {
        let category = FailureCategory::NetworkError;
        let web_url = credentials.map_or(DEFAULT_WEB_URL, |c| c.web_url.as_str());

        let healthy = match self.probe.connectivity_status(web_url).await {
            Ok(status) => (200..300).contains(&status),
            Err(e) => {
                warn!("Connectivity probe failed: {}", e);
                false
            }
        };

        if healthy && let Some(creds) = credentials {
            info!("Network looks healthy, retrying publish once");
            let retry = self
                .publisher
                .publish(PublishRequest::new(draft_path, creds))
                .await;
            if retry.succeeded {
                return RecoveryOutcome::recovered(category, "retry_upload");
            }
        }

        RecoveryOutcome::exhausted(
            category,
            "Network connectivity issues",
            network_instructions(),
        )
    }
}

fn install_instructions(tool_name: &str) -> Vec<String> {
    vec![
        format!("Install {}:", tool_name),
        format!("1. Download from {}", service::TOOL_RELEASES_URL),
        "2. Extract to a directory in your PATH".to_string(),
        format!(
            "3. Or set publish.tool_path in the config: tool_path = \"/path/to/{}\"",
            tool_name
        ),
        String::new(),
        format!("Alternative: Manual upload to {}", service::MANUAL_UPLOAD_URL),
    ]
}

fn credential_instructions(creds: &PublishCredentials) -> Vec<String> {
    vec![
        "Check API credentials in the config:".to_string(),
        "1. Verify credential_id and credential_secret are correct".to_string(),
        "2. Check workspace_id matches your workspace".to_string(),
        "3. Ensure the workspace allows API access".to_string(),
        String::new(),
        format!("Get credentials from: {}/settings", creds.workspace_url()),
    ]
}

fn network_instructions() -> Vec<String> {
    vec![
        "Network error occurred:".to_string(),
        "1. Check internet connection".to_string(),
        "2. Try again in a few minutes".to_string(),
        "3. Check if a corporate firewall blocks structurizr.com".to_string(),
        String::new(),
        format!("Alternative: Manual upload to {}", service::MANUAL_UPLOAD_URL),
    ]
}

fn workspace_instructions() -> Vec<String> {
    vec![
        "Workspace error:".to_string(),
        "1. Verify workspace ID is correct".to_string(),
        "2. Check workspace permissions".to_string(),
        "3. Ensure workspace exists and is accessible".to_string(),
        String::new(),
        format!("Alternative: Create a new workspace at {}", DEFAULT_WEB_URL),
    ]
}

/// Steps for pasting a draft into the browser editor
pub fn manual_upload_instructions(draft_path: &Path) -> Vec<String> {
    vec![
        "Manual upload required:".to_string(),
        format!("1. Open file: {}", draft_path.display()),
        "2. Copy the DSL content".to_string(),
        format!("3. Go to: {}", service::MANUAL_UPLOAD_URL),
        "4. Paste and click 'Render'".to_string(),
    ]
}
