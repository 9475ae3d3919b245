//! Workspace Publishing
//!
//! Pushes a persisted draft to the workspace service. Failures are reported
//! as raw error text inside `PublishOutcome`; classifying them is the job of
//! the recovery coordinator.

mod browser;
mod structurizr;

pub use browser::open_in_browser;
pub use structurizr::StructurizrCliPublisher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::PublishCredentials;

/// One publish attempt
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub draft_path: &'a Path,
    pub credentials: &'a PublishCredentials,
    /// Tool location to use instead of the configured one
    pub tool_override: Option<&'a str>,
}

impl<'a> PublishRequest<'a> {
    pub fn new(draft_path: &'a Path, credentials: &'a PublishCredentials) -> Self {
        Self {
            draft_path,
            credentials,
            tool_override: None,
        }
    }

    pub fn with_tool(mut self, tool: &'a str) -> Self {
        self.tool_override = Some(tool);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub succeeded: bool,
    /// Raw stderr/stdout or spawn error when the attempt failed
    pub error_text: Option<String>,
    /// Browser link for the published workspace
    pub workspace_reference: Option<String>,
}

impl PublishOutcome {
    pub fn success(workspace_reference: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            error_text: None,
            workspace_reference: Some(workspace_reference.into()),
        }
    }

    pub fn failure(error_text: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error_text: Some(error_text.into()),
            workspace_reference: None,
        }
    }
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Never fails; every problem is folded into the outcome
    async fn publish(&self, request: PublishRequest<'_>) -> PublishOutcome;
}
