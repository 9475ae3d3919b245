//! Structurizr CLI Publisher
//!
//! Runs `<tool> push -id <id> -key <key> -secret <secret> -w <file>`.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{PublishOutcome, PublishRequest, Publisher};
use crate::ai::with_timeout_map;
use crate::config::PublishConfig;

pub struct StructurizrCliPublisher {
    tool: String,
    timeout: Duration,
}

impl StructurizrCliPublisher {
    pub fn new(tool: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tool: tool.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PublishConfig) -> Self {
        Self::new(config.tool(), Duration::from_secs(config.timeout_secs))
    }

    fn command(&self, tool: &str, request: &PublishRequest<'_>) -> Command {
        let creds = request.credentials;
        let mut cmd = Command::new(tool);
        cmd.arg("push")
            .arg("-id")
            .arg(&creds.workspace_id)
            .arg("-key")
            .arg(&creds.api_key)
            .arg("-secret")
            .arg(creds.api_secret.expose_secret())
            .arg("-w")
            .arg(request.draft_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Publisher for StructurizrCliPublisher {
    async fn publish(&self, request: PublishRequest<'_>) -> PublishOutcome {
        let tool = request.tool_override.unwrap_or(&self.tool);

        if !request.draft_path.is_file() {
            return PublishOutcome::failure(format!(
                "Draft file missing: {}",
                request.draft_path.display()
            ));
        }

        info!(
            "Publishing {} to workspace {} with {}",
            request.draft_path.display(),
            request.credentials.workspace_id,
            tool
        );

        let child = match self.command(tool, &request).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Publishing tool not found: {}", tool);
                return PublishOutcome::failure(format!("command not found: {}", tool));
            }
            Err(e) => return PublishOutcome::failure(format!("failed to start {}: {}", tool, e)),
        };

        let output = match with_timeout_map(self.timeout, child.wait_with_output(), "publish").await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return PublishOutcome::failure(format!("{} failed: {}", tool, e)),
            Err(e) => return PublishOutcome::failure(e.to_string()),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{} output: {}", tool, stdout.trim());

        if output.status.success() {
            return PublishOutcome::success(request.credentials.workspace_url());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = [stderr.trim(), stdout.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let text = if combined.is_empty() {
            format!("{} exited with {}", tool, output.status)
        } else {
            combined
        };
        PublishOutcome::failure(text)
    }
}
