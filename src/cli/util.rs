//! CLI Common Utilities
//!
//! Shared context plus the publish-with-recovery flow used by `upload`,
//! `monitor` and `process`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::ui::Output;
use crate::ai::TimeoutConfig;
use crate::config::{Config, ConfigLoader, PublishCredentials};
use crate::constants::service;
use crate::publish::{PublishRequest, Publisher, StructurizrCliPublisher, open_in_browser};
use crate::recovery::{
    HttpServiceProbe, RecoveryCoordinator, RecoveryOutcome, WhichToolLocator,
    manual_upload_instructions,
};
use crate::types::Result;

/// Command execution context
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Explicit `--config` path, if any
    pub config_path: Option<PathBuf>,
    pub output: Output,
}

impl CommandContext {
    pub fn load(config_path: Option<&Path>, quiet: bool) -> Result<Self> {
        let config = ConfigLoader::load(config_path)?;
        Ok(Self {
            config,
            config_path: config_path.map(Path::to_path_buf),
            output: Output::new(quiet),
        })
    }

    /// Context with built-in defaults, for commands that must not read config
    pub fn with_defaults(quiet: bool) -> Self {
        Self {
            config: Config::default(),
            config_path: None,
            output: Output::new(quiet),
        }
    }

    /// Complete workspace credentials, if configured
    pub fn credentials(&self) -> Option<PublishCredentials> {
        self.config
            .workspace_service
            .as_ref()
            .and_then(|ws| ws.credentials())
    }

    pub fn auto_open(&self, no_browser: bool) -> bool {
        !no_browser
            && self
                .config
                .workspace_service
                .as_ref()
                .is_some_and(|ws| ws.auto_open)
    }

    /// Publisher plus a recovery coordinator sharing it
    pub fn publishing(&self) -> Result<(Arc<dyn Publisher>, RecoveryCoordinator)> {
        let timeouts = TimeoutConfig::from_config(&self.config);
        let publisher: Arc<dyn Publisher> =
            Arc::new(StructurizrCliPublisher::from_config(&self.config.publish));
        let recovery = RecoveryCoordinator::new(
            publisher.clone(),
            Arc::new(WhichToolLocator),
            Arc::new(HttpServiceProbe::new(timeouts.service_probe)?),
            self.config.publish.clone(),
        );
        Ok((publisher, recovery))
    }

    /// Open a workspace link unless disabled; failures only warn
    pub fn open_workspace(&self, url: &str, no_browser: bool) {
        if !self.auto_open(no_browser) {
            return;
        }
        if let Err(e) = open_in_browser(url) {
            warn!("Could not open browser: {}", e);
            self.output
                .warning(&format!("Could not open browser, visit {} manually", url));
        }
    }
}

/// Publish one draft file, running recovery once if the first attempt fails.
/// Returns whether the draft ended up in the workspace.
pub async fn upload_draft(ctx: &CommandContext, draft: &Path, no_browser: bool) -> Result<bool> {
    let Some(credentials) = ctx.credentials() else {
        ctx.output.warning("Workspace service credentials not configured");
        ctx.output.list(&not_configured_instructions(draft));
        return Ok(false);
    };

    let (publisher, recovery) = ctx.publishing()?;

    ctx.output
        .step(&format!("Publishing {}", draft.display()));
    let outcome = publisher
        .publish(PublishRequest::new(draft, &credentials))
        .await;

    if outcome.succeeded {
        let url = outcome
            .workspace_reference
            .unwrap_or_else(|| credentials.workspace_url());
        ctx.output.success("Upload successful");
        ctx.output.info(&format!("View at: {}", url));
        ctx.open_workspace(&url, no_browser);
        return Ok(true);
    }

    let error_text = outcome.error_text.unwrap_or_default();
    ctx.output.error("Upload failed");
    if !error_text.is_empty() {
        ctx.output.detail(&error_text);
    }

    let recovery = recovery
        .diagnose_and_retry(&error_text, draft, Some(&credentials))
        .await;
    report_recovery(ctx, &recovery);

    if recovery.succeeded {
        let url = credentials.workspace_url();
        ctx.output.info(&format!("View at: {}", url));
        ctx.open_workspace(&url, no_browser);
    }
    Ok(recovery.succeeded)
}

fn report_recovery(ctx: &CommandContext, recovery: &RecoveryOutcome) {
    ctx.output
        .section(&format!("Recovery ({})", recovery.category));
    if recovery.succeeded {
        ctx.output.success(&format!(
            "Recovered via {}",
            recovery.method.as_deref().unwrap_or("unknown method")
        ));
    } else {
        ctx.output
            .error(recovery.diagnosis.as_deref().unwrap_or("Recovery failed"));
        ctx.output.list(&recovery.instructions);
    }
}

fn not_configured_instructions(draft: &Path) -> Vec<String> {
    let mut lines = manual_upload_instructions(draft);
    lines.push(String::new());
    lines.push(format!(
        "Or configure the API: get credentials from {}",
        service::API_HELP_URL
    ));
    lines.push(
        "then set credential_id, credential_secret and workspace_id under [workspace_service]"
            .to_string(),
    );
    lines
}

/// Poll until `path` exists or `wait` elapses
pub async fn wait_for_file(path: &Path, wait: Duration, poll: Duration) -> bool {
    let deadline = Instant::now() + wait;
    loop {
        if path.exists() {
            return true;
        }
        if Instant::now() >= deadline {
            debug!("Gave up waiting for {}", path.display());
            return false;
        }
        tokio::time::sleep(poll).await;
    }
}
