//! Monitor Command
//!
//! Poll a directory for the newest `*_c4.dsl` and upload it once it appears.
//!
//! Usage:
//!   c4flow monitor [dir] [--interval 2] [--timeout 60]

use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::cli::util::{CommandContext, upload_draft};
use crate::constants::monitor::SETTLE_DELAY_MS;
use crate::diagram::latest_draft;
use crate::types::{FlowError, Result};

pub struct MonitorOptions {
    pub interval: Duration,
    pub timeout: Duration,
    pub no_browser: bool,
}

pub async fn run(ctx: &CommandContext, dir: &Path, options: MonitorOptions) -> Result<bool> {
    if !dir.is_dir() {
        return Err(FlowError::invalid_path(dir, "not a directory"));
    }

    ctx.output
        .info(&format!("Monitoring for DSL files in: {}", dir.display()));
    ctx.output.detail(&format!(
        "Check interval: {}s, max wait: {}s",
        options.interval.as_secs(),
        options.timeout.as_secs()
    ));

    let Some(draft) = poll_for_draft(dir, options.interval, options.timeout).await else {
        ctx.output.error(&format!(
            "No DSL file found within {} seconds",
            options.timeout.as_secs()
        ));
        return Ok(false);
    };

    ctx.output
        .success(&format!("DSL file detected: {}", draft.display()));
    // let the writer finish
    tokio::time::sleep(Duration::from_millis(SETTLE_DELAY_MS)).await;

    upload_draft(ctx, &draft, options.no_browser).await
}

async fn poll_for_draft(
    dir: &Path,
    interval: Duration,
    timeout: Duration,
) -> Option<std::path::PathBuf> {
    let started = Instant::now();
    while started.elapsed() < timeout {
        if let Some(found) = latest_draft(dir) {
            info!("Found draft {}", found.display());
            return Some(found);
        }
        debug!("No draft yet in {}", dir.display());
        tokio::time::sleep(interval).await;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_poll_finds_draft_written_later() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();
        let target = dir.join("shop_c4.dsl");
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            std::fs::write(target, "workspace {}").unwrap();
        });

        let found = poll_for_draft(&dir, Duration::from_millis(10), Duration::from_secs(2)).await;
        writer.await.unwrap();
        assert_eq!(found, Some(dir.join("shop_c4.dsl")));
    }

    #[tokio::test]
    async fn test_poll_gives_up_after_timeout() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), "not a draft").unwrap();
        let found = poll_for_draft(
            temp.path(),
            Duration::from_millis(10),
            Duration::from_millis(30),
        )
        .await;
        assert!(found.is_none());
    }
}
