//! Process Command
//!
//! Wait briefly for a freshly generated draft, then upload it.
//!
//! Usage:
//!   c4flow process --file <path>

use std::path::Path;
use std::time::Duration;

use crate::cli::util::{CommandContext, upload_draft, wait_for_file};
use crate::constants::monitor;
use crate::types::Result;

pub async fn run(ctx: &CommandContext, file: &Path, no_browser: bool) -> Result<bool> {
    if !file.exists() {
        ctx.output
            .info(&format!("Waiting for DSL file: {}", file.display()));
    }

    let appeared = wait_for_file(
        file,
        Duration::from_secs(monitor::PROCESS_WAIT_SECS),
        Duration::from_secs(1),
    )
    .await;

    if !appeared {
        ctx.output.error(&format!(
            "DSL file not found after waiting: {}",
            file.display()
        ));
        return Ok(false);
    }

    upload_draft(ctx, file, no_browser).await
}
