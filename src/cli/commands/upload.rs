//! Upload Command
//!
//! Publish one draft file to the workspace service.
//!
//! Usage:
//!   c4flow upload <file> [--no-browser]

use chrono::{DateTime, Local};
use std::path::Path;

use crate::cli::util::{CommandContext, upload_draft};
use crate::types::Result;

pub async fn run(ctx: &CommandContext, file: &Path, no_browser: bool) -> Result<bool> {
    if !file.is_file() {
        ctx.output
            .error(&format!("DSL file not found: {}", file.display()));
        return Ok(false);
    }

    let meta = std::fs::metadata(file)?;
    ctx.output.info(&format!("Uploading DSL file: {}", file.display()));
    ctx.output.detail(&format!("Size: {} bytes", meta.len()));
    if let Ok(modified) = meta.modified() {
        let modified: DateTime<Local> = modified.into();
        ctx.output
            .detail(&format!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S")));
    }

    upload_draft(ctx, file, no_browser).await
}
