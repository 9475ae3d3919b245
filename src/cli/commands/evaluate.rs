//! Evaluate Command
//!
//! Analyze and classify a codebase without drafting anything.
//!
//! Usage:
//!   c4flow evaluate <codebase> [--format text|json]

use std::path::Path;

use crate::cli::util::CommandContext;
use crate::pipeline::Pipeline;
use crate::types::Result;

/// Exit status follows the verdict: success when a diagram can be drafted
pub async fn run(ctx: &CommandContext, codebase: &Path, format: &str) -> Result<bool> {
    let pipeline = Pipeline::from_config(&ctx.config)?;
    let state = pipeline.evaluate(codebase, None).await?;

    if format == "json" {
        ctx.output.plain(&serde_json::to_string_pretty(&state)?);
    } else if let Some(summary) = state.summary_text() {
        ctx.output.plain(summary);
    }

    Ok(state.decision().is_some_and(|d| d.can_proceed))
}
