//! Complete Command
//!
//! Full pipeline: analyze, classify, draft, publish (with recovery), summarize.
//!
//! Usage:
//!   c4flow complete <codebase> [--name N] [--no-browser]

use std::path::Path;

use crate::cli::util::CommandContext;
use crate::pipeline::{Pipeline, PipelineState};
use crate::types::Result;

pub async fn run(
    ctx: &CommandContext,
    codebase: &Path,
    name: Option<&str>,
    no_browser: bool,
) -> Result<bool> {
    let pipeline = Pipeline::from_config(&ctx.config)?;
    let state = pipeline.run(codebase, name).await?;

    report(ctx, &state, no_browser);
    Ok(state.published())
}

fn report(ctx: &CommandContext, state: &PipelineState, no_browser: bool) {
    if let Some(summary) = state.summary_text() {
        ctx.output.plain(summary);
    }

    match state.publish_outcome() {
        Some(outcome) if outcome.succeeded => {
            ctx.output.success("Workflow complete");
            if let Some(url) = &outcome.workspace_reference {
                ctx.output.info(&format!("View at: {}", url));
                ctx.open_workspace(url, no_browser);
            }
        }
        Some(_) => ctx.output.error("Publishing failed"),
        None if state.publish_skipped().is_some() => ctx.output.warning("Draft not published"),
        None => ctx.output.warning("No diagram drafted"),
    }
}
