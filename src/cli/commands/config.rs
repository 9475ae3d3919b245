//! Config Command
//!
//! Manage c4flow configuration.
//!
//! Usage:
//!   c4flow config show [-f text|json|yaml]
//!   c4flow config path
//!   c4flow config init [-g] [--force]

use crate::cli::util::CommandContext;
use crate::config::{Config, ConfigLoader};
use crate::types::{FlowError, Result};

/// Print the effective (merged) configuration. Secrets are never serialized.
pub fn show(ctx: &CommandContext, format: &str) -> Result<bool> {
    ctx.output.plain(&render(&ctx.config, format)?);
    Ok(true)
}

fn render(config: &Config, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(config)?),
        "yaml" => Ok(serde_yaml::to_string(config)?),
        "text" | "toml" => toml::to_string_pretty(config)
            .map_err(|e| FlowError::Config(format!("Cannot render config: {}", e))),
        other => Err(FlowError::Config(format!(
            "Unknown format '{}'. Valid values: text, json, yaml",
            other
        ))),
    }
}

/// Show configuration file paths and whether they exist
pub fn path(ctx: &CommandContext) -> Result<bool> {
    let mark = |exists: bool| if exists { "✓" } else { "✗" };

    if let Some(explicit) = &ctx.config_path {
        ctx.output.plain(&format!(
            "Explicit: {} {}",
            explicit.display(),
            mark(explicit.exists())
        ));
    }
    match ConfigLoader::global_config_path() {
        Some(global) => ctx.output.plain(&format!(
            "Global:   {} {}",
            global.display(),
            mark(global.exists())
        )),
        None => ctx.output.plain("Global:   (no config directory on this platform)"),
    }
    let project = ConfigLoader::project_config_path();
    ctx.output.plain(&format!(
        "Project:  {} {}",
        project.display(),
        mark(project.exists())
    ));
    Ok(true)
}

/// Write a starter config file
pub fn init(ctx: &CommandContext, global: bool, force: bool) -> Result<bool> {
    let path = ConfigLoader::init(global, force)?;
    ctx.output.success(&format!(
        "Initialized {} configuration",
        if global { "global" } else { "project" }
    ));
    ctx.output.detail(&format!("Config: {}", path.display()));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_formats() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".into());

        for format in ["text", "json", "yaml"] {
            let out = render(&config, format).unwrap();
            assert!(out.contains("gpt-4"), "{format}");
            assert!(!out.contains("sk-secret"), "{format}");
        }
    }

    #[test]
    fn test_render_rejects_unknown_format() {
        assert!(render(&Config::default(), "xml").is_err());
    }
}
