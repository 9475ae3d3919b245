//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (platform config dir, e.g. ~/.config/c4flow/config.toml)
//! 3. Project config (.c4flow/config.toml)
//! 4. Environment variables (C4FLOW_* prefix, `__` between nested keys)
//!
//! An explicit `--config` file replaces steps 2 and 3.

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{FlowError, Result};

const ENV_PREFIX: &str = "C4FLOW_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → (explicit file | global → project) → env vars
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(FlowError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading config from: {}", path.display());
            figment = Self::merge_file(figment, path);
        } else {
            if let Some(global_path) = Self::global_config_path()
                && global_path.exists()
            {
                debug!("Loading global config from: {}", global_path.display());
                figment = figment.merge(Toml::file(&global_path));
            }

            let project_path = Self::project_config_path();
            if project_path.exists() {
                debug!("Loading project config from: {}", project_path.display());
                figment = figment.merge(Toml::file(&project_path));
            }
        }

        // e.g. C4FLOW_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::extract(figment)
    }

    /// Load configuration from a specific file only (no env, no layering)
    #[cfg(test)]
    fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Self::merge_file(
            Figment::new().merge(Serialized::defaults(Config::default())),
            path,
        );
        Self::extract(figment)
    }

    fn merge_file(figment: Figment, path: &Path) -> Figment {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            _ => figment.merge(Toml::file(path)),
        }
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| FlowError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (platform specific)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "c4flow").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project config directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".c4flow")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a starter config file. Existing files are kept unless `force`.
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let dir = if global {
            Self::global_dir().ok_or_else(|| {
                FlowError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_dir()
        };
        Self::init_in(&dir, force)
    }

    /// Write a starter `config.toml` into `dir`
    pub fn init_in(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_toml())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Starter config content (TOML)
    fn default_config_toml() -> &'static str {
        r#"# c4flow Configuration
# Project settings in .c4flow/config.toml override the global file.
# Secrets can also come from the environment:
#   C4FLOW_LLM__API_KEY, C4FLOW_WORKSPACE_SERVICE__CREDENTIAL_SECRET

version = "1.0"

[llm]
provider = "openai"
model = "gpt-4"
temperature = 0.1
max_tokens = 1000
draft_temperature = 0.1
draft_max_tokens = 4000
timeout_secs = 300

[analysis]
max_preview_lines = 50
max_samples = 3

[complexity.simple]
max_files = 20
max_lines = 2000

[complexity.moderate]
max_files = 100
max_lines = 10000

# Uncomment to enable publishing
# [workspace_service]
# service_endpoint = "https://api.structurizr.com"
# web_url = "https://structurizr.com"
# credential_id = "your-api-key"
# credential_secret = "your-api-secret"
# workspace_id = "12345"
# auto_open = true

[publish]
tool_name = "structurizr-cli"
timeout_secs = 30
probe_timeout_secs = 5
"#
    }
}
