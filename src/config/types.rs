//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (platform config dir) and project (.c4flow/) level configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ai::provider::ProviderConfig;
use crate::types::{FlowError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Codebase analysis settings
    pub analysis: AnalysisConfig,

    /// Complexity thresholds used by prompts and the metrics heuristic
    pub complexity: ComplexityConfig,

    /// Import root -> framework display name
    pub frameworks: BTreeMap<String, String>,

    /// Prompt templates for the complexity classifier
    pub prompts: PromptsConfig,

    /// Remote workspace service; publishing is skipped when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_service: Option<WorkspaceServiceConfig>,

    /// Publishing tool settings
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            analysis: AnalysisConfig::default(),
            complexity: ComplexityConfig::default(),
            frameworks: default_frameworks(),
            prompts: PromptsConfig::default(),
            workspace_service: None,
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `FlowError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("temperature", self.llm.temperature),
            ("draft_temperature", self.llm.draft_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(FlowError::Config(format!(
                    "LLM {} must be between 0.0 and 2.0, got {}",
                    name, value
                )));
            }
        }

        if self.llm.timeout_secs == 0 {
            return Err(FlowError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.publish.timeout_secs == 0 || self.publish.probe_timeout_secs == 0 {
            return Err(FlowError::Config(
                "publish timeouts must be greater than 0".to_string(),
            ));
        }

        let (simple, moderate) = (&self.complexity.simple, &self.complexity.moderate);
        if simple.max_files > moderate.max_files || simple.max_lines > moderate.max_lines {
            return Err(FlowError::Config(format!(
                "complexity thresholds out of order: simple ({} files, {} lines) exceeds moderate ({} files, {} lines)",
                simple.max_files, simple.max_lines, moderate.max_files, moderate.max_lines
            )));
        }

        if let Some(service) = &self.workspace_service {
            let endpoints = service
                .service_endpoint
                .iter()
                .map(|s| ("service_endpoint", s.as_str()))
                .chain(std::iter::once(("web_url", service.web_url.as_str())));
            for (name, value) in endpoints {
                let parsed = url::Url::parse(value).map_err(|e| {
                    FlowError::Config(format!("workspace_service {} '{}': {}", name, value, e))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(FlowError::Config(format!(
                        "workspace_service {} must be an http(s) URL, got '{}'",
                        name, value
                    )));
                }
            }
        }

        if self.analysis.max_preview_lines == 0 {
            return Err(FlowError::Config(
                "analysis max_preview_lines must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "claude-code"
    pub provider: String,

    /// Model name
    pub model: String,

    /// Temperature for the complexity classifier
    pub temperature: f32,

    /// Maximum tokens for the complexity classifier
    pub max_tokens: usize,

    /// Temperature for diagram drafting
    pub draft_temperature: f32,

    /// Maximum tokens for diagram drafting
    pub draft_max_tokens: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// API key (falls back to OPENAI_API_KEY). Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Custom API base URL
    pub api_base: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("draft_temperature", &self.draft_temperature)
            .field("draft_max_tokens", &self.draft_max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            draft_temperature: 0.1,
            draft_max_tokens: 4000,
            timeout_secs: 300,
            api_key: None,
            api_base: None,
        }
    }
}

impl LlmConfig {
    /// Provider settings for the complexity classifier
    pub fn classifier_provider(&self) -> ProviderConfig {
        self.provider_config(self.temperature, self.max_tokens)
    }

    /// Provider settings for diagram drafting
    pub fn draft_provider(&self) -> ProviderConfig {
        self.provider_config(self.draft_temperature, self.draft_max_tokens)
    }

    fn provider_config(&self, temperature: f32, max_tokens: usize) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
            timeout_secs: self.timeout_secs,
            temperature,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            max_tokens,
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory names skipped anywhere in the tree
    pub skip_directories: Vec<String>,

    /// File names treated as entry points
    pub entry_point_patterns: Vec<String>,

    /// File names sampled first, in order
    pub sample_priority_files: Vec<String>,

    /// Lines kept per sample preview
    pub max_preview_lines: usize,

    /// Maximum number of samples
    pub max_samples: usize,

    /// Files larger than this are skipped (bytes)
    pub max_file_size: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            skip_directories: [
                "venv",
                ".venv",
                "env",
                "__pycache__",
                ".git",
                "node_modules",
                "build",
                "dist",
                ".tox",
                ".pytest_cache",
            ]
            .map(String::from)
            .to_vec(),
            entry_point_patterns: [
                "main.py",
                "app.py",
                "__main__.py",
                "manage.py",
                "wsgi.py",
                "asgi.py",
            ]
            .map(String::from)
            .to_vec(),
            sample_priority_files: ["main.py", "app.py", "__init__.py", "models.py", "views.py"]
                .map(String::from)
                .to_vec(),
            max_preview_lines: 50,
            max_samples: 3,
            max_file_size: 1_048_576, // 1MB
        }
    }
}

// =============================================================================
// Complexity Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplexityThreshold {
    pub max_files: usize,
    pub max_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityConfig {
    pub simple: ComplexityThreshold,
    pub moderate: ComplexityThreshold,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            simple: ComplexityThreshold {
                max_files: 20,
                max_lines: 2000,
            },
            moderate: ComplexityThreshold {
                max_files: 100,
                max_lines: 10000,
            },
        }
    }
}

fn default_frameworks() -> BTreeMap<String, String> {
    [
        ("django", "Django"),
        ("flask", "Flask"),
        ("fastapi", "FastAPI"),
        ("sqlalchemy", "SQLAlchemy"),
        ("celery", "Celery"),
        ("pandas", "Pandas"),
        ("numpy", "NumPy"),
        ("requests", "Requests"),
        ("pytest", "pytest"),
        ("pydantic", "Pydantic"),
        ("aiohttp", "aiohttp"),
        ("tornado", "Tornado"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// =============================================================================
// Prompt Configuration
// =============================================================================

/// Classifier prompt templates.
///
/// `system_message` accepts `{simple_max_files}`, `{simple_max_lines}`,
/// `{moderate_max_files}` and `{moderate_max_lines}`. `evaluation_template`
/// accepts the analysis placeholders rendered by `ai::prompt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub system_message: String,
    pub evaluation_template: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system_message: crate::ai::prompt::DEFAULT_SYSTEM_MESSAGE.to_string(),
            evaluation_template: crate::ai::prompt::DEFAULT_EVALUATION_TEMPLATE.to_string(),
        }
    }
}

// =============================================================================
// Workspace Service Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceServiceConfig {
    /// API endpoint used for workspace probes
    pub service_endpoint: Option<String>,

    /// Public web host (connectivity probe and workspace links)
    pub web_url: String,

    /// API key
    pub credential_id: Option<String>,

    /// API secret. Never serialized.
    #[serde(skip_serializing)]
    pub credential_secret: Option<String>,

    /// Workspace identifier (accepts a number or a string)
    #[serde(deserialize_with = "string_or_number")]
    pub workspace_id: Option<String>,

    /// Open the workspace in a browser after a successful publish
    pub auto_open: bool,
}

impl std::fmt::Debug for WorkspaceServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceServiceConfig")
            .field("service_endpoint", &self.service_endpoint)
            .field("web_url", &self.web_url)
            .field("credential_id", &self.credential_id)
            .field(
                "credential_secret",
                &self.credential_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("workspace_id", &self.workspace_id)
            .field("auto_open", &self.auto_open)
            .finish()
    }
}

impl Default for WorkspaceServiceConfig {
    fn default() -> Self {
        Self {
            service_endpoint: Some("https://api.structurizr.com".to_string()),
            web_url: "https://structurizr.com".to_string(),
            credential_id: None,
            credential_secret: None,
            workspace_id: None,
            auto_open: true,
        }
    }
}

impl WorkspaceServiceConfig {
    /// Complete credentials, or `None` if any required value is missing or blank
    pub fn credentials(&self) -> Option<PublishCredentials> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        Some(PublishCredentials {
            service_endpoint: present(&self.service_endpoint)?.trim_end_matches('/').to_string(),
            web_url: self.web_url.trim_end_matches('/').to_string(),
            api_key: present(&self.credential_id)?.to_string(),
            api_secret: SecretString::from(present(&self.credential_secret)?.to_string()),
            workspace_id: present(&self.workspace_id)?.to_string(),
        })
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

/// Resolved credentials for one workspace
pub struct PublishCredentials {
    pub service_endpoint: String,
    pub web_url: String,
    pub api_key: String,
    pub api_secret: SecretString,
    pub workspace_id: String,
}

impl std::fmt::Debug for PublishCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishCredentials")
            .field("service_endpoint", &self.service_endpoint)
            .field("web_url", &self.web_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("workspace_id", &self.workspace_id)
            .finish()
    }
}

impl PublishCredentials {
    /// Browser link for the workspace
    pub fn workspace_url(&self) -> String {
        format!("{}/workspace/{}", self.web_url, self.workspace_id)
    }
}

// =============================================================================
// Publish Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Binary name of the publishing tool
    pub tool_name: String,

    /// Explicit tool location, probed first during recovery
    pub tool_path: Option<String>,

    /// Locations probed when the tool is missing
    pub candidate_paths: Vec<String>,

    /// Tool subprocess timeout in seconds
    pub timeout_secs: u64,

    /// Service probe timeout in seconds
    pub probe_timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            tool_name: "structurizr-cli".to_string(),
            tool_path: None,
            candidate_paths: [
                "structurizr-cli",
                "./bin/structurizr-cli",
                "/usr/local/bin/structurizr-cli",
            ]
            .map(String::from)
            .to_vec(),
            timeout_secs: 30,
            probe_timeout_secs: 5,
        }
    }
}

impl PublishConfig {
    /// The configured path (if any) followed by every candidate, without duplicates
    pub fn probe_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for path in self.tool_path.iter().chain(self.candidate_paths.iter()) {
            if !order.contains(path) {
                order.push(path.clone());
            }
        }
        order
    }

    /// Tool to invoke for a normal publish
    pub fn tool(&self) -> &str {
        self.tool_path.as_deref().unwrap_or(&self.tool_name)
    }
}

// =============================================================================
// Tests
// =============================================================================
