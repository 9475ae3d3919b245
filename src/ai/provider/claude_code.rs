//! Claude Code CLI Provider
//!
//! LLM provider backed by the local `claude` CLI. Single-shot execution.

use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use super::{
    ChatRequest, ErrorCategory, ErrorClassifier, LlmError, LlmProvider, LlmResponse,
    ProviderConfig, TokenUsage,
};
use crate::types::{FlowError, Result};

const PROVIDER_NAME: &str = "claude-code";
const DEFAULT_MODEL: &str = "sonnet";

/// Executes completions via the Claude Code CLI tool.
pub struct ClaudeCodeProvider {
    model: String,
    timeout_secs: u64,
    binary: String,
}

impl ClaudeCodeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_secs: config.timeout_secs,
            binary: "claude".to_string(),
        }
    }

    fn command(&self, request: &ChatRequest) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-p")
            .arg(&request.user)
            .arg("--append-system-prompt")
            .arg(&request.system)
            .arg("--output-format")
            .arg("json")
            .arg("--model")
            .arg(&self.model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Pull the completion text out of the CLI's JSON envelope
    fn parse_output(&self, stdout: &str) -> Result<(String, TokenUsage, Option<u64>)> {
        let response: Value = serde_json::from_str(stdout).map_err(|e| {
            FlowError::LlmApi(format!("Failed to parse Claude Code output: {}", e))
        })?;

        if response
            .get("is_error")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            let error_msg = response
                .get("result")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown API error");
            return Err(ErrorClassifier::classify(error_msg, PROVIDER_NAME).into());
        }

        let text = match response.get("result") {
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => {
                return Err(FlowError::LlmApi(
                    "No result in Claude Code response".to_string(),
                ));
            }
        };

        let usage = response.get("usage");
        let tokens = |key: &str| {
            usage
                .and_then(|u| u.get(key))
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32
        };
        let usage = TokenUsage {
            input_tokens: tokens("input_tokens"),
            output_tokens: tokens("output_tokens"),
        };

        let api_ms = response.get("duration_api_ms").and_then(|v| v.as_u64());

        Ok((text, usage, api_ms))
    }
}

#[async_trait]
impl LlmProvider for ClaudeCodeProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse> {
        info!("Requesting completion from Claude Code CLI (model: {})", self.model);
        let start_time = Instant::now();

        let child = self.command(request).spawn().map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::Unavailable,
                format!("Failed to spawn Claude Code CLI: {}. Is it installed?", e),
                PROVIDER_NAME,
            )
        })?;

        let output = timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            FlowError::timeout("Claude Code completion", Duration::from_secs(self.timeout_secs))
        })?
        .map_err(|e| FlowError::LlmApi(format!("Claude Code execution failed: {}", e)))?;

        let elapsed = start_time.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            // API errors are reported as JSON on stdout
            if let Err(err @ FlowError::Llm(_)) = self.parse_output(&stdout) {
                return Err(err);
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            let error_msg = if stderr.trim().is_empty() {
                "Process exited with non-zero status"
            } else {
                stderr.trim()
            };
            return Err(ErrorClassifier::classify(
                &format!("Claude Code failed: {}", error_msg),
                PROVIDER_NAME,
            )
            .into());
        }

        let (text, usage, api_ms) = self.parse_output(&stdout)?;
        debug!(
            "Received {} chars from Claude Code in {}ms (api: {:?}ms)",
            text.len(),
            elapsed.as_millis(),
            api_ms
        );

        Ok(LlmResponse { text, usage })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ClaudeCodeProvider {
        ClaudeCodeProvider::new(ProviderConfig::default())
    }

    #[test]
    fn test_parse_output_text_and_usage() {
        let stdout = serde_json::json!({
            "result": "{\"complexity_level\": \"simple\"}",
            "duration_api_ms": 812,
            "usage": { "input_tokens": 1000, "output_tokens": 500 }
        })
        .to_string();

        let (text, usage, api_ms) = provider().parse_output(&stdout).unwrap();
        assert_eq!(text, "{\"complexity_level\": \"simple\"}");
        assert_eq!(usage.total(), 1500);
        assert_eq!(api_ms, Some(812));
    }

    #[test]
    fn test_parse_output_reports_api_error() {
        let stdout = r#"{"is_error": true, "result": "Invalid API key"}"#;
        match provider().parse_output(stdout) {
            Err(FlowError::Llm(err)) => assert_eq!(err.category, ErrorCategory::Auth),
            other => panic!("unexpected: {:?}", other.map(|(t, _, _)| t)),
        }
    }

    #[test]
    fn test_parse_output_missing_result() {
        assert!(matches!(
            provider().parse_output("{}"),
            Err(FlowError::LlmApi(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let mut provider = provider();
        provider.binary = "definitely-not-a-claude-binary".into();
        match provider.complete(&ChatRequest::new("s", "u")).await {
            Err(FlowError::Llm(err)) => assert_eq!(err.category, ErrorCategory::Unavailable),
            other => panic!("unexpected: {:?}", other.map(|r| r.text)),
        }
    }
}
