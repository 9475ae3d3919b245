use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::{PromptTemplates, SharedProvider, with_timeout};
use crate::analyzer::read_sources;
use crate::config::AnalysisConfig;
use crate::types::Result;

static FENCED_DSL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:dsl|structurizr|plaintext|workspace)?\n?(.*?)```").unwrap()
});

/// Model output for one codebase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDraft {
    /// Extracted DSL
    pub content: String,
    pub files_processed: usize,
    /// Unmodified model answer
    pub raw_response: String,
}

#[async_trait]
pub trait DraftGenerator: Send + Sync {
    async fn generate(&self, codebase: &Path, project_name: &str) -> Result<GeneratedDraft>;
}

/// Sends the whole codebase to the model in a single prompt
pub struct LlmDraftGenerator {
    provider: SharedProvider,
    analysis: AnalysisConfig,
    timeout: Duration,
}

impl LlmDraftGenerator {
    pub fn new(provider: SharedProvider, analysis: AnalysisConfig, timeout: Duration) -> Self {
        Self {
            provider,
            analysis,
            timeout,
        }
    }
}

#[async_trait]
impl DraftGenerator for LlmDraftGenerator {
    async fn generate(&self, codebase: &Path, project_name: &str) -> Result<GeneratedDraft> {
        let sources = read_sources(codebase, &self.analysis)?;
        info!(
            "Drafting C4 workspace for '{}' from {} files",
            project_name,
            sources.len()
        );

        let request = PromptTemplates::draft(project_name, &sources);
        debug!(
            "Draft prompt: {} chars via {}",
            request.user.len(),
            self.provider.name()
        );

        let response = with_timeout(
            self.timeout,
            self.provider.complete(&request),
            "diagram drafting",
        )
        .await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Draft response received"
        );

        Ok(GeneratedDraft {
            content: extract_dsl(&response.text),
            files_processed: sources.len(),
            raw_response: response.text,
        })
    }
}

/// Pull the DSL out of a model answer.
///
/// Tries the first fenced block, then the brace-balanced region starting at
/// `workspace`, then falls back to the trimmed answer.
pub fn extract_dsl(response: &str) -> String {
    if response.contains("```")
        && let Some(caps) = FENCED_DSL.captures(response)
        && let Some(body) = caps.get(1)
    {
        return body.as_str().trim().to_string();
    }

    if let Some(start) = response.find("workspace") {
        let mut depth = 0i32;
        for (i, c) in response[start..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return response[start..start + i + 1].trim().to_string();
                    }
                }
                _ => {}
            }
        }
    }

    response.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChatRequest, LlmProvider, LlmResponse};
    use crate::diagram::{DslValidator, StructuralValidator};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct EchoProvider {
        answer: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse> {
            self.prompts.lock().unwrap().push(request.user.clone());
            Ok(LlmResponse::text_only(self.answer.clone()))
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_extract_fenced_block() {
        let text = "Here you go:\n```dsl\nworkspace {\n}\n```\nEnjoy";
        assert_eq!(extract_dsl(text), "workspace {\n}");

        let text = "```\nworkspace { model { } }\n```";
        assert_eq!(extract_dsl(text), "workspace { model { } }");
    }

    #[test]
    fn test_extract_by_brace_matching() {
        let text = "Sure! workspace { model { a = softwareSystem \"A\" } } Hope this helps.";
        assert_eq!(
            extract_dsl(text),
            "workspace { model { a = softwareSystem \"A\" } }"
        );
    }

    #[test]
    fn test_extract_falls_back_to_trimmed() {
        assert_eq!(extract_dsl("  nothing useful \n"), "nothing useful");
        assert_eq!(extract_dsl("workspace { unclosed"), "workspace { unclosed");
    }

    #[tokio::test]
    async fn test_generate_embeds_every_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.py"), "import flask\n").unwrap();
        fs::create_dir_all(temp.path().join("venv")).unwrap();
        fs::write(temp.path().join("venv/skip.py"), "x = 1\n").unwrap();

        let provider = Arc::new(EchoProvider {
            answer: "```structurizr\nworkspace { model { } views { } }\n```".into(),
            prompts: Mutex::new(Vec::new()),
        });
        let generator = LlmDraftGenerator::new(
            provider.clone(),
            AnalysisConfig::default(),
            Duration::from_secs(5),
        );

        let draft = generator.generate(temp.path(), "shop").await.unwrap();
        assert_eq!(draft.files_processed, 1);
        assert_eq!(draft.content, "workspace { model { } views { } }");
        assert!(draft.raw_response.starts_with("```structurizr"));

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Project Name: shop"));
        assert!(prompts[0].contains("### File: app.py"));
        assert!(!prompts[0].contains("skip.py"));
    }

    #[tokio::test]
    async fn test_generated_content_passes_validation() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.py"), "import flask\n").unwrap();

        let answers = [
            "Here is the workspace:\n```dsl\nworkspace \"Shop\" {\n    model {\n        shop = softwareSystem \"Shop\"\n    }\n    views {\n        systemContext shop {\n            include *\n        }\n    }\n}\n```\nLet me know if you need changes.",
            "Sure! workspace { model { shop = softwareSystem \"Shop\" } views { systemContext shop { include * } } } Hope this helps.",
        ];
        for answer in answers {
            let provider = Arc::new(EchoProvider {
                answer: answer.into(),
                prompts: Mutex::new(Vec::new()),
            });
            let generator =
                LlmDraftGenerator::new(provider, AnalysisConfig::default(), Duration::from_secs(5));

            let draft = generator.generate(temp.path(), "shop").await.unwrap();
            let validation = StructuralValidator::new().validate(&draft.content);
            assert!(validation.has_required_sections, "{answer}");
            assert!(validation.is_valid, "{answer}");
            assert!(!draft.content.contains("Hope this helps"));
        }
    }
}
