//! Complexity Evaluation
//!
//! Decides whether a codebase is small enough for single-prompt diagram
//! drafting. The LLM classifier sends one request and interprets the answer;
//! the pipeline falls back to `Decision::from_metrics` when it fails.

mod decision;

pub use decision::{ComplexityLevel, Decision, DecisionSource};

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::{PromptTemplates, SharedProvider, with_timeout};
use crate::analyzer::AnalysisReport;
use crate::config::{ComplexityConfig, PromptsConfig};
use crate::types::Result;

#[async_trait]
pub trait ComplexityClassifier: Send + Sync {
    async fn classify(&self, report: &AnalysisReport) -> Result<Decision>;
}

pub struct LlmComplexityClassifier {
    provider: SharedProvider,
    prompts: PromptsConfig,
    complexity: ComplexityConfig,
    timeout: Duration,
}

impl LlmComplexityClassifier {
    pub fn new(
        provider: SharedProvider,
        prompts: PromptsConfig,
        complexity: ComplexityConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            prompts,
            complexity,
            timeout,
        }
    }
}

#[async_trait]
impl ComplexityClassifier for LlmComplexityClassifier {
    async fn classify(&self, report: &AnalysisReport) -> Result<Decision> {
        let request = PromptTemplates::classification(report, &self.prompts, &self.complexity);

        debug!(
            "Requesting complexity classification from {} ({})",
            self.provider.name(),
            self.provider.model()
        );

        let response = with_timeout(
            self.timeout,
            self.provider.complete(&request),
            "complexity classification",
        )
        .await?;
        debug!(tokens = response.usage.total(), "Classification response received");

        let decision = Decision::from_response(&response.text);
        info!(
            "Classified as {} (score {:.1}, proceed: {}, source: {:?})",
            decision.complexity_level,
            decision.complexity_score,
            decision.can_proceed,
            decision.source
        );

        Ok(decision)
    }
}
