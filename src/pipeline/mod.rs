//! Pipeline Orchestration
//!
//! One run: analyze → classify → draft → publish → recover → summarize.
//!
//! Only analysis can abort a run (bad codebase path). Every later problem is
//! recorded in `PipelineState` and ends up in the summary.

mod state;
mod summary;

pub use state::{NoteKind, PipelineState, PublishSkipped, SkipReason, Stage, StageNote};
pub use summary::render_summary;

use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::ai::{TimeoutConfig, create_provider};
use crate::analyzer::{CodebaseAnalyzer, PythonCodebaseAnalyzer};
use crate::config::{ComplexityConfig, Config, PublishCredentials, WorkspaceServiceConfig};
use crate::constants::service;
use crate::diagram::{
    DraftGenerator, DraftResult, DslValidator, LlmDraftGenerator, StructuralValidator,
    persist_draft, project_name_for,
};
use crate::evaluator::{ComplexityClassifier, Decision, DecisionSource, LlmComplexityClassifier};
use crate::publish::{PublishRequest, Publisher, StructurizrCliPublisher};
use crate::recovery::{
    HttpServiceProbe, RecoveryCoordinator, WhichToolLocator, manual_upload_instructions,
};
use crate::types::Result;

/// Collaborators, each behind its seam trait
pub struct PipelineComponents {
    pub analyzer: Arc<dyn CodebaseAnalyzer>,
    pub classifier: Arc<dyn ComplexityClassifier>,
    pub generator: Arc<dyn DraftGenerator>,
    pub validator: Arc<dyn DslValidator>,
    pub publisher: Arc<dyn Publisher>,
    pub recovery: Arc<RecoveryCoordinator>,
}

impl PipelineComponents {
    /// Production wiring: LLM classifier and generator, structurizr-cli publisher
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeouts = TimeoutConfig::from_config(config);

        let classifier_provider = create_provider(&config.llm.classifier_provider())?;
        let draft_provider = create_provider(&config.llm.draft_provider())?;
        let publisher: Arc<dyn Publisher> =
            Arc::new(StructurizrCliPublisher::from_config(&config.publish));

        let recovery = RecoveryCoordinator::new(
            publisher.clone(),
            Arc::new(WhichToolLocator),
            Arc::new(HttpServiceProbe::new(timeouts.service_probe)?),
            config.publish.clone(),
        );

        Ok(Self {
            analyzer: Arc::new(PythonCodebaseAnalyzer::new(
                config.analysis.clone(),
                config.frameworks.clone(),
            )?),
            classifier: Arc::new(LlmComplexityClassifier::new(
                classifier_provider,
                config.prompts.clone(),
                config.complexity.clone(),
                timeouts.llm_request,
            )),
            generator: Arc::new(LlmDraftGenerator::new(
                draft_provider,
                config.analysis.clone(),
                timeouts.llm_request,
            )),
            validator: Arc::new(StructuralValidator::new()),
            publisher,
            recovery: Arc::new(recovery),
        })
    }
}

/// Run settings passed in explicitly
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Thresholds for the metrics fallback decision
    pub complexity: ComplexityConfig,
    /// `None` means publishing is not configured
    pub workspace_service: Option<WorkspaceServiceConfig>,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            complexity: config.complexity.clone(),
            workspace_service: config.workspace_service.clone(),
        }
    }
}

pub struct Pipeline {
    components: PipelineComponents,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(components: PipelineComponents, options: PipelineOptions) -> Self {
        Self {
            components,
            options,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            PipelineComponents::from_config(config)?,
            PipelineOptions::from_config(config),
        ))
    }

    /// Analysis and classification only, followed by the summary
    #[instrument(skip(self, project_name), fields(codebase = %codebase.display()))]
    pub async fn evaluate(
        &self,
        codebase: &Path,
        project_name: Option<&str>,
    ) -> Result<PipelineState> {
        let mut state = self.assess(codebase, project_name).await?;
        Self::finish(&mut state)?;
        Ok(state)
    }

    /// Run every stage for one codebase. Errs only when the codebase path is
    /// unusable.
    #[instrument(skip(self, project_name), fields(codebase = %codebase.display()))]
    pub async fn run(&self, codebase: &Path, project_name: Option<&str>) -> Result<PipelineState> {
        let mut state = self.assess(codebase, project_name).await?;
        let can_proceed = state.decision().is_some_and(|d| d.can_proceed);

        if can_proceed {
            // ===== PHASE 3: Drafting =====
            info!("Phase 3: Drafting C4 workspace");
            state.enter(Stage::Drafted);
            let draft = self.draft(&mut state).await;
            state.set_draft_result(draft)?;

            // ===== PHASE 4: Publishing =====
            self.publish(&mut state).await?;
        } else {
            info!("Phase 3: Skipped (codebase too complex for single-prompt drafting)");
            state.enter(Stage::SkippedGeneration);
        }

        Self::finish(&mut state)?;
        Ok(state)
    }

    async fn assess(&self, codebase: &Path, project_name: Option<&str>) -> Result<PipelineState> {
        let project = project_name
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| project_name_for(codebase));
        let mut state = PipelineState::new(codebase, project);
        info!(run_id = %state.run_id, project = %state.project_name, "Pipeline started");

        // ===== PHASE 1: Analysis =====
        info!("Phase 1: Analyzing codebase");
        let report = self.components.analyzer.analyze(codebase)?;
        state.set_metrics(report)?;
        state.enter(Stage::Analyzed);

        // ===== PHASE 2: Classification =====
        info!("Phase 2: Classifying complexity");
        let decision = self.classify(&mut state).await;
        state.set_decision(decision)?;
        state.enter(Stage::Classified);

        Ok(state)
    }

    fn finish(state: &mut PipelineState) -> Result<()> {
        // ===== PHASE 5: Summary =====
        let summary = render_summary(state);
        state.set_summary(summary)?;
        state.enter(Stage::Summarized);
        info!(published = state.published(), notes = state.notes().len(), "Pipeline finished");
        Ok(())
    }

    async fn classify(&self, state: &mut PipelineState) -> Decision {
        let Some(report) = state.metrics_summary() else {
            return Decision::from_metrics(&Default::default(), &self.options.complexity);
        };

        match self.components.classifier.classify(report).await {
            Ok(decision) => {
                match decision.source {
                    DecisionSource::ResponseHeuristic => state.note(
                        NoteKind::DegradedClassification,
                        "Classifier answer was not valid JSON; used keyword heuristics",
                    ),
                    DecisionSource::IncompleteModel => state.note(
                        NoteKind::DegradedClassification,
                        "Classifier JSON lacked a complexity level or verdict; \
                         a missing verdict counts as no",
                    ),
                    DecisionSource::Model | DecisionSource::MetricsHeuristic => {}
                }
                decision
            }
            Err(e) => {
                warn!("Classifier failed, deciding from metrics: {}", e);
                let decision = Decision::from_metrics(&report.metrics, &self.options.complexity);
                state.note(
                    NoteKind::DegradedClassification,
                    format!("Classifier failed ({}); decided from metric thresholds", e),
                );
                decision
            }
        }
    }

    async fn draft(&self, state: &mut PipelineState) -> DraftResult {
        let codebase = state.codebase_location().to_path_buf();
        let project = state.project_name.clone();

        let generated = match self.components.generator.generate(&codebase, &project).await {
            Ok(generated) => generated,
            Err(e) => {
                warn!("Draft generation failed: {}", e);
                state.note(NoteKind::GenerationFailed, e.to_string());
                return DraftResult::failed(format!("Generation failed: {}", e));
            }
        };

        let validation = self.components.validator.validate(&generated.content);
        let mut result = DraftResult::from_generated(generated, validation);

        if result.is_valid {
            if let Some(content) = result.content.as_mut() {
                *content = self.components.validator.enhance(content);
            }
        } else {
            state.note(NoteKind::DraftInvalid, result.errors.join("; "));
        }

        if let Some(content) = &result.content {
            match persist_draft(&codebase, &project, content) {
                Ok(path) => result.draft_path = Some(path),
                Err(e) => {
                    warn!("Could not save draft: {}", e);
                    state.note(NoteKind::DraftSaveFailed, e.to_string());
                    result.save_error = Some(e.to_string());
                }
            }
        }

        result
    }

    async fn publish(&self, state: &mut PipelineState) -> Result<()> {
        let credentials: Option<PublishCredentials> = self
            .options
            .workspace_service
            .as_ref()
            .and_then(|ws| ws.credentials());
        let saved_path = state.draft_result().and_then(|d| d.draft_path.clone());
        let publishable = state
            .draft_result()
            .and_then(|d| d.publishable_path())
            .map(Path::to_path_buf);

        let Some(creds) = credentials else {
            info!("Phase 4: Skipped (workspace service not configured)");
            let mut instructions = match &saved_path {
                Some(path) => manual_upload_instructions(path),
                None => vec!["No draft file was written".to_string()],
            };
            instructions.push(String::new());
            instructions.push(format!(
                "To publish automatically, add credential_id, credential_secret and \
                 workspace_id under [workspace_service] (see {})",
                service::API_HELP_URL
            ));
            state.set_publish_skipped(PublishSkipped {
                reason: SkipReason::NotConfigured,
                instructions,
            })?;
            state.enter(Stage::SkippedPublish);
            return Ok(());
        };

        let Some(draft_path) = publishable else {
            info!("Phase 4: Skipped (no valid draft)");
            let mut instructions: Vec<String> = state
                .draft_result()
                .map(|d| d.errors.clone())
                .unwrap_or_default();
            if let Some(path) = &saved_path {
                instructions.push(format!(
                    "Fix {} and run `c4flow upload {}`",
                    path.display(),
                    path.display()
                ));
            }
            state.set_publish_skipped(PublishSkipped {
                reason: SkipReason::NoValidDraft,
                instructions,
            })?;
            state.enter(Stage::SkippedPublish);
            return Ok(());
        };

        info!("Phase 4: Publishing draft");
        let outcome = self
            .components
            .publisher
            .publish(PublishRequest::new(&draft_path, &creds))
            .await;
        let succeeded = outcome.succeeded;
        let error_text = outcome.error_text.clone().unwrap_or_default();
        state.set_publish_outcome(outcome)?;

        if succeeded {
            state.enter(Stage::Published);
            return Ok(());
        }
        state.enter(Stage::PublishFailed);

        // ===== Recovery =====
        info!("Phase 4b: Recovering from publish failure");
        let recovery = self
            .components
            .recovery
            .diagnose_and_retry(&error_text, &draft_path, Some(&creds))
            .await;
        let recovered = recovery.succeeded;
        state.set_recovery_outcome(recovery)?;

        if recovered {
            state.mark_recovered(Some(creds.workspace_url()))?;
            state.enter(Stage::Recovered);
        } else {
            state.enter(Stage::RecoveryFailed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalysisReport, ensure_readable_dir};
    use crate::config::PublishConfig;
    use crate::diagram::GeneratedDraft;
    use crate::evaluator::ComplexityLevel;
    use crate::publish::PublishOutcome;
    use crate::recovery::{FailureCategory, ServiceProbe, ToolLocator};
    use crate::types::FlowError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const VALID_DSL: &str = "workspace {\n    model {\n        s = softwareSystem \"Shop\"\n    }\n    views {\n        systemContext s {\n            include *\n        }\n    }\n}";

    struct StubAnalyzer;

    impl CodebaseAnalyzer for StubAnalyzer {
        fn analyze(&self, path: &Path) -> Result<AnalysisReport> {
            ensure_readable_dir(path)?;
            let mut report = AnalysisReport::default();
            report.metrics.files = 3;
            report.metrics.lines = 90;
            Ok(report)
        }
    }

    struct StubClassifier {
        answer: Option<Decision>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ComplexityClassifier for StubClassifier {
        async fn classify(&self, _: &AnalysisReport) -> Result<Decision> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .ok_or_else(|| FlowError::LlmApi("model unavailable".into()))
        }
    }

    struct StubGenerator {
        content: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DraftGenerator for StubGenerator {
        async fn generate(&self, _: &Path, _: &str) -> Result<GeneratedDraft> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.content {
                Some(content) => Ok(GeneratedDraft {
                    content: content.to_string(),
                    files_processed: 3,
                    raw_response: content.to_string(),
                }),
                None => Err(FlowError::LlmApi("empty completion".into())),
            }
        }
    }

    struct ScriptedPublisher {
        outcomes: Mutex<VecDeque<PublishOutcome>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Publisher for ScriptedPublisher {
        async fn publish(&self, request: PublishRequest<'_>) -> PublishOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| PublishOutcome::success(request.credentials.workspace_url()))
        }
    }

    struct NoTools;

    impl ToolLocator for NoTools {
        fn locate(&self, _: &str) -> Option<PathBuf> {
            None
        }
    }

    struct HealthyProbe;

    #[async_trait]
    impl ServiceProbe for HealthyProbe {
        async fn workspace_status(&self, _: &str, _: &str) -> Result<u16> {
            Ok(200)
        }

        async fn connectivity_status(&self, _: &str) -> Result<u16> {
            Ok(200)
        }
    }

    struct Harness {
        classifier: Arc<StubClassifier>,
        generator: Arc<StubGenerator>,
        publisher: Arc<ScriptedPublisher>,
        pipeline: Pipeline,
    }

    fn decision(can_proceed: bool, level: ComplexityLevel) -> Decision {
        Decision {
            complexity_level: level,
            complexity_score: level.default_score(),
            can_proceed,
            reasoning: "stub".into(),
            confidence: 0.9,
            source: DecisionSource::Model,
        }
    }

    fn workspace() -> WorkspaceServiceConfig {
        WorkspaceServiceConfig {
            credential_id: Some("key".into()),
            credential_secret: Some("secret".into()),
            workspace_id: Some("42".into()),
            ..Default::default()
        }
    }

    fn harness(
        answer: Option<Decision>,
        content: Option<&'static str>,
        publishes: Vec<PublishOutcome>,
        workspace_service: Option<WorkspaceServiceConfig>,
    ) -> Harness {
        let classifier = Arc::new(StubClassifier {
            answer,
            calls: AtomicUsize::new(0),
        });
        let generator = Arc::new(StubGenerator {
            content,
            calls: AtomicUsize::new(0),
        });
        let publisher = Arc::new(ScriptedPublisher {
            outcomes: Mutex::new(publishes.into()),
            calls: AtomicUsize::new(0),
        });
        let recovery = RecoveryCoordinator::new(
            publisher.clone(),
            Arc::new(NoTools),
            Arc::new(HealthyProbe),
            PublishConfig::default(),
        );

        let pipeline = Pipeline::new(
            PipelineComponents {
                analyzer: Arc::new(StubAnalyzer),
                classifier: classifier.clone(),
                generator: generator.clone(),
                validator: Arc::new(StructuralValidator::new()),
                publisher: publisher.clone(),
                recovery: Arc::new(recovery),
            },
            PipelineOptions {
                workspace_service,
                ..Default::default()
            },
        );

        Harness {
            classifier,
            generator,
            publisher,
            pipeline,
        }
    }

    fn shop_dir() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("shop");
        std::fs::create_dir(&dir).unwrap();
        (temp, dir)
    }

    #[tokio::test]
    async fn test_nonexistent_path_aborts_before_classifier() {
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some(VALID_DSL),
            vec![],
            Some(workspace()),
        );
        let err = h
            .pipeline
            .run(Path::new("/no/such/codebase/for/c4flow"), None)
            .await
            .unwrap_err();

        assert!(err.is_fatal_input());
        assert_eq!(h.classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_evaluate_stops_after_classification() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some(VALID_DSL),
            vec![],
            Some(workspace()),
        );
        let state = h.pipeline.evaluate(&dir, None).await.unwrap();

        assert_eq!(
            state.trail(),
            &[Stage::Start, Stage::Analyzed, Stage::Classified, Stage::Summarized]
        );
        assert!(state.decision().unwrap().can_proceed);
        assert!(state.draft_result().is_none());
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
        assert!(!dir.join("shop_c4.dsl").exists());
    }

    #[tokio::test]
    async fn test_complex_codebase_skips_generation() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(false, ComplexityLevel::Complex)),
            Some(VALID_DSL),
            vec![],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        assert!(state.trail().contains(&Stage::SkippedGeneration));
        assert_eq!(state.stage(), Stage::Summarized);
        assert!(state.draft_result().is_none());
        assert!(state.publish_outcome().is_none());
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
        assert!(state.summary_text().unwrap().contains("complex"));
    }

    #[tokio::test]
    async fn test_unconfigured_publish_is_skipped_with_draft_path() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some(VALID_DSL),
            vec![],
            None,
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        let skipped = state.publish_skipped().unwrap();
        assert_eq!(skipped.reason, SkipReason::NotConfigured);
        let draft_path = dir.join("shop_c4.dsl");
        assert!(
            skipped
                .instructions
                .iter()
                .any(|l| l.contains(&draft_path.display().to_string()))
        );
        assert!(state.recovery_outcome().is_none());
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);

        let saved = std::fs::read_to_string(draft_path).unwrap();
        assert!(saved.contains("styles"));
    }

    #[tokio::test]
    async fn test_successful_publish() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some(VALID_DSL),
            vec![],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, Some("storefront")).await.unwrap();

        assert!(state.published());
        assert!(state.trail().contains(&Stage::Published));
        assert!(state.recovery_outcome().is_none());
        assert!(dir.join("storefront_c4.dsl").is_file());
        assert_eq!(
            state.publish_outcome().unwrap().workspace_reference.as_deref(),
            Some("https://structurizr.com/workspace/42")
        );
    }

    #[tokio::test]
    async fn test_network_failure_recovers_with_one_retry() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some(VALID_DSL),
            vec![PublishOutcome::failure(
                "connection timeout while resolving host",
            )],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        let recovery = state.recovery_outcome().unwrap();
        assert_eq!(recovery.category, FailureCategory::NetworkError);
        assert!(recovery.succeeded);
        assert!(state.published());
        assert!(state.trail().contains(&Stage::Recovered));
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some(VALID_DSL),
            vec![PublishOutcome::failure("401 Unauthorized: incorrect api key")],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        let recovery = state.recovery_outcome().unwrap();
        assert_eq!(recovery.category, FailureCategory::AuthError);
        assert!(!recovery.succeeded);
        assert!(!state.published());
        assert!(state.trail().contains(&Stage::RecoveryFailed));
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 1);
        assert!(state.summary_text().unwrap().contains("Authentication failed"));
    }

    #[tokio::test]
    async fn test_silent_publish_failure_still_runs_recovery() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some(VALID_DSL),
            vec![PublishOutcome::default(), PublishOutcome::default()],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        assert!(!state.published());
        assert!(state.trail().contains(&Stage::PublishFailed));
        assert!(!state.trail().contains(&Stage::Published));
        let recovery = state.recovery_outcome().unwrap();
        assert_eq!(recovery.category, FailureCategory::Unknown);
        assert!(!recovery.succeeded);
        assert!(state.trail().contains(&Stage::RecoveryFailed));
    }

    #[tokio::test]
    async fn test_draft_notes_are_tagged_drafted() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            Some("workspace { model {"),
            vec![],
            None,
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        let note = state
            .notes()
            .iter()
            .find(|n| n.kind == NoteKind::DraftInvalid)
            .unwrap();
        assert_eq!(note.stage, Stage::Drafted);
    }

    #[tokio::test]
    async fn test_incomplete_classifier_json_is_noted() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(Decision::from_response(
                r#"{"complexity_level":"complex","reasoning":"Yes, many services"}"#,
            )),
            Some(VALID_DSL),
            vec![],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        assert!(!state.decision().unwrap().can_proceed);
        assert!(state.trail().contains(&Stage::SkippedGeneration));
        assert_eq!(state.notes()[0].kind, NoteKind::DegradedClassification);
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_classifier_failure_falls_back_to_metrics() {
        let (_temp, dir) = shop_dir();
        let h = harness(None, Some(VALID_DSL), vec![], None);
        let state = h.pipeline.run(&dir, None).await.unwrap();

        let decision = state.decision().unwrap();
        assert_eq!(decision.source, DecisionSource::MetricsHeuristic);
        assert!(decision.can_proceed);
        assert_eq!(state.notes()[0].kind, NoteKind::DegradedClassification);
        assert!(state.draft_result().is_some());
    }

    #[tokio::test]
    async fn test_generation_failure_is_recorded() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Simple)),
            None,
            vec![],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        let draft = state.draft_result().unwrap();
        assert!(draft.content.is_none());
        assert!(!draft.is_valid);
        assert!(
            state
                .notes()
                .iter()
                .any(|n| n.kind == NoteKind::GenerationFailed)
        );
        assert_eq!(
            state.publish_skipped().unwrap().reason,
            SkipReason::NoValidDraft
        );
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_saved_but_not_published() {
        let (_temp, dir) = shop_dir();
        let h = harness(
            Some(decision(true, ComplexityLevel::Moderate)),
            Some("workspace { model {"),
            vec![],
            Some(workspace()),
        );
        let state = h.pipeline.run(&dir, None).await.unwrap();

        let draft = state.draft_result().unwrap();
        assert!(!draft.is_valid);
        assert!(draft.draft_path.as_ref().unwrap().is_file());
        assert_eq!(
            state.publish_skipped().unwrap().reason,
            SkipReason::NoValidDraft
        );
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
    }
}
