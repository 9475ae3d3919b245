//! Pipeline State
//!
//! Typed record threaded through one run. Every stage output lives in its
//! own slot and is written once through a set-once helper; a second write is
//! a `FlowError::StateViolation`. The one sanctioned mutation is
//! `mark_recovered`, which flips a failed publish to succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::analyzer::AnalysisReport;
use crate::diagram::DraftResult;
use crate::evaluator::Decision;
use crate::publish::PublishOutcome;
use crate::recovery::RecoveryOutcome;
use crate::types::{FlowError, Result};

/// Workflow states, in visiting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Analyzed,
    Classified,
    SkippedGeneration,
    Drafted,
    SkippedPublish,
    Published,
    PublishFailed,
    Recovered,
    RecoveryFailed,
    Summarized,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Analyzed => "analyzed",
            Self::Classified => "classified",
            Self::SkippedGeneration => "skipped_generation",
            Self::Drafted => "drafted",
            Self::SkippedPublish => "skipped_publish",
            Self::Published => "published",
            Self::PublishFailed => "publish_failed",
            Self::Recovered => "recovered",
            Self::RecoveryFailed => "recovery_failed",
            Self::Summarized => "summarized",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Degraded conditions recorded instead of raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    DegradedClassification,
    GenerationFailed,
    DraftInvalid,
    DraftSaveFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageNote {
    pub stage: Stage,
    pub kind: NoteKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No complete workspace service credentials
    NotConfigured,
    /// Draft missing, invalid or not written to disk
    NoValidDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSkipped {
    pub reason: SkipReason,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    codebase_location: PathBuf,
    pub project_name: String,
    metrics_summary: Option<AnalysisReport>,
    decision: Option<Decision>,
    draft_result: Option<DraftResult>,
    publish_outcome: Option<PublishOutcome>,
    publish_skipped: Option<PublishSkipped>,
    recovery_outcome: Option<RecoveryOutcome>,
    notes: Vec<StageNote>,
    trail: Vec<Stage>,
    summary_text: Option<String>,
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<()> {
    if slot.is_some() {
        return Err(FlowError::StateViolation { field });
    }
    *slot = Some(value);
    Ok(())
}

impl PipelineState {
    pub fn new(codebase_location: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            codebase_location: codebase_location.into(),
            project_name: project_name.into(),
            metrics_summary: None,
            decision: None,
            draft_result: None,
            publish_outcome: None,
            publish_skipped: None,
            recovery_outcome: None,
            notes: Vec::new(),
            trail: vec![Stage::Start],
            summary_text: None,
        }
    }

    // -------------------------------------------------------------------------
    // Readers
    // -------------------------------------------------------------------------

    pub fn codebase_location(&self) -> &Path {
        &self.codebase_location
    }

    pub fn metrics_summary(&self) -> Option<&AnalysisReport> {
        self.metrics_summary.as_ref()
    }

    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }

    pub fn draft_result(&self) -> Option<&DraftResult> {
        self.draft_result.as_ref()
    }

    pub fn publish_outcome(&self) -> Option<&PublishOutcome> {
        self.publish_outcome.as_ref()
    }

    pub fn publish_skipped(&self) -> Option<&PublishSkipped> {
        self.publish_skipped.as_ref()
    }

    pub fn recovery_outcome(&self) -> Option<&RecoveryOutcome> {
        self.recovery_outcome.as_ref()
    }

    pub fn notes(&self) -> &[StageNote] {
        &self.notes
    }

    pub fn trail(&self) -> &[Stage] {
        &self.trail
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.summary_text.as_deref()
    }

    pub fn stage(&self) -> Stage {
        self.trail.last().copied().unwrap_or(Stage::Start)
    }

    /// The draft ended up in the workspace, directly or after recovery
    pub fn published(&self) -> bool {
        self.publish_outcome.as_ref().is_some_and(|o| o.succeeded)
    }

    // -------------------------------------------------------------------------
    // Writers
    // -------------------------------------------------------------------------

    pub(crate) fn enter(&mut self, stage: Stage) {
        self.trail.push(stage);
    }

    pub(crate) fn note(&mut self, kind: NoteKind, message: impl Into<String>) {
        let stage = self.stage();
        self.notes.push(StageNote {
            stage,
            kind,
            message: message.into(),
        });
    }

    pub(crate) fn set_metrics(&mut self, report: AnalysisReport) -> Result<()> {
        set_once(&mut self.metrics_summary, report, "metrics_summary")
    }

    pub(crate) fn set_decision(&mut self, decision: Decision) -> Result<()> {
        set_once(&mut self.decision, decision, "decision")
    }

    pub(crate) fn set_draft_result(&mut self, draft: DraftResult) -> Result<()> {
        set_once(&mut self.draft_result, draft, "draft_result")
    }

    pub(crate) fn set_publish_outcome(&mut self, outcome: PublishOutcome) -> Result<()> {
        set_once(&mut self.publish_outcome, outcome, "publish_outcome")
    }

    pub(crate) fn set_publish_skipped(&mut self, skipped: PublishSkipped) -> Result<()> {
        set_once(&mut self.publish_skipped, skipped, "publish_skipped")
    }

    pub(crate) fn set_recovery_outcome(&mut self, outcome: RecoveryOutcome) -> Result<()> {
        set_once(&mut self.recovery_outcome, outcome, "recovery_outcome")
    }

    pub(crate) fn set_summary(&mut self, summary: String) -> Result<()> {
        set_once(&mut self.summary_text, summary, "summary_text")
    }

    /// Flip a failed publish to succeeded after recovery got the draft through
    pub(crate) fn mark_recovered(&mut self, workspace_reference: Option<String>) -> Result<()> {
        let outcome = self
            .publish_outcome
            .as_mut()
            .ok_or(FlowError::StateViolation {
                field: "publish_outcome",
            })?;
        outcome.succeeded = true;
        if outcome.workspace_reference.is_none() {
            outcome.workspace_reference = workspace_reference;
        }
        Ok(())
    }
}
