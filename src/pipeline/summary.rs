//! Human-readable run report.

use super::state::{PipelineState, SkipReason};

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Render whatever the run produced. Missing sections are reported as such.
pub fn render_summary(state: &PipelineState) -> String {
    let mut out: Vec<String> = vec![
        RULE.to_string(),
        "                    EVALUATION COMPLETE".to_string(),
        RULE.to_string(),
        String::new(),
        format!("Codebase: {}", state.codebase_location().display()),
        format!("Project: {}", state.project_name),
        String::new(),
    ];

    match state.metrics_summary() {
        Some(report) => {
            let m = &report.metrics;
            out.push("Metrics:".to_string());
            out.push(format!("• Files: {}", m.files));
            out.push(format!("• Lines: {}", m.lines));
            out.push(format!(
                "• Frameworks: {}",
                if m.frameworks.is_empty() {
                    "None".to_string()
                } else {
                    m.frameworks.join(", ")
                }
            ));
        }
        None => out.push("Metrics: not available".to_string()),
    }
    out.push(String::new());

    match state.decision() {
        Some(d) => {
            out.push("Decision:".to_string());
            out.push(format!(
                "• Complexity: {}",
                d.complexity_level.to_string().to_uppercase()
            ));
            out.push(format!("• Score: {:.1}/10", d.complexity_score));
            out.push(format!(
                "• Can Generate C4: {}",
                if d.can_proceed { "YES" } else { "NO" }
            ));
            out.push(format!("• Confidence: {:.0}%", d.confidence * 100.0));
            out.push(String::new());
            out.push("Reasoning:".to_string());
            out.push(d.reasoning.clone());
            if !d.can_proceed {
                out.push(String::new());
                out.push(format!(
                    "Diagram generation skipped: codebase rated {}",
                    d.complexity_level
                ));
            }
        }
        None => out.push("Decision: not available".to_string()),
    }

    if let Some(draft) = state.draft_result() {
        out.push(String::new());
        out.push("Draft:".to_string());
        out.push(format!("• Files processed: {}", draft.files_processed));
        out.push(format!(
            "• Valid: {}",
            if draft.is_valid { "YES" } else { "NO" }
        ));
        match (&draft.draft_path, &draft.save_error) {
            (Some(path), _) => out.push(format!("• File: {}", path.display())),
            (None, Some(err)) => out.push(format!("• File: not saved ({})", err)),
            (None, None) => {}
        }
        out.extend(draft.errors.iter().map(|e| format!("  ✗ {}", e)));
        out.extend(draft.warnings.iter().map(|w| format!("  ⚠ {}", w)));
    }

    if let Some(skipped) = state.publish_skipped() {
        out.push(String::new());
        out.push(match skipped.reason {
            SkipReason::NotConfigured => "Publish: skipped (workspace service not configured)",
            SkipReason::NoValidDraft => "Publish: skipped (no valid draft)",
        }
        .to_string());
        out.extend(skipped.instructions.iter().map(|l| format!("  {}", l)));
    }

    if let Some(publish) = state.publish_outcome() {
        out.push(String::new());
        if publish.succeeded {
            out.push("Publish: succeeded".to_string());
            if let Some(reference) = &publish.workspace_reference {
                out.push(format!("• View at: {}", reference));
            }
        } else {
            out.push("Publish: failed".to_string());
        }
        if let Some(err) = &publish.error_text {
            let label = if publish.succeeded {
                "First attempt"
            } else {
                "Error"
            };
            out.push(format!("• {}: {}", label, err));
        }
    }

    if let Some(recovery) = state.recovery_outcome() {
        out.push(String::new());
        out.push(format!("Recovery ({}):", recovery.category));
        if recovery.succeeded {
            out.push(format!(
                "• Recovered via {}",
                recovery.method.as_deref().unwrap_or("unknown method")
            ));
        } else {
            out.push(format!(
                "• {}",
                recovery.diagnosis.as_deref().unwrap_or("Recovery failed")
            ));
            out.extend(recovery.instructions.iter().map(|l| format!("  {}", l)));
        }
    }

    if !state.notes().is_empty() {
        out.push(String::new());
        out.push("Notes:".to_string());
        out.extend(
            state
                .notes()
                .iter()
                .map(|n| format!("• [{}] {}", n.stage, n.message)),
        );
    }

    out.push(String::new());
    out.join("\n")
}
