//! Complexity decisions and the heuristics that back them up.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::ai::extract_json_object;
use crate::analyzer::CodebaseMetrics;
use crate::config::ComplexityConfig;
use crate::constants::complexity as scores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

impl ComplexityLevel {
    /// Score used when the model does not provide one
    pub fn default_score(self) -> f32 {
        match self {
            Self::Simple => scores::SIMPLE_SCORE,
            Self::Moderate => scores::MODERATE_SCORE,
            Self::Complex => scores::COMPLEX_SCORE,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "low" => Some(Self::Simple),
            "moderate" | "medium" => Some(Self::Moderate),
            "complex" | "high" => Some(Self::Complex),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Moderate => write!(f, "moderate"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// Where a decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Parsed from the model's JSON answer
    Model,
    /// JSON answer without a usable level or verdict; missing verdict means no
    IncompleteModel,
    /// Keywords in an unparsable model answer
    ResponseHeuristic,
    /// Metric thresholds, used when the classifier failed
    MetricsHeuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub complexity_level: ComplexityLevel,
    /// 0.0..=10.0
    pub complexity_score: f32,
    pub can_proceed: bool,
    pub reasoning: String,
    /// 0.0..=1.0
    pub confidence: f32,
    pub source: DecisionSource,
}

impl Decision {
    /// Interpret a raw model answer: JSON when possible, keywords otherwise
    pub fn from_response(text: &str) -> Self {
        match extract_json_object(text).and_then(|v| Self::from_json(&v)) {
            Some(decision) => decision,
            None => {
                debug!("Classifier response was not usable JSON, falling back to keywords");
                Self::from_response_keywords(text)
            }
        }
    }

    /// Build from a JSON object. Accepts `can_proceed` or the older
    /// `can_use_llm` key. A missing verdict counts as `false` and a missing
    /// level as moderate; either marks the decision `IncompleteModel`.
    /// Returns `None` only when `value` is not an object.
    pub fn from_json(value: &Value) -> Option<Self> {
        value.as_object()?;

        let level = value
            .get("complexity_level")
            .and_then(Value::as_str)
            .and_then(ComplexityLevel::parse);
        let verdict = value
            .get("can_proceed")
            .or_else(|| value.get("can_use_llm"))
            .and_then(Value::as_bool);
        let source = if level.is_some() && verdict.is_some() {
            DecisionSource::Model
        } else {
            debug!("Classifier JSON lacks a level or verdict");
            DecisionSource::IncompleteModel
        };
        let level = level.unwrap_or(ComplexityLevel::Moderate);
        let can_proceed = verdict.unwrap_or(false);

        let score = value
            .get("complexity_score")
            .and_then(Value::as_f64)
            .map(|s| s as f32)
            .unwrap_or_else(|| level.default_score());
        let confidence = value
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|c| c as f32)
            .unwrap_or(scores::FALLBACK_CONFIDENCE);
        let reasoning = value
            .get("reasoning")
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("No reasoning provided")
            .to_string();

        Some(Self {
            complexity_level: level,
            complexity_score: score.clamp(0.0, 10.0),
            can_proceed,
            reasoning,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        })
    }

    /// Keyword heuristic for answers that are not JSON
    pub fn from_response_keywords(text: &str) -> Self {
        let lower = text.to_lowercase();
        let can_proceed = lower.contains("yes") || lower.contains("suitable");

        let level = if lower.contains("simple") {
            ComplexityLevel::Simple
        } else if lower.contains("complex") {
            ComplexityLevel::Complex
        } else {
            ComplexityLevel::Moderate
        };

        Self {
            complexity_level: level,
            complexity_score: level.default_score(),
            can_proceed,
            reasoning: "Failed to parse LLM response, used fallback heuristics".to_string(),
            confidence: scores::FALLBACK_CONFIDENCE,
            source: DecisionSource::ResponseHeuristic,
        }
    }

    /// Deterministic decision from metric thresholds
    pub fn from_metrics(metrics: &CodebaseMetrics, thresholds: &ComplexityConfig) -> Self {
        let within = |t: &crate::config::ComplexityThreshold| {
            metrics.files <= t.max_files && metrics.lines <= t.max_lines
        };

        let (level, can_proceed) = if within(&thresholds.simple) {
            (ComplexityLevel::Simple, true)
        } else if within(&thresholds.moderate) {
            (ComplexityLevel::Moderate, true)
        } else {
            (ComplexityLevel::Complex, false)
        };

        Self {
            complexity_level: level,
            complexity_score: level.default_score(),
            can_proceed,
            reasoning: format!(
                "Classifier unavailable; decided from metrics ({} files, {} lines)",
                metrics.files, metrics.lines
            ),
            confidence: scores::FALLBACK_CONFIDENCE,
            source: DecisionSource::MetricsHeuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn metrics(files: usize, lines: usize) -> CodebaseMetrics {
        CodebaseMetrics {
            files,
            lines,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_response_json() {
        let text = r#"```json
{"complexity_level": "simple", "complexity_score": 2.5, "can_proceed": true, "reasoning": "Small Flask app", "confidence": 0.9}
```"#;
        let d = Decision::from_response(text);
        assert_eq!(d.complexity_level, ComplexityLevel::Simple);
        assert_eq!(d.complexity_score, 2.5);
        assert!(d.can_proceed);
        assert_eq!(d.reasoning, "Small Flask app");
        assert_eq!(d.confidence, 0.9);
        assert_eq!(d.source, DecisionSource::Model);
    }

    #[test]
    fn test_legacy_key_and_clamping() {
        let value = serde_json::json!({
            "complexity_level": "Complex",
            "complexity_score": 42,
            "can_use_llm": false,
            "confidence": 7
        });
        let d = Decision::from_json(&value).unwrap();
        assert_eq!(d.complexity_level, ComplexityLevel::Complex);
        assert_eq!(d.complexity_score, 10.0);
        assert!(!d.can_proceed);
        assert_eq!(d.confidence, 1.0);
        assert_eq!(d.reasoning, "No reasoning provided");
    }

    #[test]
    fn test_json_missing_verdict_means_no() {
        let d = Decision::from_response(
            r#"{"complexity_level":"complex","reasoning":"Yes, it has many services"}"#,
        );
        assert_eq!(d.source, DecisionSource::IncompleteModel);
        assert_eq!(d.complexity_level, ComplexityLevel::Complex);
        assert!(!d.can_proceed);
        assert_eq!(d.reasoning, "Yes, it has many services");

        let d = Decision::from_response(r#"{"complexity_level": "simple"}"#);
        assert_eq!(d.source, DecisionSource::IncompleteModel);
        assert_eq!(d.complexity_level, ComplexityLevel::Simple);
        assert!(!d.can_proceed);
    }

    #[test]
    fn test_json_missing_level_keeps_verdict() {
        let d = Decision::from_response(r#"{"can_proceed": true}"#);
        assert_eq!(d.source, DecisionSource::IncompleteModel);
        assert_eq!(d.complexity_level, ComplexityLevel::Moderate);
        assert!(d.can_proceed);
    }

    #[test]
    fn test_keyword_fallback() {
        let d = Decision::from_response("Yes, this is a simple codebase.");
        assert!(d.can_proceed);
        assert_eq!(d.complexity_level, ComplexityLevel::Simple);
        assert_eq!(d.complexity_score, 3.0);
        assert_eq!(d.confidence, 0.5);
        assert_eq!(
            d.reasoning,
            "Failed to parse LLM response, used fallback heuristics"
        );

        let d = Decision::from_response("Too complex for this approach.");
        assert!(!d.can_proceed);
        assert_eq!(d.complexity_level, ComplexityLevel::Complex);
        assert_eq!(d.complexity_score, 8.0);

        let d = Decision::from_response("Hard to say.");
        assert_eq!(d.complexity_level, ComplexityLevel::Moderate);
        assert_eq!(d.complexity_score, 5.0);
    }

    #[test]
    fn test_from_metrics_thresholds() {
        let t = ComplexityConfig::default();

        let d = Decision::from_metrics(&metrics(20, 2000), &t);
        assert_eq!(d.complexity_level, ComplexityLevel::Simple);
        assert!(d.can_proceed);
        assert_eq!(d.source, DecisionSource::MetricsHeuristic);

        let d = Decision::from_metrics(&metrics(21, 100), &t);
        assert_eq!(d.complexity_level, ComplexityLevel::Moderate);
        assert!(d.can_proceed);

        let d = Decision::from_metrics(&metrics(50, 10001), &t);
        assert_eq!(d.complexity_level, ComplexityLevel::Complex);
        assert!(!d.can_proceed);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&DecisionSource::MetricsHeuristic).unwrap(),
            "\"metrics_heuristic\""
        );
        assert_eq!(ComplexityLevel::Moderate.to_string(), "moderate");
    }

    proptest! {
        #[test]
        fn prop_from_response_never_panics_and_stays_in_range(text in ".{0,200}") {
            let d = Decision::from_response(&text);
            prop_assert!((0.0..=10.0).contains(&d.complexity_score));
            prop_assert!((0.0..=1.0).contains(&d.confidence));
        }

        #[test]
        fn prop_from_metrics_is_monotonic(files in 0usize..500, lines in 0usize..50_000) {
            let t = ComplexityConfig::default();
            let d = Decision::from_metrics(&metrics(files, lines), &t);
            let bigger = Decision::from_metrics(&metrics(files + 100, lines + 10_000), &t);
            prop_assert!(bigger.complexity_score >= d.complexity_score);
            prop_assert_eq!(d.can_proceed, d.complexity_level != ComplexityLevel::Complex);
        }
    }
}
