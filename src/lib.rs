//! c4flow - Codebase Evaluation and C4 Diagram Publishing
//!
//! Analyzes a Python codebase, asks an LLM whether it is small enough for a
//! single-prompt architecture diagram, drafts a Structurizr C4 workspace,
//! publishes it through structurizr-cli and recovers from common publish
//! failures.
//!
//! ## Quick Start
//!
//! ```ignore
//! use c4flow::{ConfigLoader, Pipeline};
//!
//! let config = ConfigLoader::load(None)?;
//! let pipeline = Pipeline::from_config(&config)?;
//! let state = pipeline.run(Path::new("./my_project"), None).await?;
//! println!("{}", state.summary_text().unwrap_or_default());
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: tree-sitter metrics, structure and samples
//! - [`evaluator`]: complexity classification
//! - [`diagram`]: DSL drafting, validation and persistence
//! - [`publish`]: workspace upload
//! - [`recovery`]: failure classification and remediation
//! - [`pipeline`]: orchestration and run summary

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod diagram;
pub mod evaluator;
pub mod pipeline;
pub mod publish;
pub mod recovery;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, PublishCredentials, WorkspaceServiceConfig};

// Error Types
pub use types::{ErrorCategory, FlowError, Result};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    Pipeline, PipelineComponents, PipelineOptions, PipelineState, Stage, render_summary,
};

// =============================================================================
// Stage Re-exports
// =============================================================================

pub use analyzer::{AnalysisReport, CodebaseAnalyzer, PythonCodebaseAnalyzer};
pub use diagram::{DraftGenerator, DraftResult, DslValidator, StructuralValidator};
pub use evaluator::{ComplexityClassifier, ComplexityLevel, Decision};
pub use publish::{PublishOutcome, PublishRequest, Publisher, StructurizrCliPublisher};
pub use recovery::{FailureCategory, RecoveryCoordinator, RecoveryOutcome, classify_failure};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, TimeoutConfig, create_provider, with_timeout};
