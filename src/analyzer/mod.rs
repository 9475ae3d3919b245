//! Code Analyzer Module
//!
//! - Python parsing (tree-sitter fact extraction)
//! - File scanning with skip-directory and gitignore support
//! - Codebase metrics, structure and samples

pub mod codebase;
pub mod parser;
pub mod scanner;

pub use codebase::{
    AnalysisReport, CodeSample, CodebaseAnalyzer, CodebaseMetrics, PythonCodebaseAnalyzer,
    SourceFile, StructureSummary, ensure_readable_dir, read_sources,
};
