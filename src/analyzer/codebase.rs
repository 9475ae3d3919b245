//! Codebase analysis: metrics, layout and representative samples.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::parser::PythonParser;
use super::scanner::{FileScanner, ScannedFile};
use crate::config::AnalysisConfig;
use crate::types::{FlowError, Result};

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metrics: CodebaseMetrics,
    pub structure: StructureSummary,
    pub samples: Vec<CodeSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodebaseMetrics {
    pub files: usize,
    pub lines: usize,
    pub classes: usize,
    pub functions: usize,
    /// Distinct import roots, sorted
    pub imports: Vec<String>,
    /// Display names of detected frameworks
    pub frameworks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureSummary {
    pub has_tests: bool,
    pub has_docs: bool,
    pub entry_points: Vec<String>,
    /// Directories containing `__init__.py`
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSample {
    pub file: String,
    pub preview: String,
}

/// One source file read in full
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub relative_path: String,
    pub content: String,
}

// =============================================================================
// Analyzer
// =============================================================================

/// Produces an `AnalysisReport` for a codebase directory.
pub trait CodebaseAnalyzer: Send + Sync {
    /// Fails only with `FlowError::InvalidPath`
    fn analyze(&self, path: &Path) -> Result<AnalysisReport>;
}

/// Analyzer for Python codebases
pub struct PythonCodebaseAnalyzer {
    analysis: AnalysisConfig,
    frameworks: BTreeMap<String, String>,
    parser: PythonParser,
}

impl PythonCodebaseAnalyzer {
    pub fn new(analysis: AnalysisConfig, frameworks: BTreeMap<String, String>) -> Result<Self> {
        Ok(Self {
            analysis,
            frameworks,
            parser: PythonParser::new()?,
        })
    }

    fn scanner(&self, path: &Path) -> FileScanner {
        FileScanner::python(path, &self.analysis)
    }

    fn detect_frameworks(&self, imports: &BTreeSet<String>) -> Vec<String> {
        let mut found = Vec::new();
        for (key, name) in &self.frameworks {
            let key = key.to_lowercase();
            if imports.iter().any(|imp| imp.to_lowercase().contains(&key)) && !found.contains(name)
            {
                found.push(name.clone());
            }
        }
        found
    }

    fn structure(&self, root: &Path, files: &[ScannedFile]) -> StructureSummary {
        let mut entry_points = Vec::new();
        for pattern in &self.analysis.entry_point_patterns {
            for file in files.iter().filter(|f| f.name_matches(pattern)) {
                if !entry_points.contains(&file.relative_path) {
                    entry_points.push(file.relative_path.clone());
                }
            }
        }

        let packages = files
            .iter()
            .filter(|f| f.file_name() == "__init__.py")
            .map(|f| match f.relative_path.rsplit_once('/') {
                Some((dir, _)) => dir.to_string(),
                None => ".".to_string(),
            })
            .collect();

        StructureSummary {
            has_tests: root.join("tests").is_dir() || root.join("test").is_dir(),
            has_docs: root.join("docs").is_dir(),
            entry_points,
            packages,
        }
    }

    fn samples(&self, files: &[ScannedFile]) -> Vec<CodeSample> {
        let mut samples: Vec<CodeSample> = Vec::new();

        for pattern in &self.analysis.sample_priority_files {
            if samples.len() >= self.analysis.max_samples {
                break;
            }

            let candidate = files.iter().find(|f| {
                f.name_matches(pattern) && !samples.iter().any(|s| s.file == f.relative_path)
            });

            if let Some(file) = candidate
                && let Ok(content) = read_lossy(&file.path)
            {
                let preview: Vec<&str> = content
                    .lines()
                    .take(self.analysis.max_preview_lines)
                    .collect();
                samples.push(CodeSample {
                    file: file.relative_path.clone(),
                    preview: preview.join("\n"),
                });
            }
        }

        samples
    }
}

/// Read every analyzable source file under `path` (used to build drafting prompts)
pub fn read_sources(path: &Path, analysis: &AnalysisConfig) -> Result<Vec<SourceFile>> {
    ensure_readable_dir(path)?;
    let files = FileScanner::python(path, analysis).scan()?;
    let mut sources = Vec::with_capacity(files.len());

    for file in files {
        match read_lossy(&file.path) {
            Ok(content) => sources.push(SourceFile {
                relative_path: file.relative_path,
                content,
            }),
            Err(e) => debug!("Skipping unreadable file {}: {}", file.relative_path, e),
        }
    }

    Ok(sources)
}

impl CodebaseAnalyzer for PythonCodebaseAnalyzer {
    fn analyze(&self, path: &Path) -> Result<AnalysisReport> {
        ensure_readable_dir(path)?;

        let files = self.scanner(path).scan()?;
        let mut metrics = CodebaseMetrics::default();
        let mut imports = BTreeSet::new();

        for file in &files {
            let content = match read_lossy(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("Skipping unreadable file {}: {}", file.relative_path, e);
                    continue;
                }
            };

            metrics.files += 1;
            metrics.lines += content.lines().count();

            match self.parser.parse(&file.relative_path, &content) {
                Ok(facts) => {
                    metrics.classes += facts.classes;
                    metrics.functions += facts.functions;
                    imports.extend(facts.imports);
                }
                Err(e) => debug!("Counting lines only for {}: {}", file.relative_path, e),
            }
        }

        metrics.frameworks = self.detect_frameworks(&imports);
        metrics.imports = imports.into_iter().collect();

        let report = AnalysisReport {
            structure: self.structure(path, &files),
            samples: self.samples(&files),
            metrics,
        };

        info!(
            "Analyzed {}: {} files, {} lines, frameworks [{}]",
            path.display(),
            report.metrics.files,
            report.metrics.lines,
            report.metrics.frameworks.join(", ")
        );

        Ok(report)
    }
}

/// Reject paths that are missing, not directories, or unreadable
pub fn ensure_readable_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(FlowError::invalid_path(path, "does not exist"));
    }
    if !path.is_dir() {
        return Err(FlowError::invalid_path(path, "not a directory"));
    }
    fs::read_dir(path).map_err(|e| FlowError::invalid_path(path, e.to_string()))?;
    Ok(())
}

fn read_lossy(path: &Path) -> std::io::Result<String> {
    fs::read(path).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
