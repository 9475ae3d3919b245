//! Prompt Builder System
//!
//! Prompt construction for the two LLM calls the pipeline makes:
//! complexity classification and diagram drafting.
//!
//! Classification prompts are rendered from configurable templates with
//! `{placeholder}` substitution. Drafting prompts are assembled with
//! `PromptBuilder` sections.

use crate::ai::provider::ChatRequest;
use crate::analyzer::{AnalysisReport, SourceFile};
use crate::config::{ComplexityConfig, PromptsConfig};
use crate::constants::complexity as limits;

// =============================================================================
// Default Templates
// =============================================================================

pub const DEFAULT_SYSTEM_MESSAGE: &str = r#"You are a software architecture expert deciding whether a Python codebase is small and coherent enough for a language model to draft accurate C4 architecture diagrams from its full source.

Guidelines:
- SIMPLE: up to {simple_max_files} files and {simple_max_lines} lines, clear structure. Suitable.
- MODERATE: up to {moderate_max_files} files and {moderate_max_lines} lines. Usually suitable if the structure is clear.
- COMPLEX: anything larger, or with tangled structure. Not suitable.

Respond ONLY with a JSON object of this shape:
{
  "complexity_level": "simple" | "moderate" | "complex",
  "complexity_score": <number 0-10>,
  "can_proceed": <true | false>,
  "reasoning": "<one or two sentences>",
  "confidence": <number 0-1>
}"#;

pub const DEFAULT_EVALUATION_TEMPLATE: &str = r#"Codebase analysis:

Metrics:
- Files: {files}
- Lines of code: {lines}
- Classes: {classes}
- Functions: {functions}
- Frameworks: {frameworks}

Structure:
- Has tests: {has_tests}
- Has docs: {has_docs}
- Entry points: {entry_points}
- Packages: {packages}

Sample ({sample_file}):
```python
{code_preview}
```

Is this codebase suitable for LLM-based C4 diagram generation?"#;

/// Replace every `{key}` in `template` with its value. Unknown placeholders
/// are left untouched.
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

// =============================================================================
// Prompt Builder
// =============================================================================

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Bulleted hard rules
    Rules(Vec<String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Code block with language and optional title
    Code {
        title: Option<String>,
        language: String,
        content: String,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Add a rules section
    pub fn rules(mut self, rules: &[&str]) -> Self {
        self.sections
            .push(PromptSection::Rules(rules.iter().map(|s| s.to_string()).collect()));
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add code block
    pub fn code(mut self, title: Option<&str>, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            title: title.map(String::from),
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n\n",
                        expertise, task
                    ));
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("<RULES>\n");
                    for rule in rules {
                        prompt.push_str(&format!("- {}\n", rule));
                    }
                    prompt.push_str("</RULES>\n\n");
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code {
                    title,
                    language,
                    content,
                } => {
                    if let Some(t) = title {
                        prompt.push_str(&format!("### File: {}\n", t));
                    }
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Prompt Templates
// =============================================================================

const DSL_EXAMPLE: &str = r#"workspace {
    model {
        user = person "User"
        app = softwareSystem "<System Name>" {
            api = container "<Container Name>" {
                handler = component "<Component Name>" {
                    description "<What it does>"
                }
                store = component "<Component Name>"
                handler -> store "<Relationship>"
            }
        }
        db = softwareSystem "<Database Name>"
        user -> app "<How the user interacts>"
        api -> db "<Relationship>"
    }
    views {
        systemContext app {
            include *
            autoLayout
        }
        container app {
            include *
            autoLayout
        }
        component api {
            include *
            autoLayout
        }
    }
}"#;

/// Preset prompts for the pipeline's LLM calls
pub struct PromptTemplates;

impl PromptTemplates {
    /// Classification request built from configured templates
    pub fn classification(
        report: &AnalysisReport,
        prompts: &PromptsConfig,
        complexity: &ComplexityConfig,
    ) -> ChatRequest {
        let system = render_template(
            &prompts.system_message,
            &[
                ("simple_max_files", complexity.simple.max_files.to_string()),
                ("simple_max_lines", complexity.simple.max_lines.to_string()),
                ("moderate_max_files", complexity.moderate.max_files.to_string()),
                ("moderate_max_lines", complexity.moderate.max_lines.to_string()),
            ],
        );

        let metrics = &report.metrics;
        let structure = &report.structure;
        let sample = report.samples.first();

        let or_none = |items: &[String], empty: &str| {
            if items.is_empty() {
                empty.to_string()
            } else {
                items.join(", ")
            }
        };

        let user = render_template(
            &prompts.evaluation_template,
            &[
                ("files", metrics.files.to_string()),
                ("lines", metrics.lines.to_string()),
                ("classes", metrics.classes.to_string()),
                ("functions", metrics.functions.to_string()),
                ("frameworks", or_none(&metrics.frameworks, "None detected")),
                ("has_tests", structure.has_tests.to_string()),
                ("has_docs", structure.has_docs.to_string()),
                (
                    "entry_points",
                    or_none(
                        &structure.entry_points[..structure
                            .entry_points
                            .len()
                            .min(limits::PROMPT_ENTRY_POINTS)],
                        "None found",
                    ),
                ),
                ("packages", structure.packages.len().to_string()),
                (
                    "sample_file",
                    sample.map_or_else(|| "N/A".to_string(), |s| s.file.clone()),
                ),
                (
                    "code_preview",
                    sample.map_or_else(
                        || "No samples available".to_string(),
                        |s| s.preview.chars().take(limits::PROMPT_PREVIEW_CHARS).collect(),
                    ),
                ),
            ],
        );

        ChatRequest::new(system, user)
    }

    /// Drafting request embedding every source file
    pub fn draft(project_name: &str, files: &[SourceFile]) -> ChatRequest {
        let system = PromptBuilder::new()
            .role(
                "software architect",
                "C4 architecture diagrams written in Structurizr DSL",
            )
            .text(
                "You will receive the COMPLETE source code of a Python application. \
                 Model its real architecture as one Structurizr DSL workspace.",
            )
            .rules(&[
                "Do NOT assign containers or components to variables outside their parent block",
                "Define every container INSIDE its parent softwareSystem block",
                "Define every component INSIDE its parent container block",
                "Define component relationships INSIDE the container block",
                "Do NOT reference containers or components at the top level",
                "Use only valid Structurizr DSL syntax",
                "Base the model ENTIRELY on the provided code, not on assumptions",
            ])
            .code(None, "", DSL_EXAMPLE)
            .text(
                "Output ONLY the DSL, starting with 'workspace' and ending with its closing brace.",
            )
            .build();

        let separator = "=".repeat(60);
        let mut user = PromptBuilder::new().text(&format!(
            "Project Name: {}\n\n{}\nCOMPLETE PYTHON CODEBASE:\n{}",
            project_name, separator, separator
        ));
        for file in files {
            user = user.code(Some(&file.relative_path), "python", &file.content);
        }
        let user = user
            .text(&separator)
            .objectives(&[
                "Accurately represent the architecture found in the code",
                "Include all major components and their relationships",
                "Use meaningful names taken from the code",
                "Provide System Context, Container and Component views",
                "Be syntactically correct and complete",
            ])
            .text("Generate the Structurizr DSL:")
            .build();

        ChatRequest::new(system, user)
    }
}
