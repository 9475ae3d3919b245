//! Structurizr DSL Validation
//!
//! Coarse structural checks on a drafted workspace. The DSL grammar is not
//! parsed; the checks look for the required top-level sections and
//! balanced braces, which is enough to catch truncated or chatty model
//! output before it is published.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `views` used as a section keyword, not inside a quoted title
static VIEWS_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|[{}])\s*(views)\s*\{").unwrap());

/// Result of validating one DSL document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslValidation {
    pub is_valid: bool,
    pub has_workspace: bool,
    pub has_model: bool,
    pub has_views: bool,
    /// workspace, model and views are all present
    pub has_required_sections: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub trait DslValidator: Send + Sync {
    fn validate(&self, content: &str) -> DslValidation;

    /// Add missing presentation defaults. Must be idempotent.
    fn enhance(&self, content: &str) -> String {
        enhance(content)
    }
}

/// Keyword and brace-balance validator
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }
}

impl DslValidator for StructuralValidator {
    fn validate(&self, content: &str) -> DslValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let has_workspace = content.contains("workspace");
        if !has_workspace {
            errors.push("Missing 'workspace' definition".to_string());
        }

        let has_model = content.contains("model");
        if !has_model {
            errors.push("Missing 'model' section".to_string());
        }

        let has_views = content.contains("views");
        if !has_views {
            warnings.push("Missing 'views' section - diagrams won't be visible".to_string());
        }

        let open = content.matches('{').count();
        let close = content.matches('}').count();
        if open != close {
            errors.push(format!("Mismatched braces: {} open, {} close", open, close));
        }

        if !content.contains("softwareSystem") && !content.contains("software_system") {
            warnings.push("No software system defined".to_string());
        }

        DslValidation {
            is_valid: errors.is_empty(),
            has_workspace,
            has_model,
            has_views,
            has_required_sections: has_workspace && has_model && has_views,
            errors,
            warnings,
        }
    }
}

const DEFAULT_STYLES: &str = r##"        styles {
            element "Software System" {
                background #1168bd
                color #ffffff
            }
            element "Container" {
                background #438dd5
                color #ffffff
            }
            element "Component" {
                background #85bbf0
                color #000000
            }
            element "Person" {
                shape person
                background #08427b
                color #ffffff
            }
            element "Database" {
                shape cylinder
            }
            element "External System" {
                background #999999
                color #ffffff
            }
        }"##;

/// Insert the default `styles` block as the last entry of `views`.
///
/// Content that already mentions `styles`, has no `views` section, or whose
/// `views` block is never closed is returned unchanged.
pub fn enhance(content: &str) -> String {
    if content.contains("styles") {
        return content.to_string();
    }
    let Some(views_at) = VIEWS_SECTION
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.start())
    else {
        return content.to_string();
    };
    let Some(close_at) = matching_close(content, views_at) else {
        return content.to_string();
    };

    let (head, tail) = content.split_at(close_at);
    let line_start = head.rfind('\n').map_or(0, |p| p + 1);
    let indent = &head[line_start..];
    let indent = if indent.trim().is_empty() { indent } else { "" };

    format!("{}\n{}\n{}{}", head.trim_end(), DEFAULT_STYLES, indent, tail)
}

/// Byte offset of the brace closing the first block opened at or after `from`
fn matching_close(content: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut opened = false;

    for (i, c) in content[from..].char_indices() {
        match c {
            '{' => {
                opened = true;
                depth += 1;
            }
            '}' if opened => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + i);
                }
            }
            _ => {}
        }
    }
    None
}
