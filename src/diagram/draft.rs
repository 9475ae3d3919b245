use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

use super::generator::GeneratedDraft;
use super::validator::DslValidation;
use crate::constants::draft as naming;
use crate::types::Result;

/// Outcome of the drafting stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResult {
    /// Final (possibly enhanced) DSL. `None` when generation failed.
    pub content: Option<String>,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub files_processed: usize,
    pub draft_path: Option<PathBuf>,
    pub save_error: Option<String>,
}

impl DraftResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Default::default()
        }
    }

    pub fn from_generated(draft: GeneratedDraft, validation: DslValidation) -> Self {
        Self {
            content: Some(draft.content),
            is_valid: validation.is_valid,
            errors: validation.errors,
            warnings: validation.warnings,
            files_processed: draft.files_processed,
            draft_path: None,
            save_error: None,
        }
    }

    /// Path of a valid draft that was written to disk
    pub fn publishable_path(&self) -> Option<&Path> {
        if self.is_valid {
            self.draft_path.as_deref()
        } else {
            None
        }
    }
}

/// `{project}_c4.dsl` with path separators and other unsafe characters replaced
pub fn draft_file_name(project_name: &str) -> String {
    let sanitized: String = project_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('.');

    let stem = if sanitized.is_empty() {
        naming::DEFAULT_PROJECT_NAME
    } else {
        sanitized
    };
    format!("{}{}", stem, naming::FILE_SUFFIX)
}

/// Write the draft into `dir`, replacing any previous draft for the project
pub fn persist_draft(dir: &Path, project_name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(draft_file_name(project_name));
    fs::write(&path, content)?;
    info!("Saved draft to {}", path.display());
    Ok(path)
}

/// Most recently modified `*_c4.dsl` directly inside `dir`
pub fn latest_draft(dir: &Path) -> Option<PathBuf> {
    let pattern = dir.join(naming::FILE_GLOB);
    let entries = glob::glob(&pattern.to_string_lossy()).ok()?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for path in entries.filter_map(|e| e.ok()) {
        let Ok(modified) = path.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    if let Some((_, path)) = &newest {
        debug!("Latest draft in {}: {}", dir.display(), path.display());
    }
    newest.map(|(_, path)| path)
}

/// Project name derived from a codebase directory
pub fn project_name_for(codebase: &Path) -> String {
    codebase
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(codebase)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| naming::DEFAULT_PROJECT_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_draft_file_name() {
        assert_eq!(draft_file_name("shop"), "shop_c4.dsl");
        assert_eq!(draft_file_name("my shop/api"), "my_shop_api_c4.dsl");
        assert_eq!(draft_file_name("../etc"), "_etc_c4.dsl");
        assert_eq!(draft_file_name("   "), "system_c4.dsl");
    }

    #[test]
    fn test_persist_overwrites() {
        let temp = TempDir::new().unwrap();
        let first = persist_draft(temp.path(), "shop", "workspace { }").unwrap();
        let second = persist_draft(temp.path(), "shop", "workspace { model { } }").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(second).unwrap(), "workspace { model { } }");
    }

    #[test]
    fn test_persist_into_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        assert!(persist_draft(&temp.path().join("gone"), "shop", "x").is_err());
    }

    #[test]
    fn test_latest_draft_prefers_newest() {
        let temp = TempDir::new().unwrap();
        assert!(latest_draft(temp.path()).is_none());

        fs::write(temp.path().join("notes.txt"), "x").unwrap();
        let old = temp.path().join("old_c4.dsl");
        fs::write(&old, "a").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let new = temp.path().join("new_c4.dsl");
        fs::write(&new, "b").unwrap();

        assert_eq!(latest_draft(temp.path()), Some(new));
    }

    #[test]
    fn test_publishable_path_requires_validity() {
        let mut result = DraftResult {
            draft_path: Some(PathBuf::from("/tmp/shop_c4.dsl")),
            ..Default::default()
        };
        assert!(result.publishable_path().is_none());
        result.is_valid = true;
        assert!(result.publishable_path().is_some());
    }

    #[test]
    fn test_project_name_for() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("inventory");
        fs::create_dir(&dir).unwrap();
        assert_eq!(project_name_for(&dir), "inventory");
    }
}
