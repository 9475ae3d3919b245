use serde::{Deserialize, Serialize};

/// Kinds of publish failure, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    MissingTool,
    AuthError,
    NetworkError,
    WorkspaceError,
    Unknown,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTool => write!(f, "missing_tool"),
            Self::AuthError => write!(f, "auth_error"),
            Self::NetworkError => write!(f, "network_error"),
            Self::WorkspaceError => write!(f, "workspace_error"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

const MISSING_TOOL: &[&str] = &["command not found", "no such file"];
const AUTH: &[&str] = &[
    "unauthorized",
    "401",
    "invalid key",
    "authentication",
    "incorrect api key",
];
const NETWORK: &[&str] = &["network", "timeout", "connection", "dns"];
const WORKSPACE: &[&str] = &["workspace", "403", "forbidden", "not found"];

/// Classify raw publish error text. First matching category wins.
///
/// Substring matching on free text: a message mentioning both "timeout" and
/// "workspace" is a network error, and "404" alone is unknown.
pub fn classify_failure(error_text: &str, tool_name: &str) -> FailureCategory {
    let text = error_text.to_lowercase();
    let tool = tool_name.trim().to_lowercase();
    let any = |phrases: &[&str]| phrases.iter().any(|p| text.contains(p));

    if any(MISSING_TOOL) || (!tool.is_empty() && text.contains(&tool)) {
        FailureCategory::MissingTool
    } else if any(AUTH) {
        FailureCategory::AuthError
    } else if any(NETWORK) {
        FailureCategory::NetworkError
    } else if any(WORKSPACE) {
        FailureCategory::WorkspaceError
    } else {
        FailureCategory::Unknown
    }
}
