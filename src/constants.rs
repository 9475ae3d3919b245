//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Draft file naming
pub mod draft {
    /// Suffix appended to the sanitized project name
    pub const FILE_SUFFIX: &str = "_c4.dsl";

    /// Glob used when looking for drafts in a directory
    pub const FILE_GLOB: &str = "*_c4.dsl";

    /// Project name used when none can be derived
    pub const DEFAULT_PROJECT_NAME: &str = "system";
}

/// Complexity scoring
pub mod complexity {
    pub const SIMPLE_SCORE: f32 = 3.0;
    pub const MODERATE_SCORE: f32 = 5.0;
    pub const COMPLEX_SCORE: f32 = 8.0;

    /// Confidence attached to heuristic decisions
    pub const FALLBACK_CONFIDENCE: f32 = 0.5;

    /// Characters of the first sample embedded in the classifier prompt
    pub const PROMPT_PREVIEW_CHARS: usize = 500;

    /// Entry points listed in the classifier prompt
    pub const PROMPT_ENTRY_POINTS: usize = 3;
}

/// Draft file watching
pub mod monitor {
    /// Seconds between directory scans
    pub const DEFAULT_INTERVAL_SECS: u64 = 2;

    /// Seconds to wait for a draft before giving up
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Pause before uploading a freshly detected file (milliseconds)
    pub const SETTLE_DELAY_MS: u64 = 1000;

    /// Seconds `process` waits for an expected file
    pub const PROCESS_WAIT_SECS: u64 = 10;
}

/// Workspace service links shown in instructions
pub mod service {
    /// Browser DSL editor used for manual uploads
    pub const MANUAL_UPLOAD_URL: &str = "https://structurizr.com/dsl";

    /// Publishing tool downloads
    pub const TOOL_RELEASES_URL: &str = "https://github.com/structurizr/cli/releases";

    /// Where API credentials are documented
    pub const API_HELP_URL: &str = "https://structurizr.com/help/web-api";
}

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    /// Graceful failure or nothing to do
    pub const FAILURE: u8 = 1;
    /// Unexpected error
    pub const ERROR: u8 = 2;
    /// Ctrl-C
    pub const INTERRUPTED: u8 = 130;
}
