//! C4 Diagram Drafting
//!
//! - `generator`: model-backed Structurizr DSL drafting
//! - `validator`: structural checks and default styling
//! - `draft`: draft results and the `{project}_c4.dsl` artifact

pub mod draft;
pub mod generator;
pub mod validator;

pub use draft::{DraftResult, draft_file_name, latest_draft, persist_draft, project_name_for};
pub use generator::{DraftGenerator, GeneratedDraft, LlmDraftGenerator, extract_dsl};
pub use validator::{DslValidation, DslValidator, StructuralValidator, enhance};
