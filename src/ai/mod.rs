//! AI Integration Layer
//!
//! LLM providers, prompt construction, response parsing and timeouts.

pub mod json;
pub mod prompt;
pub mod provider;
pub mod timeout;

pub use json::extract_json_object;
pub use prompt::{PromptBuilder, PromptTemplates, render_template};
pub use provider::{
    ChatRequest, ClaudeCodeProvider, ErrorCategory, ErrorClassifier, LlmError, LlmProvider,
    LlmResponse, OpenAiProvider, ProviderConfig, SharedProvider, TokenUsage, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout, with_timeout_map};
