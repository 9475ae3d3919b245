pub mod error;

pub use error::{ErrorCategory, ErrorClassifier, FlowError, LlmError, Result};
