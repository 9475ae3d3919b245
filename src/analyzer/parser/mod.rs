//! Source Parser Module
//!
//! Tree-sitter based extraction of coarse code facts.

pub mod python;

pub use python::PythonParser;

use crate::types::{FlowError, Result};

/// Per-file counts extracted from a syntax tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFacts {
    pub classes: usize,
    pub functions: usize,
    /// Root module names, in source order (duplicates kept)
    pub imports: Vec<String>,
}

/// Create a tree-sitter parser with the given language set
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| FlowError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

/// Source text covered by a node
pub fn get_node_text<'a>(node: tree_sitter::Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}
