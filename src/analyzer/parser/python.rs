use tree_sitter::{Query, QueryCursor, StreamingIterator};

use super::{SourceFacts, create_ts_parser, get_node_text};
use crate::types::{FlowError, Result};

const PYTHON_QUERY: &str = r#"
    (class_definition
        name: (identifier) @class
    )
    (function_definition
        name: (identifier) @function
    )
    (import_statement
        name: (dotted_name) @import
    )
    (import_statement
        name: (aliased_import
            name: (dotted_name) @import)
    )
    (import_from_statement
        module_name: (dotted_name) @import
    )
"#;

/// Extracts class, function and import facts from Python sources.
pub struct PythonParser {
    query: Query,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let query =
            Query::new(&tree_sitter_python::LANGUAGE.into(), PYTHON_QUERY).map_err(|e| {
                FlowError::Parse {
                    message: format!("Invalid Python query: {}", e),
                    path: String::new(),
                }
            })?;
        Ok(Self { query })
    }

    /// Parse one file. Sources with syntax errors are rejected so callers
    /// can fall back to line counting.
    pub fn parse(&self, path: &str, content: &str) -> Result<SourceFacts> {
        let mut parser = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| FlowError::Parse {
                message: "Failed to parse Python file".to_string(),
                path: path.to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(FlowError::Parse {
                message: "Python syntax error".to_string(),
                path: path.to_string(),
            });
        }

        let mut facts = SourceFacts::default();
        let capture_names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, root, content.as_bytes());

        while let Some(m) = matches.next() {
            for cap in m.captures {
                match capture_names[cap.index as usize] {
                    "class" => facts.classes += 1,
                    "function" => facts.functions += 1,
                    "import" => {
                        let module = get_node_text(cap.node, content.as_bytes());
                        if let Some(root_name) = module.split('.').next()
                            && !root_name.is_empty()
                        {
                            facts.imports.push(root_name.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(facts)
    }
}
