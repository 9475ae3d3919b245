//! JSON extraction for LLM responses
//!
//! Models often wrap their JSON in markdown fences or surround it with
//! prose. These helpers recover the first JSON object from such text:
//! - Markdown code fence wrapping (```json ... ```)
//! - JSON embedded in explanatory text
//! - Trailing commas before `}` or `]`

use serde_json::Value;
use tracing::debug;

/// Extract the first JSON object from an LLM response, if any
pub fn extract_json_object(raw: &str) -> Option<Value> {
    let cleaned = strip_code_fences(raw.trim().trim_start_matches('\u{feff}'));

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }

    let embedded = embedded_object(cleaned)?;
    match serde_json::from_str::<Value>(embedded) {
        Ok(value) => Some(value),
        Err(_) => {
            let repaired = strip_trailing_commas(embedded);
            let value = serde_json::from_str::<Value>(&repaired).ok()?;
            debug!("JSON object recovered after removing trailing commas");
            Some(value)
        }
    }
}

/// Strip one surrounding markdown code fence
fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    if result.starts_with("```") {
        result = match result.find('\n') {
            Some(first_newline) => &result[first_newline + 1..],
            None => result.trim_start_matches('`'),
        };
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }

    result.trim()
}

/// Slice of the first balanced `{ ... }` region, string-aware
fn embedded_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove commas directly followed (ignoring whitespace) by `}` or `]`
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            result.push(ch);
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some('}') | Some(']')) {
                    continue;
                }
            }
            _ => {}
        }

        result.push(ch);
    }

    result
}
