//! Best-effort structured extraction from free text.
//!
//! Vision models are asked for a JSON object but often wrap it in prose or
//! code fences. This locates the first usable object in the reply and reads
//! the candidate event fields out of it.

use serde_json::{Map, Value};

use crate::error::{PhotocalError, PhotocalResult};

/// Raw fields as the model returned them, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFields {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub context: Option<String>,
}

impl CandidateFields {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        CandidateFields {
            title: field(object, "title"),
            date: field(object, "date"),
            time: field(object, "time"),
            context: field(object, "context"),
        }
    }
}

/// Pull the candidate fields out of a model reply.
pub fn extract_fields(content: &str) -> PhotocalResult<CandidateFields> {
    let object = find_json_object(content).ok_or_else(|| {
        PhotocalError::MalformedResponse("No valid JSON found in API response".into())
    })?;

    Ok(CandidateFields::from_object(&object))
}

/// Find the first JSON object embedded in `text`.
///
/// The widest span (first `{` to last `}`) is tried first. If that doesn't
/// parse, e.g. because the prose after the object contains braces, every
/// balanced span is tried left to right.
pub fn find_json_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;

    if end > start {
        if let Some(object) = parse_object(&text[start..=end]) {
            return Some(object);
        }
    }

    balanced_spans(text).into_iter().find_map(parse_object)
}

fn parse_object(span: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(span) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Brace-balanced spans starting at each `{`, ignoring braces inside strings.
fn balanced_spans(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();

    for (start, _) in text.match_indices('{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &b) in bytes[start..].iter().enumerate() {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        spans.push(&text[start..=start + offset]);
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    spans
}

/// A field counts as present when it's a non-empty string or a plain scalar.
fn field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
