//! Atlassian Document Format builders
//!
//! JIRA v3 requires ADF for descriptions, comments and worklog comments.

use serde_json::{json, Value};

fn paragraph(text: &str) -> Value {
    json!({
        "type": "paragraph",
        "content": [{ "type": "text", "text": text }]
    })
}

fn document(content: Vec<Value>) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": content
    })
}

/// Single-paragraph document.
pub fn adf_document(text: &str) -> Value {
    document(vec![paragraph(text)])
}

/// One paragraph per line.
///
/// The built-in tools send single-paragraph bodies; this and
/// [`adf_document_from_text`] are exported for library callers.
pub fn adf_document_multiline<S: AsRef<str>>(lines: &[S]) -> Value {
    document(lines.iter().map(|line| paragraph(line.as_ref())).collect())
}

/// Split on newlines, dropping blank lines.
///
/// Falls back to a single paragraph holding `text` when no line remains.
pub fn adf_document_from_text(text: &str) -> Value {
    let lines: Vec<&str> = text.split('\n').filter(|line| !line.trim().is_empty()).collect();
    if lines.is_empty() {
        adf_document(text)
    } else {
        adf_document_multiline(&lines)
    }
}
