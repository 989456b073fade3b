//! Lenient decoding of fetched source responses.
//!
//! Fetchers hand over loosely shaped JSON. A response whose `paper` cannot be
//! decoded is rejected on its own; malformed `citations` / `references`
//! lists are recovered locally and never fail the response.

use crate::error::{OptionExt, ReconcileError, Result};
use crate::model::{Paper, SourceResponse};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Best-effort decode of a citation or reference list.
///
/// Elements that do not decode are skipped; a single object is treated as a
/// one-element list; anything else yields an empty list.
pub fn decode_child_list(value: Option<Value>, field: &str) -> Vec<Paper> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(object @ Value::Object(_)) => vec![object],
        Some(other) => {
            warn!(field, kind = json_kind(&other), "Child list is not an array, treating as empty");
            return Vec::new();
        }
    };

    let total = items.len();
    let papers: Vec<Paper> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Paper>(item) {
            Ok(paper) => Some(paper),
            Err(e) => {
                warn!(field, index, error = %e, "Skipping malformed child record");
                None
            }
        })
        .collect();

    if papers.len() < total {
        debug!(field, kept = papers.len(), total, "Recovered partial child list");
    }
    papers
}

/// Decode one source response.
pub fn decode_response(value: Value) -> Result<SourceResponse> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(ReconcileError::MalformedRecord(format!(
                "source response must be an object, got {}",
                json_kind(&other)
            )))
        }
    };

    let paper = fields.remove("paper").ok_or_malformed("source response has no paper")?;
    let paper: Paper = serde_json::from_value(paper)
        .map_err(|e| ReconcileError::MalformedRecord(format!("paper: {e}")))?;

    Ok(SourceResponse {
        paper,
        citations: decode_child_list(fields.remove("citations"), "citations"),
        references: decode_child_list(fields.remove("references"), "references"),
    })
}

/// Decode a JSON array of source responses, one result per element.
pub fn decode_responses(value: Value) -> Result<Vec<Result<SourceResponse>>> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(decode_response).collect()),
        other => Err(ReconcileError::MalformedRecord(format!(
            "expected an array of source responses, got {}",
            json_kind(&other)
        ))),
    }
}

/// Read and decode a JSON file of source responses.
pub fn load_responses(path: &Path) -> Result<Vec<Result<SourceResponse>>> {
    let content = std::fs::read_to_string(path)?;
    decode_responses(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_full_response() -> Result<()> {
        let response = decode_response(json!({
            "paper": {"title": ["Root"], "provenance": "CrossRef"},
            "citations": [{"title": "Citing"}],
            "references": [{"title": ["Ref 1"]}, {"title": ["Ref 2"]}]
        }))?;
        assert_eq!(response.paper.title, vec!["Root"]);
        assert_eq!(response.paper.provenance, vec!["CrossRef"]);
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.references.len(), 2);
        Ok(())
    }

    #[test]
    fn test_malformed_child_list_recovered() -> Result<()> {
        let response = decode_response(json!({
            "paper": {"title": "Root"},
            "citations": "not a list",
            "references": [{"title": "Ok"}, 42, {"title": {"nested": true}}, {"title": "Also ok"}]
        }))?;
        assert!(response.citations.is_empty());
        assert_eq!(response.references.len(), 2);
        assert_eq!(response.references[1].title, vec!["Also ok"]);
        Ok(())
    }

    #[test]
    fn test_single_object_child_list() {
        let papers = decode_child_list(Some(json!({"title": "Only"})), "citations");
        assert_eq!(papers.len(), 1);
    }

    #[test]
    fn test_missing_paper_is_rejected() {
        let err = decode_response(json!({"citations": []})).expect_err("should reject");
        assert!(matches!(err, ReconcileError::MalformedRecord(_)));
        assert!(decode_response(json!([1, 2])).is_err());
    }

    #[test]
    fn test_load_responses_keeps_per_item_results() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        write!(temp, r#"[{{"paper": {{"title": "A"}}}}, {{"nope": 1}}]"#)?;

        let decoded = load_responses(temp.path())?;
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].is_ok());
        assert!(decoded[1].is_err());
        Ok(())
    }

    #[test]
    fn test_top_level_must_be_array() {
        assert!(decode_responses(json!({"paper": {}})).is_err());
    }
}
