//! Small non-record responses: inserted ids, file keys and error bodies.

use super::decode::parse_i64;
use crate::{error::Result, Error, RecordId, Revision};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ids and revisions returned by an insert call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertResult {
    pub ids: Vec<RecordId>,
    pub revisions: Vec<Revision>,
}

/// Error body returned by the service on a failed call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Per-field validation details, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id: {}, code: {}, message: {}",
            self.id.as_deref().unwrap_or("-"),
            self.code.as_deref().unwrap_or("-"),
            self.message.as_deref().unwrap_or("-"),
        )
    }
}

#[derive(Deserialize)]
struct InsertResponse {
    ids: Vec<Value>,
    #[serde(default)]
    revisions: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileKeyResponse {
    file_key: String,
}

/// Decode `{"ids": [...], "revisions": [...]}`. Values may be strings or
/// numbers.
pub fn decode_insert_response(json: &str) -> Result<InsertResult> {
    let response: InsertResponse = serde_json::from_str(json)?;
    Ok(InsertResult {
        ids: integers(&response.ids, "id")?,
        revisions: integers(&response.revisions, "revision")?,
    })
}

/// Decode `{"fileKey": "..."}` returned by a file upload.
pub fn decode_file_key(json: &str) -> Result<String> {
    let response: FileKeyResponse = serde_json::from_str(json)?;
    Ok(response.file_key)
}

/// Parse an error body. Returns `None` when the body is not the expected
/// JSON object.
pub fn decode_error_response(json: &str) -> Option<ErrorResponse> {
    serde_json::from_str(json).ok()
}

fn integers(values: &[Value], what: &str) -> Result<Vec<i64>> {
    values
        .iter()
        .map(|v| parse_i64(v).ok_or_else(|| Error::Parse(format!("invalid {what}: {v}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_response_with_string_ids() {
        let result = decode_insert_response(r#"{"ids":["3","4"],"revisions":["1","1"]}"#).unwrap();
        assert_eq!(result.ids, [3, 4]);
        assert_eq!(result.revisions, [1, 1]);
    }

    #[test]
    fn insert_response_with_numbers_and_no_revisions() {
        let result = decode_insert_response(r#"{"ids":[7]}"#).unwrap();
        assert_eq!(result.ids, [7]);
        assert!(result.revisions.is_empty());
    }

    #[test]
    fn insert_response_rejects_garbage_ids() {
        assert!(matches!(
            decode_insert_response(r#"{"ids":["x"]}"#),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn file_key() {
        assert_eq!(decode_file_key(r#"{"fileKey":"c15b3870"}"#).unwrap(), "c15b3870");
        assert!(decode_file_key("{}").is_err());
    }

    #[test]
    fn error_response() {
        let err = decode_error_response(
            r#"{"code":"GAIA_RE01","id":"abc","message":"not found","errors":{"x":1}}"#,
        )
        .unwrap();
        assert_eq!(err.code.as_deref(), Some("GAIA_RE01"));
        assert_eq!(err.to_string(), "id: abc, code: GAIA_RE01, message: not found");
        assert!(err.errors.is_some());

        assert_eq!(decode_error_response("<html>502</html>"), None);
    }
}
