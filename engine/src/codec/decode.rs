//! Response decoding.
//!
//! Each field arrives as `{"<name>": {"type": "<TYPE>", "value": ...}}` and
//! is decoded by an explicit per-shape function. Under the default
//! [`DecodePolicy::BestEffort`] a bad field never aborts the response:
//! unknown types are dropped and malformed values leave the field empty.

use crate::{
    error::Result,
    field::{Field, FieldValue, User},
    field_type::{FieldType, Shape},
    file::FileRef,
    Error, Record, RecordId, ResultSet,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// How field-level anomalies are handled while decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Drop fields of unknown type and leave malformed values empty.
    #[default]
    BestEffort,
    /// Fail the whole decode with [`Error::InvalidField`].
    Strict,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordsResponse {
    records: Vec<Value>,
    #[serde(default)]
    total_count: Option<Value>,
}

#[derive(Deserialize)]
struct RecordResponse {
    record: Value,
}

/// Decodes response JSON into records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    policy: DecodePolicy,
}

impl Decoder {
    pub fn new(policy: DecodePolicy) -> Self {
        Self { policy }
    }

    pub fn strict() -> Self {
        Self::new(DecodePolicy::Strict)
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Decode the `records` array of a response.
    pub fn decode(&self, json: &str) -> Result<Vec<Record>> {
        let response: RecordsResponse = serde_json::from_str(json)?;
        self.decode_records(&response.records)
    }

    /// Decode a response into a [`ResultSet`], keeping `totalCount` when the
    /// service returned one.
    pub fn decode_result_set(&self, json: &str) -> Result<ResultSet> {
        let response: RecordsResponse = serde_json::from_str(json)?;
        let records = self.decode_records(&response.records)?;
        let total_count = match response.total_count {
            None | Some(Value::Null) => None,
            Some(raw) => match parse_i64(&raw) {
                Some(n) => Some(n),
                None if self.policy == DecodePolicy::Strict => {
                    return Err(Error::Parse(format!("invalid totalCount: {raw}")))
                }
                None => None,
            },
        };

        let result_set = ResultSet::new(records);
        Ok(match total_count {
            Some(n) => result_set.with_total_count(n),
            None => result_set,
        })
    }

    /// Decode a single-record response: `{"record": {...}}`.
    pub fn decode_record(&self, json: &str) -> Result<Record> {
        let response: RecordResponse = serde_json::from_str(json)?;
        match response.record.as_object() {
            Some(obj) => self.decode_fields(obj),
            None => Err(Error::Parse("record is not an object".into())),
        }
    }

    /// Decode a field object into a record. `__ID__` and `__REVISION__`
    /// fields become the record's id and revision.
    pub fn decode_fields(&self, obj: &Map<String, Value>) -> Result<Record> {
        let mut record = Record::new();
        for (name, elem) in obj {
            if let Some(field) = self.decode_field(name, elem)? {
                record.add_field(field)?;
            }
        }
        Ok(record)
    }

    fn decode_records(&self, elems: &[Value]) -> Result<Vec<Record>> {
        elems
            .iter()
            .enumerate()
            .map(|(i, elem)| match elem.as_object() {
                Some(obj) => self.decode_fields(obj),
                None if self.policy == DecodePolicy::Strict => {
                    Err(Error::Parse(format!("record {i} is not an object")))
                }
                None => Ok(Record::new()),
            })
            .collect()
    }

    fn decode_field(&self, name: &str, elem: &Value) -> Result<Option<Field>> {
        let Some(obj) = elem.as_object() else {
            return self.skip(name, "field is not an object");
        };
        let Some(type_name) = obj.get("type").and_then(Value::as_str) else {
            return self.skip(name, "missing type");
        };
        let Some(field_type) = FieldType::lookup(type_name) else {
            return self.skip(name, &format!("unknown type {type_name}"));
        };
        let Some(value) = obj.get("value") else {
            return self.skip(name, "missing value");
        };
        if value.is_null() || is_blank_scalar(field_type.shape(), value) {
            return Ok(Some(Field::empty(name, field_type)));
        }

        match self.decode_value(name, field_type.shape(), value) {
            Ok(v) => Field::new(name, field_type, Some(v)).map(Some),
            Err(Error::InvalidField { .. }) if self.policy == DecodePolicy::BestEffort => {
                Ok(Some(Field::empty(name, field_type)))
            }
            Err(e) => Err(e),
        }
    }

    fn skip(&self, name: &str, reason: &str) -> Result<Option<Field>> {
        match self.policy {
            DecodePolicy::BestEffort => Ok(None),
            DecodePolicy::Strict => Err(invalid(name, reason)),
        }
    }

    fn decode_value(&self, name: &str, shape: Shape, value: &Value) -> Result<FieldValue> {
        match shape {
            Shape::Text => decode_text(name, value).map(FieldValue::Text),
            Shape::Number => decode_number(name, value).map(FieldValue::Number),
            Shape::TextList => each(name, value, decode_text).map(FieldValue::TextList),
            Shape::FileList => each(name, value, decode_file).map(FieldValue::FileList),
            Shape::User => decode_user(name, value).map(FieldValue::User),
            Shape::UserList => each(name, value, decode_user).map(FieldValue::UserList),
            Shape::Subtable => each(name, value, |name, row| self.decode_row(name, row))
                .map(FieldValue::Subtable),
        }
    }

    fn decode_row(&self, name: &str, row: &Value) -> Result<Record> {
        let obj = row
            .as_object()
            .ok_or_else(|| invalid(name, "subtable row is not an object"))?;
        let fields = obj
            .get("value")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid(name, "subtable row has no value object"))?;

        let mut record = self.decode_fields(fields)?;
        match obj.get("id") {
            None | Some(Value::Null) => {}
            Some(raw) => match parse_i64(raw) {
                Some(id) => record.set_id(id),
                None if self.policy == DecodePolicy::Strict => {
                    return Err(invalid(name, &format!("invalid subtable row id {raw}")))
                }
                None => {}
            },
        }
        Ok(record)
    }
}

/// Decode the `records` array with the default best-effort policy.
pub fn decode(json: &str) -> Result<Vec<Record>> {
    Decoder::default().decode(json)
}

/// Decode a records response into a [`ResultSet`] with the default policy.
pub fn decode_result_set(json: &str) -> Result<ResultSet> {
    Decoder::default().decode_result_set(json)
}

/// Decode a single-record response with the default policy.
pub fn decode_record(json: &str) -> Result<Record> {
    Decoder::default().decode_record(json)
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidField {
        field: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Unset numbers and users arrive as `""`; that is an empty value, not an
/// anomaly.
fn is_blank_scalar(shape: Shape, value: &Value) -> bool {
    matches!(shape, Shape::Number | Shape::User)
        && value.as_str().is_some_and(|s| s.trim().is_empty())
}

/// Integers arrive as decimal strings, occasionally as JSON numbers.
pub(crate) fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn each<T>(
    name: &str,
    value: &Value,
    mut decode_one: impl FnMut(&str, &Value) -> Result<T>,
) -> Result<Vec<T>> {
    value
        .as_array()
        .ok_or_else(|| invalid(name, "expected an array"))?
        .iter()
        .map(|elem| decode_one(name, elem))
        .collect()
}

fn decode_text(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(invalid(name, "expected a string")),
    }
}

fn decode_number(name: &str, value: &Value) -> Result<i64> {
    parse_i64(value).ok_or_else(|| invalid(name, &format!("not an integer: {value}")))
}

fn decode_user(name: &str, value: &Value) -> Result<User> {
    let code = value
        .get("code")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(name, "user without code"))?;
    Ok(User {
        code: code.to_string(),
        name: optional_str(value, "name"),
    })
}

fn decode_file(name: &str, value: &Value) -> Result<FileRef> {
    let file_key = value
        .get("fileKey")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(name, "file without fileKey"))?;
    Ok(FileRef {
        file_key: file_key.to_string(),
        name: optional_str(value, "name"),
        content_type: optional_str(value, "contentType"),
        size: value
            .get("size")
            .and_then(parse_i64)
            .and_then(|n| u64::try_from(n).ok()),
        url: optional_str(value, "url"),
    })
}

fn optional_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
