//! Request encoding.
//!
//! Every field travels as `{"<name>": {"value": <shape>}}`. Numbers are sent
//! as decimal strings. Empty scalar fields become `""` and empty list-shaped
//! fields become `[]`.

use crate::{
    error::Result,
    field::{normalize_name, Field, FieldValue},
    field_type::Shape,
    AppId, Error, Record, RecordId, Revision,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Revision sent in delete requests for records without one.
pub const NO_REVISION: Revision = -1;

#[derive(Serialize)]
struct InsertRequest {
    app: AppId,
    records: Vec<Map<String, Value>>,
}

#[derive(Serialize)]
struct UpdateEntry {
    id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<Revision>,
    record: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateByKeyEntry {
    update_key: UpdateKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<Revision>,
    record: Map<String, Value>,
}

#[derive(Serialize)]
struct UpdateKey {
    field: String,
    value: Value,
}

#[derive(Serialize)]
struct UpdateRequest<E> {
    app: AppId,
    records: Vec<E>,
}

#[derive(Serialize)]
struct DeleteRequest {
    app: AppId,
    ids: Vec<RecordId>,
    revisions: Vec<Revision>,
}

/// Encode records for an insert call.
pub fn encode_insert(app: AppId, records: &[Record]) -> Result<String> {
    let records = records
        .iter()
        .map(encode_fields)
        .collect::<Result<Vec<_>>>()?;
    to_json(&InsertRequest { app, records })
}

/// Apply the fields of one record to every listed id.
pub fn encode_update_by_ids(app: AppId, ids: &[RecordId], record: &Record) -> Result<String> {
    let fields = encode_fields(record)?;
    let records = ids
        .iter()
        .map(|&id| UpdateEntry {
            id,
            revision: None,
            record: fields.clone(),
        })
        .collect();
    to_json(&UpdateRequest { app, records })
}

/// Update each record by its own id, adding its revision when one is set.
pub fn encode_update_by_records(app: AppId, records: &[Record]) -> Result<String> {
    let records = records
        .iter()
        .map(|record| {
            Ok(UpdateEntry {
                id: record.id().ok_or(Error::MissingRecordId)?,
                revision: record.revision(),
                record: encode_fields(record)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    to_json(&UpdateRequest { app, records })
}

/// Update records identified by the value of a unique key field. The key
/// field itself is not part of the written values.
pub fn encode_update_by_key(app: AppId, key_field: &str, records: &[Record]) -> Result<String> {
    let key = normalize_name(key_field);
    let records = records
        .iter()
        .map(|record| {
            let key_value = record
                .get_field(&key)
                .ok_or_else(|| Error::FieldNotFound(key.clone()))?;
            let mut fields = encode_fields(record)?;
            fields.remove(&key);
            Ok(UpdateByKeyEntry {
                update_key: UpdateKey {
                    field: key.clone(),
                    value: encode_value(key_value)?,
                },
                revision: record.revision(),
                record: fields,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    to_json(&UpdateRequest { app, records })
}

/// Encode a delete call. `ids` and `revisions` stay index-aligned; records
/// without a revision contribute [`NO_REVISION`].
pub fn encode_delete(app: AppId, records: &[Record]) -> Result<String> {
    let mut ids = Vec::with_capacity(records.len());
    let mut revisions = Vec::with_capacity(records.len());
    for record in records {
        ids.push(record.id().ok_or(Error::MissingRecordId)?);
        revisions.push(record.revision().unwrap_or(NO_REVISION));
    }
    to_json(&DeleteRequest {
        app,
        ids,
        revisions,
    })
}

/// Encode a delete call for bare ids, without revision checks.
pub fn encode_delete_by_ids(app: AppId, ids: &[RecordId]) -> Result<String> {
    to_json(&DeleteRequest {
        app,
        ids: ids.to_vec(),
        revisions: vec![NO_REVISION; ids.len()],
    })
}

/// The field object of one record: `{"<name>": {"value": ...}, ...}`.
///
/// Fails with [`Error::UnresolvedUpload`] if any field, including fields of
/// subtable rows, still carries a pending upload.
pub fn encode_fields(record: &Record) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for field in record.fields() {
        map.insert(
            field.name().to_string(),
            json!({ "value": encode_value(field)? }),
        );
    }
    Ok(map)
}

fn encode_value(field: &Field) -> Result<Value> {
    if field.has_pending_upload() {
        return Err(Error::UnresolvedUpload(field.name().to_string()));
    }
    if field.field_type().is_reserved() {
        return Ok(Value::String(String::new()));
    }
    let Some(value) = field.value() else {
        return Ok(empty_value(field.shape()));
    };

    let encoded = match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Number(n) => Value::String(n.to_string()),
        FieldValue::TextList(list) => list.iter().cloned().map(Value::String).collect(),
        FieldValue::FileList(files) => files
            .iter()
            .map(|f| json!({ "fileKey": f.file_key }))
            .collect(),
        FieldValue::User(user) => json!({ "code": user.code }),
        FieldValue::UserList(users) => users.iter().map(|u| json!({ "code": u.code })).collect(),
        FieldValue::Subtable(rows) => Value::Array(
            rows.iter()
                .map(|row| Ok(json!({ "value": encode_fields(row)? })))
                .collect::<Result<Vec<_>>>()?,
        ),
    };
    Ok(encoded)
}

fn empty_value(shape: Shape) -> Value {
    if shape.is_list() {
        Value::Array(Vec::new())
    } else {
        Value::String(String::new())
    }
}

fn to_json<T: Serialize>(request: &T) -> Result<String> {
    Ok(serde_json::to_string(request)?)
}
