//! Named, typed field values.

use crate::{
    error::Result,
    field_type::{FieldType, Shape},
    file::{FileRef, PendingUpload},
    Error, Record,
};
use serde::{Deserialize, Serialize};

/// A reference to a user of the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login code
    pub code: String,
    /// Display name, only present on decoded values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
        }
    }
}

/// The native value of a field, one variant per [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    TextList(Vec<String>),
    FileList(Vec<FileRef>),
    User(User),
    UserList(Vec<User>),
    Subtable(Vec<Record>),
}

impl FieldValue {
    pub fn shape(&self) -> Shape {
        match self {
            FieldValue::Text(_) => Shape::Text,
            FieldValue::Number(_) => Shape::Number,
            FieldValue::TextList(_) => Shape::TextList,
            FieldValue::FileList(_) => Shape::FileList,
            FieldValue::User(_) => Shape::User,
            FieldValue::UserList(_) => Shape::UserList,
            FieldValue::Subtable(_) => Shape::Subtable,
        }
    }
}

/// Field names are case-insensitive; this is the canonical form.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// A single named, typed value within a record.
///
/// An absent value (`None`) is distinct from an empty string or list. A
/// `FILE` field may carry a [`PendingUpload`] before it has any value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    field_type: FieldType,
    value: Option<FieldValue>,
    pending_upload: Option<PendingUpload>,
}

impl Field {
    /// Create a field, rejecting a value whose shape does not match the type.
    pub fn new(
        name: impl AsRef<str>,
        field_type: FieldType,
        value: Option<FieldValue>,
    ) -> Result<Self> {
        let name = normalize_name(name.as_ref());
        if let Some(v) = &value {
            check_shape(&name, field_type, v.shape())?;
        }
        Ok(Self {
            name,
            field_type,
            value,
            pending_upload: None,
        })
    }

    /// Create a field with no value.
    pub fn empty(name: impl AsRef<str>, field_type: FieldType) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            field_type,
            value: None,
            pending_upload: None,
        }
    }

    /// Normalized (lowercase) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Shape of the values this field can hold, derived from its type.
    pub fn shape(&self) -> Shape {
        self.field_type.shape()
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut FieldValue> {
        self.value.as_mut()
    }

    /// True iff the field has no value. A pending upload is not a value.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Replace the value.
    pub fn set_value(&mut self, value: FieldValue) -> Result<()> {
        self.expect(value.shape())?;
        self.value = Some(value);
        Ok(())
    }

    /// Drop the value. A pending upload is kept.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Text value; `TypeMismatch` unless the field is text-shaped.
    pub fn as_text(&self) -> Result<Option<&str>> {
        self.expect(Shape::Text)?;
        match &self.value {
            Some(FieldValue::Text(s)) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    /// Number value; `TypeMismatch` unless the field is number-shaped.
    pub fn as_number(&self) -> Result<Option<i64>> {
        self.expect(Shape::Number)?;
        match &self.value {
            Some(FieldValue::Number(n)) => Ok(Some(*n)),
            _ => Ok(None),
        }
    }

    /// List accessors return an empty slice for an absent value.
    pub fn as_text_list(&self) -> Result<&[String]> {
        self.expect(Shape::TextList)?;
        match &self.value {
            Some(FieldValue::TextList(list)) => Ok(list),
            _ => Ok(&[]),
        }
    }

    pub fn as_user(&self) -> Result<Option<&User>> {
        self.expect(Shape::User)?;
        match &self.value {
            Some(FieldValue::User(user)) => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    pub fn as_file_list(&self) -> Result<&[FileRef]> {
        self.expect(Shape::FileList)?;
        match &self.value {
            Some(FieldValue::FileList(files)) => Ok(files),
            _ => Ok(&[]),
        }
    }

    pub fn as_user_list(&self) -> Result<&[User]> {
        self.expect(Shape::UserList)?;
        match &self.value {
            Some(FieldValue::UserList(users)) => Ok(users),
            _ => Ok(&[]),
        }
    }

    pub fn as_subtable(&self) -> Result<&[Record]> {
        self.expect(Shape::Subtable)?;
        match &self.value {
            Some(FieldValue::Subtable(rows)) => Ok(rows),
            _ => Ok(&[]),
        }
    }

    /// Mutable access to subtable rows, `None` when the field is empty.
    pub fn as_subtable_mut(&mut self) -> Result<Option<&mut Vec<Record>>> {
        self.expect(Shape::Subtable)?;
        match &mut self.value {
            Some(FieldValue::Subtable(rows)) => Ok(Some(rows)),
            _ => Ok(None),
        }
    }

    /// Append a file reference, creating the list if the field is empty.
    pub fn push_file(&mut self, file: FileRef) -> Result<()> {
        self.expect(Shape::FileList)?;
        match &mut self.value {
            Some(FieldValue::FileList(files)) => files.push(file),
            _ => self.value = Some(FieldValue::FileList(vec![file])),
        }
        Ok(())
    }

    /// Attach a file that still has to be uploaded. Only `FILE` fields can
    /// carry one.
    pub fn set_pending_upload(&mut self, upload: PendingUpload) -> Result<()> {
        self.expect(Shape::FileList)?;
        self.pending_upload = Some(upload);
        Ok(())
    }

    pub fn has_pending_upload(&self) -> bool {
        self.pending_upload.is_some()
    }

    pub fn pending_upload(&self) -> Option<&PendingUpload> {
        self.pending_upload.as_ref()
    }

    /// Detach the pending upload, typically once it has been resolved.
    pub fn take_pending_upload(&mut self) -> Option<PendingUpload> {
        self.pending_upload.take()
    }

    pub(crate) fn value_unchecked(&mut self, value: FieldValue) {
        debug_assert_eq!(self.shape(), value.shape());
        self.value = Some(value);
    }

    pub(crate) fn pending_upload_unchecked(&mut self, upload: PendingUpload) {
        debug_assert_eq!(self.shape(), Shape::FileList);
        self.pending_upload = Some(upload);
    }

    fn expect(&self, shape: Shape) -> Result<()> {
        check_shape(&self.name, self.field_type, shape)
    }
}

fn check_shape(name: &str, field_type: FieldType, shape: Shape) -> Result<()> {
    if field_type.shape() == shape {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            field: name.to_string(),
            expected: shape.to_string(),
            got: field_type.to_string(),
        })
    }
}
