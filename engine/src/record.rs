//! Record types for storing data.

use crate::{
    error::Result,
    field::{normalize_name, Field, FieldValue, User},
    field_type::FieldType,
    file::{FileRef, PendingUpload},
    Error, RecordId, Revision,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// Wire format of `DATE` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format of `DATETIME` values written by this crate.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A row of a remote application: named fields plus identity metadata.
///
/// Fields are keyed by normalized name and kept in a `BTreeMap`, so
/// iteration (and therefore encoding) order is stable. `Clone` produces a
/// deep copy, including every subtable row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    id: Option<RecordId>,
    revision: Option<Revision>,
    fields: BTreeMap<String, Field>,
}

impl Record {
    /// Create an empty record with no id and no revision.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record that targets an existing row.
    pub fn with_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn with_id_and_revision(id: RecordId, revision: Revision) -> Self {
        let mut record = Self::with_id(id);
        record.set_revision(revision);
        record
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Revision last seen for this record, if any.
    pub fn revision(&self) -> Option<Revision> {
        self.revision
    }

    /// Set the revision used for optimistic-lock checks. Negative values
    /// mean "no check" and clear the revision.
    pub fn set_revision(&mut self, revision: Revision) {
        self.revision = (revision >= 0).then_some(revision);
    }

    pub fn clear_revision(&mut self) {
        self.revision = None;
    }

    pub fn has_revision(&self) -> bool {
        self.revision.is_some()
    }

    /// Add or replace a field under its own (normalized) name.
    ///
    /// `__ID__` and `__REVISION__` fields are not stored; their numeric
    /// value becomes the record's id or revision instead.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        match field.field_type() {
            FieldType::Id => self.id = field.as_number()?,
            FieldType::Revision => self.revision = field.as_number()?.filter(|r| *r >= 0),
            _ => {
                self.fields.insert(field.name().to_string(), field);
            }
        }
        Ok(())
    }

    /// Look up a field; names are matched case-insensitively.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(&normalize_name(name))
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(&normalize_name(name))
    }

    /// Remove and return the named field.
    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        self.fields.remove(&normalize_name(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(&normalize_name(name))
    }

    /// Field names in encoding order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.values_mut()
    }

    /// Number of ordinary fields (id and revision excluded).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no ordinary fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the named field has no value.
    pub fn is_field_empty(&self, name: &str) -> Result<bool> {
        Ok(self.field(name)?.is_empty())
    }

    /// Declared type of the named field.
    pub fn field_type(&self, name: &str) -> Result<FieldType> {
        Ok(self.field(name)?.field_type())
    }

    fn field(&self, name: &str) -> Result<&Field> {
        self.get_field(name)
            .ok_or_else(|| Error::FieldNotFound(normalize_name(name)))
    }

    // Typed getters

    /// Value of a single-text field (text, link, date, status, ...).
    pub fn get_text(&self, name: &str) -> Result<Option<&str>> {
        self.field(name)?.as_text()
    }

    pub fn get_number(&self, name: &str) -> Result<Option<i64>> {
        self.field(name)?.as_number()
    }

    /// Values of a multi-select or check-box field.
    pub fn get_texts(&self, name: &str) -> Result<&[String]> {
        self.field(name)?.as_text_list()
    }

    pub fn get_user(&self, name: &str) -> Result<Option<&User>> {
        self.field(name)?.as_user()
    }

    pub fn get_users(&self, name: &str) -> Result<&[User]> {
        self.field(name)?.as_user_list()
    }

    pub fn get_files(&self, name: &str) -> Result<&[FileRef]> {
        self.field(name)?.as_file_list()
    }

    /// Rows of a subtable field.
    pub fn get_subtable(&self, name: &str) -> Result<&[Record]> {
        self.field(name)?.as_subtable()
    }

    /// Parse a date-shaped text field. Empty or absent values are `None`.
    pub fn get_date(&self, name: &str) -> Result<Option<NaiveDate>> {
        let Some(raw) = self.non_blank_text(name)? else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| invalid_date(name, raw))
    }

    /// Parse a date-time text field as UTC. Accepts RFC 3339 offsets as
    /// well as the `Z`-suffixed form the service emits.
    pub fn get_datetime(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.non_blank_text(name)? else {
            return Ok(None);
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
            .map(|naive| Some(naive.and_utc()))
            .map_err(|_| invalid_date(name, raw))
    }

    fn non_blank_text(&self, name: &str) -> Result<Option<&str>> {
        Ok(self.get_text(name)?.filter(|s| !s.is_empty()))
    }

    // Typed setters

    pub fn set_text(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.put(name, FieldType::SingleLineText, FieldValue::Text(value.into()))
    }

    pub fn set_number(&mut self, name: &str, value: i64) -> &mut Self {
        self.put(name, FieldType::Number, FieldValue::Number(value))
    }

    /// Set a multi-select field.
    pub fn set_texts<I, S>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.put(name, FieldType::MultiSelect, FieldValue::TextList(list))
    }

    /// Set a single user reference by login code.
    pub fn set_user(&mut self, name: &str, code: impl Into<String>) -> &mut Self {
        self.put(name, FieldType::Creator, FieldValue::User(User::new(code)))
    }

    pub fn set_users<I, S>(&mut self, name: &str, codes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users = codes.into_iter().map(User::new).collect();
        self.put(name, FieldType::UserSelect, FieldValue::UserList(users))
    }

    /// Reference files that are already stored remotely.
    pub fn set_file_keys<I, S>(&mut self, name: &str, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files = keys.into_iter().map(FileRef::new).collect();
        self.put(name, FieldType::File, FieldValue::FileList(files))
    }

    /// Attach a local file; it is uploaded when the record is written.
    pub fn set_file(&mut self, name: &str, upload: PendingUpload) -> &mut Self {
        let mut field = Field::empty(name, FieldType::File);
        field.pending_upload_unchecked(upload);
        self.fields.insert(field.name().to_string(), field);
        self
    }

    pub fn set_date(&mut self, name: &str, date: NaiveDate) -> &mut Self {
        let text = date.format(DATE_FORMAT).to_string();
        self.put(name, FieldType::Date, FieldValue::Text(text))
    }

    pub fn set_datetime(&mut self, name: &str, datetime: DateTime<Utc>) -> &mut Self {
        let text = datetime.format(DATETIME_FORMAT).to_string();
        self.put(name, FieldType::DateTime, FieldValue::Text(text))
    }

    pub fn set_subtable(&mut self, name: &str, rows: Vec<Record>) -> &mut Self {
        self.put(name, FieldType::Subtable, FieldValue::Subtable(rows))
    }

    /// Set a value of an arbitrary type, checking that its shape matches.
    pub fn set_value(
        &mut self,
        name: &str,
        field_type: FieldType,
        value: FieldValue,
    ) -> Result<&mut Self> {
        self.add_field(Field::new(name, field_type, Some(value))?)?;
        Ok(self)
    }

    // The setters above pair a non-reserved type with its own shape, so the
    // field can go straight into the map.
    fn put(&mut self, name: &str, field_type: FieldType, value: FieldValue) -> &mut Self {
        let mut field = Field::empty(name, field_type);
        field.value_unchecked(value);
        self.fields.insert(field.name().to_string(), field);
        self
    }
}

fn invalid_date(name: &str, raw: &str) -> Error {
    Error::InvalidDate {
        field: normalize_name(name),
        value: raw.to_string(),
    }
}
