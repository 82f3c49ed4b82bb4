//! Cursor over decoded records.
//!
//! A fresh result set has no current record. `next()` moves to the first
//! record, `first()`/`last()` jump, and every move that would leave the
//! bounds returns `false` without changing the position. Getters read the
//! current record and fail with [`Error::NoCurrentRecord`] when there is
//! none.

use crate::{
    error::Result,
    field::User,
    field_type::FieldType,
    file::FileRef,
    Error, Record, RecordId, Revision,
};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: Vec<Record>,
    cursor: Option<usize>,
    total_count: Option<i64>,
}

impl ResultSet {
    /// Wrap decoded records; the cursor starts before the first one.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            cursor: None,
            total_count: None,
        }
    }

    /// Attach the total row count reported by a count-returning query.
    pub fn with_total_count(mut self, total_count: i64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    /// Total matching rows, present only when the query asked for it.
    pub fn total_count(&self) -> Option<i64> {
        self.total_count
    }

    /// Number of records held, independent of the cursor.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Navigation

    /// Advance to the following record. From a fresh cursor this lands on
    /// the first record.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let target = match self.cursor {
            None => 0,
            Some(i) => i + 1,
        };
        self.move_to(target)
    }

    /// Step back one record; `false` on the first record or a fresh cursor.
    pub fn previous(&mut self) -> bool {
        match self.cursor {
            Some(i) if i > 0 => self.move_to(i - 1),
            _ => false,
        }
    }

    pub fn first(&mut self) -> bool {
        self.move_to(0)
    }

    pub fn last(&mut self) -> bool {
        match self.records.len() {
            0 => false,
            len => self.move_to(len - 1),
        }
    }

    /// Forget the current position; the next `next()` starts over.
    pub fn reset(&mut self) {
        self.cursor = None;
    }

    /// Zero-based index of the current record.
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    fn move_to(&mut self, index: usize) -> bool {
        if index < self.records.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    /// The record under the cursor.
    pub fn current(&self) -> Result<&Record> {
        self.cursor
            .and_then(|i| self.records.get(i))
            .ok_or(Error::NoCurrentRecord)
    }

    // Access to the whole set

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Take the records, dropping the cursor.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    // Getters on the current record

    /// Id of the current record.
    pub fn id(&self) -> Result<Option<RecordId>> {
        Ok(self.current()?.id())
    }

    pub fn revision(&self) -> Result<Option<Revision>> {
        Ok(self.current()?.revision())
    }

    pub fn has_field(&self, name: &str) -> Result<bool> {
        Ok(self.current()?.has_field(name))
    }

    /// Whether the named field of the current record has no value.
    pub fn is_empty_field(&self, name: &str) -> Result<bool> {
        self.current()?.is_field_empty(name)
    }

    pub fn field_names(&self) -> Result<Vec<&str>> {
        Ok(self.current()?.field_names().collect())
    }

    pub fn field_type(&self, name: &str) -> Result<FieldType> {
        self.current()?.field_type(name)
    }

    /// Number value of the named field.
    pub fn get_long(&self, name: &str) -> Result<Option<i64>> {
        self.current()?.get_number(name)
    }

    /// Text value of any single-text field (text, date, link, ...).
    pub fn get_string(&self, name: &str) -> Result<Option<&str>> {
        self.current()?.get_text(name)
    }

    pub fn get_strings(&self, name: &str) -> Result<&[String]> {
        self.current()?.get_texts(name)
    }

    pub fn get_user(&self, name: &str) -> Result<Option<&User>> {
        self.current()?.get_user(name)
    }

    pub fn get_users(&self, name: &str) -> Result<&[User]> {
        self.current()?.get_users(name)
    }

    pub fn get_files(&self, name: &str) -> Result<&[FileRef]> {
        self.current()?.get_files(name)
    }

    pub fn get_subtable(&self, name: &str) -> Result<&[Record]> {
        self.current()?.get_subtable(name)
    }

    /// See [`Record::get_date`].
    pub fn get_date(&self, name: &str) -> Result<Option<NaiveDate>> {
        self.current()?.get_date(name)
    }

    /// See [`Record::get_datetime`].
    pub fn get_datetime(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        self.current()?.get_datetime(name)
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
