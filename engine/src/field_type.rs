//! Field type catalog.
//!
//! Every field kind the remote service reports maps to exactly one storage
//! [`Shape`]. Unknown kinds are not an error: [`FieldType::lookup`] returns
//! `None` and the decoder drops the field.

use serde::{Deserialize, Serialize};

/// Field types reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    SingleLineText,
    Number,
    Calc,
    MultiLineText,
    RichText,
    CheckBox,
    RadioButton,
    DropDown,
    MultiSelect,
    File,
    Date,
    Time,
    #[serde(rename = "DATETIME")]
    DateTime,
    UserSelect,
    Link,
    Category,
    Status,
    RecordNumber,
    Creator,
    CreatedTime,
    Modifier,
    UpdatedTime,
    StatusAssignee,
    Subtable,
    /// Pseudo-field carrying the record revision.
    #[serde(rename = "__REVISION__")]
    Revision,
    /// Pseudo-field carrying the record id.
    #[serde(rename = "__ID__")]
    Id,
}

/// Storage shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single string (text, choices, dates and times).
    Text,
    /// A 64-bit integer, transmitted as a decimal string.
    Number,
    /// An ordered list of strings.
    TextList,
    /// A list of file references.
    FileList,
    /// A single user reference.
    User,
    /// A list of user references.
    UserList,
    /// A list of nested records.
    Subtable,
}

impl Shape {
    /// Whether values of this shape are JSON arrays on the wire.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Shape::TextList | Shape::FileList | Shape::UserList | Shape::Subtable
        )
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Text => write!(f, "Text"),
            Shape::Number => write!(f, "Number"),
            Shape::TextList => write!(f, "TextList"),
            Shape::FileList => write!(f, "FileList"),
            Shape::User => write!(f, "User"),
            Shape::UserList => write!(f, "UserList"),
            Shape::Subtable => write!(f, "Subtable"),
        }
    }
}

const ALL: [FieldType; 26] = [
    FieldType::SingleLineText,
    FieldType::Number,
    FieldType::Calc,
    FieldType::MultiLineText,
    FieldType::RichText,
    FieldType::CheckBox,
    FieldType::RadioButton,
    FieldType::DropDown,
    FieldType::MultiSelect,
    FieldType::File,
    FieldType::Date,
    FieldType::Time,
    FieldType::DateTime,
    FieldType::UserSelect,
    FieldType::Link,
    FieldType::Category,
    FieldType::Status,
    FieldType::RecordNumber,
    FieldType::Creator,
    FieldType::CreatedTime,
    FieldType::Modifier,
    FieldType::UpdatedTime,
    FieldType::StatusAssignee,
    FieldType::Subtable,
    FieldType::Revision,
    FieldType::Id,
];

impl FieldType {
    /// Look up a field type by its wire name.
    ///
    /// Matching is case-sensitive. Returns `None` for names this catalog
    /// does not know about.
    pub fn lookup(name: &str) -> Option<FieldType> {
        ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Every known field type, in catalog order.
    pub fn all() -> &'static [FieldType] {
        &ALL
    }

    /// The wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::SingleLineText => "SINGLE_LINE_TEXT",
            FieldType::Number => "NUMBER",
            FieldType::Calc => "CALC",
            FieldType::MultiLineText => "MULTI_LINE_TEXT",
            FieldType::RichText => "RICH_TEXT",
            FieldType::CheckBox => "CHECK_BOX",
            FieldType::RadioButton => "RADIO_BUTTON",
            FieldType::DropDown => "DROP_DOWN",
            FieldType::MultiSelect => "MULTI_SELECT",
            FieldType::File => "FILE",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::DateTime => "DATETIME",
            FieldType::UserSelect => "USER_SELECT",
            FieldType::Link => "LINK",
            FieldType::Category => "CATEGORY",
            FieldType::Status => "STATUS",
            FieldType::RecordNumber => "RECORD_NUMBER",
            FieldType::Creator => "CREATOR",
            FieldType::CreatedTime => "CREATED_TIME",
            FieldType::Modifier => "MODIFIER",
            FieldType::UpdatedTime => "UPDATED_TIME",
            FieldType::StatusAssignee => "STATUS_ASSIGNEE",
            FieldType::Subtable => "SUBTABLE",
            FieldType::Revision => "__REVISION__",
            FieldType::Id => "__ID__",
        }
    }

    /// The storage shape of values of this type.
    pub fn shape(self) -> Shape {
        match self {
            FieldType::SingleLineText
            | FieldType::Calc
            | FieldType::MultiLineText
            | FieldType::RichText
            | FieldType::RadioButton
            | FieldType::DropDown
            | FieldType::Link
            | FieldType::Status
            | FieldType::Date
            | FieldType::Time
            | FieldType::DateTime
            | FieldType::CreatedTime
            | FieldType::UpdatedTime => Shape::Text,
            FieldType::Number
            | FieldType::RecordNumber
            | FieldType::Revision
            | FieldType::Id => Shape::Number,
            FieldType::CheckBox | FieldType::MultiSelect | FieldType::Category => {
                Shape::TextList
            }
            FieldType::File => Shape::FileList,
            FieldType::Creator | FieldType::Modifier => Shape::User,
            FieldType::UserSelect | FieldType::StatusAssignee => Shape::UserList,
            FieldType::Subtable => Shape::Subtable,
        }
    }

    /// Reserved pseudo-types are routed into record identity metadata and
    /// never stored as ordinary fields.
    pub fn is_reserved(self) -> bool {
        matches!(self, FieldType::Id | FieldType::Revision)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
