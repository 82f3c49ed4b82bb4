//! # kinbase Engine
//!
//! Typed record model and JSON codec for a schema-flexible remote record
//! store.
//!
//! The remote service exchanges records as JSON documents in which every
//! field carries an explicit type. This crate turns those documents into
//! strongly typed [`Record`]s and back, and wraps query results in a
//! cursor-style [`ResultSet`].
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or platform
//! - **Closed types**: Every field kind maps to one [`Shape`]; values are a
//!   tagged [`FieldValue`], never an untyped blob
//! - **Best-effort decode**: A bad field never aborts a whole response
//!   (see [`DecodePolicy`])
//! - **Deterministic encode**: Fields are emitted in name order, so the same
//!   record always encodes to the same bytes
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A record is a map of named [`Field`]s plus identity metadata:
//! - Optional record id
//! - Optional revision (for optimistic concurrency)
//!
//! Fields of the reserved `__ID__` / `__REVISION__` types never enter the
//! field map; they set the id and revision instead.
//!
//! ### Pending uploads
//!
//! A `FILE` field can hold a [`PendingUpload`] before any file key exists.
//! Uploads must be resolved (by the client crate) before encoding; encoding
//! an unresolved upload fails with [`Error::UnresolvedUpload`].
//!
//! ## Quick Start
//!
//! ```rust
//! use kinbase_engine::{codec, Record};
//!
//! // 1. Build a record
//! let mut record = Record::new();
//! record.set_text("title", "Quarterly report").set_number("pages", 12);
//!
//! // 2. Encode it for an insert call
//! let json = codec::encode_insert(1, &[record]).unwrap();
//! assert!(json.contains(r#""pages":{"value":"12"}"#));
//!
//! // 3. Decode a response
//! let response = r#"{"records": [{
//!     "$id": {"type": "__ID__", "value": "1"},
//!     "title": {"type": "SINGLE_LINE_TEXT", "value": "Quarterly report"}
//! }], "totalCount": "1"}"#;
//! let mut rs = codec::decode_result_set(response).unwrap();
//! assert_eq!(rs.total_count(), Some(1));
//! while rs.next() {
//!     assert_eq!(rs.get_string("title").unwrap(), Some("Quarterly report"));
//! }
//! ```

pub mod codec;
pub mod error;
pub mod field;
pub mod field_type;
pub mod file;
pub mod record;
pub mod result_set;

// Re-export main types at crate root
pub use codec::{DecodePolicy, Decoder, ErrorResponse, InsertResult};
pub use error::Error;
pub use field::{Field, FieldValue, User};
pub use field_type::{FieldType, Shape};
pub use file::{FileRef, PendingUpload, UploadSource, DEFAULT_CONTENT_TYPE};
pub use record::Record;
pub use result_set::ResultSet;

/// Type aliases for clarity
pub type AppId = i64;
pub type RecordId = i64;
pub type Revision = i64;
