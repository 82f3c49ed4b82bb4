//! File references and pending uploads.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Content type used when the caller does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A reference to a file stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Durable key identifying the stored file
    pub file_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FileRef {
    /// Create a reference carrying only a file key.
    pub fn new(file_key: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
            name: None,
            content_type: None,
            size: None,
            url: None,
        }
    }
}

/// Where the bytes of a pending upload come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// In-memory contents
    Bytes(Vec<u8>),
    /// A local file, read when the upload is performed
    Path(PathBuf),
}

/// A file waiting to be uploaded before its field can be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub source: UploadSource,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl PendingUpload {
    /// Upload in-memory bytes under the given file name.
    pub fn from_bytes(
        bytes: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            source: UploadSource::Bytes(bytes.into()),
            file_name: file_name.into(),
            content_type,
        }
    }

    /// Upload a local file. The file name sent to the service is the last
    /// path component.
    pub fn from_path(path: impl AsRef<Path>, content_type: Option<String>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source: UploadSource::Path(path.to_path_buf()),
            file_name,
            content_type,
        }
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}
