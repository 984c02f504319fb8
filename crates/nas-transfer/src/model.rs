//! Identifiers, file handles, and transfer outcomes shared by client and queue.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Operation, TransferError, TransferResult};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Server-side identifier of a stored file.
    FileId
);
numeric_id!(
    /// Server-side identifier of a tag.
    TagId
);
numeric_id!(
    /// Server-side identifier of a user account.
    UserId
);
numeric_id!(
    /// Server-side identifier of a sharing group.
    GroupId
);

/// Local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Location on the local filesystem.
    pub path: PathBuf,
    /// Name presented to the server and in progress rows.
    pub name: String,
    /// Size in bytes captured when the file was selected.
    pub size: u64,
}

impl FileHandle {
    /// Build a handle from already-known metadata.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size,
        }
    }

    /// Resolve a path into a handle by reading its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Io`] when the path cannot be inspected and
    /// [`TransferError::InvalidInput`] when it is not a regular file or has no
    /// usable file name.
    pub async fn resolve(path: &Path) -> TransferResult<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| TransferError::Io {
                operation: Operation::Upload,
                path: path.to_path_buf(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(TransferError::InvalidInput {
                field: "file",
                reason: "path is not a regular file",
                value: Some(path.display().to_string()),
            });
        }
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| TransferError::InvalidInput {
                field: "file",
                reason: "file name is not valid UTF-8",
                value: Some(path.display().to_string()),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }

    /// Lowercased extension of the display name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Destination metadata sent alongside an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadTarget {
    /// Personal file storage, filed under a category.
    Files {
        /// Category name (`document`, `image`, ...).
        category: String,
        /// Tags applied on upload.
        tags: Vec<TagId>,
    },
    /// Shared storage of a group.
    Group {
        /// Receiving group.
        group_id: GroupId,
    },
}

impl UploadTarget {
    /// Operation label used for logging and error classification.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Files { .. } => Operation::Upload,
            Self::Group { .. } => Operation::GroupUpload,
        }
    }
}

/// Successful server acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Message returned by the server.
    pub message: String,
    /// Identifier assigned to an uploaded file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<FileId>,
    /// Stored name of an uploaded file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Acknowledgement {
    /// Acknowledgement carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file_id: None,
            filename: None,
        }
    }
}

/// Byte counters reported while an upload body streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSample {
    /// Bytes handed to the transport so far.
    pub transferred: u64,
    /// Total bytes of the file.
    pub total: u64,
}

impl ProgressSample {
    /// Completed fraction in `0.0..=1.0`; empty files count as complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.transferred as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

/// Callback invoked with every progress sample of an upload.
pub type ProgressSink = Arc<dyn Fn(ProgressSample) + Send + Sync>;

/// Progress sink that discards samples.
#[must_use]
pub fn noop_progress() -> ProgressSink {
    Arc::new(|_| {})
}
