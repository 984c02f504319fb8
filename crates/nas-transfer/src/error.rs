//! # Design
//!
//! - Constant error messages; request context lives in fields.
//! - Transport failures keep the `reqwest` source so the user sees it verbatim.
//! - [`TransferError::user_message`] is the single place that turns a failure
//!   into notification text.

use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Request kinds issued by the transfer client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /files/upload`.
    Upload,
    /// `POST /groups/upload`.
    GroupUpload,
    /// `POST /files/delete/{id}`.
    Delete,
    /// `GET /files/get-tags/{id}`.
    FetchTags,
    /// `POST /files/tag/{id}`.
    UpdateTags,
    /// `DELETE /admin/users/delete/{id}`.
    DeleteUser,
}

impl Operation {
    /// Machine-friendly label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::GroupUpload => "group_upload",
            Self::Delete => "delete",
            Self::FetchTags => "fetch_tags",
            Self::UpdateTags => "update_tags",
            Self::DeleteUser => "delete_user",
        }
    }

    /// Message shown when the server gives no usable reason.
    #[must_use]
    pub const fn generic_failure(self) -> &'static str {
        match self {
            Self::Upload | Self::GroupUpload => "Upload failed",
            Self::Delete => "Delete failed. Please try again.",
            Self::FetchTags => "Error fetching tags",
            Self::UpdateTags => "Error updating tags",
            Self::DeleteUser => "Error deleting user",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Errors produced while talking to the NAS server.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The request never produced a response (unreachable host, reset, ...).
    #[error("transfer request failed")]
    Transport {
        /// Operation that was attempted.
        operation: Operation,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The request exceeded its timeout.
    #[error("transfer timed out")]
    Timeout {
        /// Operation that was attempted.
        operation: Operation,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The server answered with a failure status or an `error` field.
    #[error("server rejected request")]
    Rejected {
        /// Operation that was attempted.
        operation: Operation,
        /// HTTP status code of the response.
        status: u16,
        /// Server-provided reason, or a generic fallback.
        message: String,
    },
    /// The body did not parse as the expected JSON shape.
    #[error("malformed server response")]
    Malformed {
        /// Operation that was attempted.
        operation: Operation,
        /// HTTP status code of the response.
        status: u16,
        /// Raw response text.
        body: String,
    },
    /// Local file access failed before or during an upload.
    #[error("local file unavailable")]
    Io {
        /// Operation that was attempted.
        operation: Operation,
        /// File involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Input rejected before any request was issued.
    #[error("invalid transfer input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// An endpoint URL could not be built from the base URL.
    #[error("invalid endpoint url")]
    Endpoint {
        /// Path that failed to join.
        path: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The HTTP client could not be constructed.
    #[error("http client construction failed")]
    ClientBuild {
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
}

impl TransferError {
    /// Classify a `reqwest` failure that occurred before a response arrived.
    #[must_use]
    pub fn from_transport(operation: Operation, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { operation, source }
        } else {
            Self::Transport { operation, source }
        }
    }

    /// Operation associated with the failure, when there is one.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Transport { operation, .. }
            | Self::Timeout { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Malformed { operation, .. }
            | Self::Io { operation, .. } => Some(*operation),
            Self::InvalidInput { .. } | Self::Endpoint { .. } | Self::ClientBuild { .. } => None,
        }
    }

    /// Whether the failure happened locally without any network traffic.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::InvalidInput { .. } | Self::Endpoint { .. }
        )
    }

    /// Text suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { source, .. } => source.to_string(),
            Self::Timeout { .. } => "Request timed out. Please try again.".to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Malformed { operation, .. } => {
                format!("{}: unexpected response from server", operation.generic_failure())
            }
            Self::Io { path, source, .. } => {
                format!("cannot read '{}': {source}", path.display())
            }
            Self::InvalidInput { reason, value, .. } => value
                .as_ref()
                .map_or_else(|| (*reason).to_string(), |value| format!("{reason}: {value}")),
            Self::Endpoint { path, source } => format!("invalid endpoint '{path}': {source}"),
            Self::ClientBuild { source } => format!("failed to build HTTP client: {source}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_surfaces_server_message() {
        let err = TransferError::Rejected {
            operation: Operation::Delete,
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.user_message(), "not found");
        assert_eq!(err.operation(), Some(Operation::Delete));
        assert!(!err.is_local());
    }

    #[test]
    fn malformed_uses_generic_operation_text() {
        let err = TransferError::Malformed {
            operation: Operation::Upload,
            status: 200,
            body: "<html>".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Upload failed: unexpected response from server"
        );
    }

    #[test]
    fn invalid_input_includes_value() {
        let err = TransferError::InvalidInput {
            field: "file",
            reason: "file type not allowed",
            value: Some("exe".to_string()),
        };
        assert_eq!(err.user_message(), "file type not allowed: exe");
        assert!(err.is_local());
        assert!(err.operation().is_none());
    }

    #[test]
    fn operation_labels_are_stable() {
        assert_eq!(Operation::Upload.to_string(), "upload");
        assert_eq!(Operation::DeleteUser.label(), "delete_user");
        assert_eq!(Operation::UpdateTags.generic_failure(), "Error updating tags");
    }
}
