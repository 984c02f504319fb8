//! Interpretation of server responses.
//!
//! A response counts as success only when the status is 2xx, the body parses
//! as the expected JSON shape, and no `error` field is present. The body is
//! authoritative over the status: `200 {"error": "not found"}` is a failure.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{Operation, TransferError, TransferResult};
use crate::model::{Acknowledgement, FileId, TagId};

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    file_id: Option<FileId>,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsBody {
    #[serde(default)]
    tags: Option<Vec<TagId>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Interpret a `{message}` / `{error}` response.
///
/// # Errors
///
/// Returns [`TransferError::Rejected`] for failure statuses or an `error`
/// field, and [`TransferError::Malformed`] when a 2xx body is not the
/// expected shape.
pub fn interpret_message(
    operation: Operation,
    status: StatusCode,
    body: &[u8],
) -> TransferResult<Acknowledgement> {
    if !status.is_success() {
        return Err(rejected(operation, status, body));
    }
    let parsed: MessageBody =
        serde_json::from_slice(body).map_err(|_| malformed(operation, status, body))?;
    if let Some(error) = parsed.error {
        return Err(TransferError::Rejected {
            operation,
            status: status.as_u16(),
            message: non_empty(error).unwrap_or_else(|| operation.generic_failure().to_string()),
        });
    }
    let message = parsed
        .message
        .ok_or_else(|| malformed(operation, status, body))?;
    Ok(Acknowledgement {
        message,
        file_id: parsed.file_id,
        filename: parsed.filename,
    })
}

/// Interpret a `{tags: [...]}` response.
///
/// # Errors
///
/// Same classification as [`interpret_message`], with `tags` as the required
/// field.
pub fn interpret_tags(status: StatusCode, body: &[u8]) -> TransferResult<Vec<TagId>> {
    let operation = Operation::FetchTags;
    if !status.is_success() {
        return Err(rejected(operation, status, body));
    }
    let parsed: TagsBody =
        serde_json::from_slice(body).map_err(|_| malformed(operation, status, body))?;
    if let Some(error) = parsed.error {
        return Err(TransferError::Rejected {
            operation,
            status: status.as_u16(),
            message: non_empty(error).unwrap_or_else(|| operation.generic_failure().to_string()),
        });
    }
    parsed.tags.ok_or_else(|| malformed(operation, status, body))
}

/// Interpret a response that has no mandated body shape.
///
/// # Errors
///
/// Returns [`TransferError::Rejected`] for any non-2xx status.
pub fn interpret_status(
    operation: Operation,
    status: StatusCode,
    body: &[u8],
) -> TransferResult<Acknowledgement> {
    if status.is_success() {
        Ok(Acknowledgement::message("File uploaded successfully"))
    } else {
        Err(rejected(operation, status, body))
    }
}

fn rejected(operation: Operation, status: StatusCode, body: &[u8]) -> TransferError {
    let from_json = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(non_empty);
    let message = from_json
        .or_else(|| non_empty(String::from_utf8_lossy(body).into_owned()))
        .unwrap_or_else(|| operation.generic_failure().to_string());
    TransferError::Rejected {
        operation,
        status: status.as_u16(),
        message,
    }
}

fn malformed(operation: Operation, status: StatusCode, body: &[u8]) -> TransferError {
    TransferError::Malformed {
        operation,
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
