//! Fixed server paths. The server is an external collaborator, so these must
//! match it exactly.

use crate::model::{FileId, UserId};

/// Personal file upload.
pub const FILE_UPLOAD: &str = "/files/upload";
/// Group file upload.
pub const GROUP_UPLOAD: &str = "/groups/upload";

/// Header marking a request as programmatic rather than a page load.
pub const HEADER_REQUESTED_WITH: &str = "x-requested-with";
/// Value paired with [`HEADER_REQUESTED_WITH`].
pub const REQUESTED_WITH_XHR: &str = "XMLHttpRequest";
/// Correlation header carried on every request.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// `POST` path deleting a stored file.
#[must_use]
pub fn delete_file(id: FileId) -> String {
    format!("/files/delete/{id}")
}

/// `GET` path listing a file's tag ids.
#[must_use]
pub fn file_tags(id: FileId) -> String {
    format!("/files/get-tags/{id}")
}

/// `POST` path replacing a file's tags.
#[must_use]
pub fn tag_file(id: FileId) -> String {
    format!("/files/tag/{id}")
}

/// `DELETE` path removing a user account.
#[must_use]
pub fn delete_user(id: UserId) -> String {
    format!("/admin/users/delete/{id}")
}
