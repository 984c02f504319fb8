//! Delete-file confirmation flow.

use nas_transfer::{Acknowledgement, FileId, TransferResult};

use super::modal::{ModalController, Resolution, SubmitTicket};
use super::{REFRESH_DELAY, ViewEffect};
use crate::notify::NotificationKind;

/// File a dialog acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    /// Server-side identifier.
    pub id: FileId,
    /// Display name, when the row carried one.
    pub name: Option<String>,
}

impl FileTarget {
    /// Target with an optional display name.
    #[must_use]
    pub const fn new(id: FileId, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Name shown in the dialog body.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("this file")
    }
}

/// Delete-file dialog.
#[derive(Debug, Default)]
pub struct DeleteFileDialog {
    modal: ModalController<FileTarget>,
}

impl DeleteFileDialog {
    /// Closed dialog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modal: ModalController::new(),
        }
    }

    /// Show the dialog for `target`.
    pub fn open(&mut self, target: FileTarget) {
        self.modal.open(target);
    }

    /// Confirm the deletion.
    pub fn confirm(&mut self) -> Option<SubmitTicket<FileTarget>> {
        self.modal.submit()
    }

    /// Apply the server's answer for `ticket`.
    pub fn resolve(
        &mut self,
        ticket: SubmitTicket<FileTarget>,
        outcome: &TransferResult<Acknowledgement>,
    ) -> Vec<ViewEffect> {
        let result = outcome
            .as_ref()
            .map(|_| ())
            .map_err(nas_transfer::TransferError::user_message);
        match self.modal.resolve(ticket, result) {
            Resolution::Closed { .. } => vec![
                ViewEffect::notify(NotificationKind::Success, "File deleted successfully"),
                ViewEffect::Refresh {
                    after: REFRESH_DELAY,
                },
            ],
            Resolution::Failed { error, .. } => {
                vec![ViewEffect::notify(NotificationKind::Error, error)]
            }
            Resolution::Stale => Vec::new(),
        }
    }

    /// Hide the dialog.
    pub fn hide(&mut self) -> bool {
        self.modal.hide()
    }

    /// Underlying dialog state.
    #[must_use]
    pub const fn modal(&self) -> &ModalController<FileTarget> {
        &self.modal
    }
}
