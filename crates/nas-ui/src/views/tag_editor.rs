//! Tag editor dialog: load the file's tags, edit the selection, save.

use std::collections::BTreeSet;

use nas_transfer::{Acknowledgement, FileId, TagId, TransferResult};
use tracing::warn;

use super::delete_file::FileTarget;
use super::modal::{ModalController, ModalPhase, Resolution, SubmitTicket};
use super::{REFRESH_DELAY, ViewEffect};
use crate::notify::NotificationKind;

/// Request to load the current tags of the file shown in the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    session: u64,
    /// File whose tags should be fetched.
    pub file: FileId,
}

/// Confirmed save: the target plus the selection to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSubmission {
    /// Dialog ticket carrying the target file.
    pub ticket: SubmitTicket<FileTarget>,
    /// Tags to assign.
    pub tags: BTreeSet<TagId>,
}

/// Tag editor dialog.
#[derive(Debug, Default)]
pub struct TagEditor {
    modal: ModalController<FileTarget>,
    selected: BTreeSet<TagId>,
}

impl TagEditor {
    /// Closed editor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modal: ModalController::new(),
            selected: BTreeSet::new(),
        }
    }

    /// Show the editor for `target` with every checkbox cleared. The caller
    /// fetches the current tags and hands them to [`Self::apply_loaded`].
    pub fn open(&mut self, target: FileTarget) -> LoadTicket {
        let file = target.id;
        self.selected.clear();
        self.modal.open(target);
        LoadTicket {
            session: self.modal.session(),
            file,
        }
    }

    /// Check the tags fetched for `ticket`. Results for an older session
    /// are dropped; a failed fetch leaves the selection as is.
    pub fn apply_loaded(&mut self, ticket: LoadTicket, outcome: &TransferResult<Vec<TagId>>) {
        if ticket.session != self.modal.session() || self.modal.phase() != ModalPhase::Open {
            return;
        }
        match outcome {
            Ok(tags) => self.selected.extend(tags.iter().copied()),
            Err(err) => warn!(file = %ticket.file, error = %err.user_message(), "Error fetching tags"),
        }
    }

    /// Flip a checkbox. Ignored unless the editor is open and idle.
    pub fn toggle(&mut self, tag: TagId) {
        if self.modal.phase() != ModalPhase::Open {
            return;
        }
        if !self.selected.remove(&tag) {
            self.selected.insert(tag);
        }
    }

    /// Checked tags.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<TagId> {
        &self.selected
    }

    /// Confirm the selection.
    pub fn save(&mut self) -> Option<TagSubmission> {
        let ticket = self.modal.submit()?;
        Some(TagSubmission {
            ticket,
            tags: self.selected.clone(),
        })
    }

    /// Apply the server's answer for a save.
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
                ViewEffect::notify(NotificationKind::Success, "Tags updated successfully"),
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

    /// Hide the editor.
    pub fn hide(&mut self) -> bool {
        self.modal.hide()
    }

    /// Underlying dialog state.
    #[must_use]
    pub const fn modal(&self) -> &ModalController<FileTarget> {
        &self.modal
    }
}
