//! Admin delete-user confirmation flow.

use nas_transfer::{Acknowledgement, TransferError, TransferResult, UserId};

use super::ViewEffect;
use super::modal::{ModalController, Resolution, SubmitTicket};
use crate::notify::NotificationKind;

const UNREACHABLE_MESSAGE: &str = "Error deleting user. Please try again.";

/// User a dialog acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTarget {
    /// Server-side identifier.
    pub id: UserId,
    /// Name shown in the dialog body.
    pub username: String,
}

impl UserTarget {
    /// Row key used to remove the user from the table.
    #[must_use]
    pub fn row_key(&self) -> String {
        format!("user-{}", self.id)
    }
}

/// Delete-user dialog.
#[derive(Debug, Default)]
pub struct DeleteUserDialog {
    modal: ModalController<UserTarget>,
}

impl DeleteUserDialog {
    /// Closed dialog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modal: ModalController::new(),
        }
    }

    /// Show the dialog for `target`.
    pub fn open(&mut self, target: UserTarget) {
        self.modal.open(target);
    }

    /// Confirm the deletion.
    pub fn confirm(&mut self) -> Option<SubmitTicket<UserTarget>> {
        self.modal.submit()
    }

    /// Apply the server's answer for `ticket`. Server rejections stay inline
    /// in the dialog; network and response failures are shown verbatim and
    /// also raised as an error notification.
    pub fn resolve(
        &mut self,
        ticket: SubmitTicket<UserTarget>,
        outcome: &TransferResult<Acknowledgement>,
    ) -> Vec<ViewEffect> {
        let surfaced = matches!(
            outcome,
            Err(TransferError::Transport { .. }
                | TransferError::Timeout { .. }
                | TransferError::Malformed { .. })
        );
        let result = match outcome {
            Ok(_) => Ok(()),
            Err(err) if surfaced || matches!(err, TransferError::Rejected { .. }) => {
                Err(err.user_message())
            }
            Err(_) => Err(UNREACHABLE_MESSAGE.to_string()),
        };
        match self.modal.resolve(ticket, result) {
            Resolution::Closed { target } => {
                let message = outcome
                    .as_ref()
                    .map(|ack| ack.message.clone())
                    .unwrap_or_default();
                vec![
                    ViewEffect::notify(NotificationKind::Success, message),
                    ViewEffect::RemoveRow {
                        key: target.row_key(),
                    },
                ]
            }
            Resolution::Failed { error, .. } if surfaced => {
                vec![ViewEffect::notify(NotificationKind::Error, error)]
            }
            Resolution::Failed { .. } | Resolution::Stale => Vec::new(),
        }
    }

    /// Hide the dialog, clearing any inline error.
    pub fn hide(&mut self) -> bool {
        self.modal.hide()
    }

    /// Underlying dialog state.
    #[must_use]
    pub const fn modal(&self) -> &ModalController<UserTarget> {
        &self.modal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nas_transfer::{Operation, TransferError};

    fn target(id: u64) -> UserTarget {
        UserTarget {
            id: UserId(id),
            username: format!("user{id}"),
        }
    }

    #[test]
    fn success_removes_row_with_server_message() {
        let mut dialog = DeleteUserDialog::new();
        dialog.open(target(7));
        let ticket = dialog.confirm().expect("confirm");
        let effects = dialog.resolve(ticket, &Ok(Acknowledgement::message("User deleted")));
        assert_eq!(
            effects,
            vec![
                ViewEffect::notify(NotificationKind::Success, "User deleted"),
                ViewEffect::RemoveRow {
                    key: "user-7".to_string()
                },
            ]
        );
    }

    #[test]
    fn rejection_shows_inline_error_and_hide_clears_it() {
        let mut dialog = DeleteUserDialog::new();
        dialog.open(target(1));
        let ticket = dialog.confirm().expect("confirm");
        let failure = TransferError::Rejected {
            operation: Operation::DeleteUser,
            status: 403,
            message: "Cannot delete admin".to_string(),
        };
        assert!(dialog.resolve(ticket, &Err(failure)).is_empty());
        assert_eq!(dialog.modal().error(), Some("Cannot delete admin"));
        assert!(dialog.hide());
        assert!(dialog.modal().error().is_none());
    }

    #[test]
    fn unexpected_response_is_shown_verbatim_and_notified() {
        let mut dialog = DeleteUserDialog::new();
        dialog.open(target(3));
        let ticket = dialog.confirm().expect("confirm");
        let failure = TransferError::Malformed {
            operation: Operation::DeleteUser,
            status: 200,
            body: "<html>login</html>".to_string(),
        };
        let expected = failure.user_message();
        let effects = dialog.resolve(ticket, &Err(failure));
        assert_eq!(dialog.modal().error(), Some(expected.as_str()));
        assert_eq!(
            effects,
            vec![ViewEffect::notify(NotificationKind::Error, expected)]
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_shown_verbatim_and_notified() {
        let source = reqwest::Client::new()
            .delete("http://127.0.0.1:9/admin/users/delete/4")
            .send()
            .await
            .expect_err("nothing listens on the discard port");
        let failure = TransferError::from_transport(Operation::DeleteUser, source);
        assert!(matches!(
            failure,
            TransferError::Transport { .. } | TransferError::Timeout { .. }
        ));
        let expected = failure.user_message();
        assert_ne!(expected, UNREACHABLE_MESSAGE);

        let mut dialog = DeleteUserDialog::new();
        dialog.open(target(4));
        let ticket = dialog.confirm().expect("confirm");
        let effects = dialog.resolve(ticket, &Err(failure));
        assert_eq!(dialog.modal().error(), Some(expected.as_str()));
        assert_eq!(
            effects,
            vec![ViewEffect::notify(NotificationKind::Error, expected)]
        );
    }

    #[test]
    fn local_failures_use_retry_message() {
        let mut dialog = DeleteUserDialog::new();
        dialog.open(target(2));
        let ticket = dialog.confirm().expect("confirm");
        let failure = TransferError::InvalidInput {
            field: "user_id",
            reason: "bad id",
            value: None,
        };
        dialog.resolve(ticket, &Err(failure));
        assert_eq!(dialog.modal().error(), Some(UNREACHABLE_MESSAGE));
    }
}
