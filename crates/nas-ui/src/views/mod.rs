//! View controllers for the file, group and admin pages.

use std::time::Duration;

use crate::notify::NotificationKind;

pub mod delete_file;
pub mod delete_user;
pub mod drop_zone;
pub mod enhancements;
pub mod filter;
pub mod modal;
pub mod tag_editor;
pub mod transfer_board;
pub mod upload_form;

pub use delete_file::{DeleteFileDialog, FileTarget};
pub use delete_user::{DeleteUserDialog, UserTarget};
pub use drop_zone::{DragEvent, DropAction, DropMode, DropZone};
pub use enhancements::{ElementInfo, Enhancement, PageKind, plan_enhancements};
pub use filter::{FilterQuery, RowVisibility, filter_rows};
pub use modal::{ButtonState, ModalController, ModalPhase, Resolution, SubmitTicket};
pub use tag_editor::{LoadTicket, TagEditor, TagSubmission};
pub use transfer_board::{BoardRow, RowState, SUCCESS_LINGER, TransferBoard};
pub use upload_form::{BarStyle, FormError, FormPhase, UploadForm, UploadTicket};

/// Delay before a page refresh after a successful modal action.
pub const REFRESH_DELAY: Duration = Duration::from_millis(500);

/// Side effect requested by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    /// Surface a notification.
    Notify {
        /// Styling.
        kind: NotificationKind,
        /// Display text.
        message: String,
    },
    /// Remove a table row.
    RemoveRow {
        /// Row key, such as `user-7`.
        key: String,
    },
    /// Reset the upload form after a delay.
    ResetForm {
        /// Delay before the reset.
        after: Duration,
    },
    /// Re-fetch the page contents after a delay. Applying it more than once
    /// has the same result as applying it once.
    Refresh {
        /// Delay before the refresh.
        after: Duration,
    },
}

impl ViewEffect {
    pub(crate) fn notify(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self::Notify {
            kind,
            message: message.into(),
        }
    }
}
