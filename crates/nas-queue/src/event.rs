//! Lifecycle events published by the queue worker.

use std::fmt::{self, Display, Formatter};

use nas_transfer::{Acknowledgement, FileHandle, ProgressSample, UploadTarget};
use serde::{Deserialize, Serialize};

/// Queue-local identifier of a pending transfer, assigned in enqueue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(pub u64);

impl Display for TransferId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Events emitted in order for each transfer: `Queued`, `Started`, any number
/// of `Progress`, then exactly one of `Succeeded` or `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// A file was appended to the queue.
    Queued {
        /// Transfer identifier.
        id: TransferId,
        /// File awaiting upload.
        file: FileHandle,
        /// Destination of the upload.
        target: UploadTarget,
    },
    /// A slot was granted and the request started.
    Started {
        /// Transfer identifier.
        id: TransferId,
    },
    /// Bytes were handed to the transport.
    Progress {
        /// Transfer identifier.
        id: TransferId,
        /// Byte counters.
        sample: ProgressSample,
    },
    /// The server acknowledged the upload.
    Succeeded {
        /// Transfer identifier.
        id: TransferId,
        /// Uploaded file name.
        file_name: String,
        /// Server acknowledgement.
        acknowledgement: Acknowledgement,
    },
    /// The upload failed; the slot has been recycled.
    Failed {
        /// Transfer identifier.
        id: TransferId,
        /// File that failed.
        file_name: String,
        /// User-facing reason.
        message: String,
    },
    /// The queue is empty and no transfer is active.
    Drained {
        /// Transfers that succeeded since the queue was last drained.
        succeeded: usize,
        /// Transfers that failed since the queue was last drained.
        failed: usize,
    },
}

impl QueueEvent {
    /// Transfer the event refers to, if any.
    #[must_use]
    pub const fn transfer_id(&self) -> Option<TransferId> {
        match self {
            Self::Queued { id, .. }
            | Self::Started { id }
            | Self::Progress { id, .. }
            | Self::Succeeded { id, .. }
            | Self::Failed { id, .. } => Some(*id),
            Self::Drained { .. } => None,
        }
    }

    /// Whether the event ends a transfer's lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}
