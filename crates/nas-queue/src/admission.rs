//! Pure slot accounting for the upload queue.
//!
//! No I/O happens here; the worker asks which transfers may start and
//! reports outcomes back. Keeping the rules synchronous makes the cap
//! invariant checkable step by step.

use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroUsize;

use nas_transfer::{FileHandle, ProgressSample, UploadTarget};

use crate::event::TransferId;

/// Lifecycle state of a pending transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Waiting for a free slot.
    Queued,
    /// Request in flight.
    Active,
    /// Server acknowledged the upload.
    Succeeded,
    /// Upload failed.
    Failed,
}

/// A file tracked by the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransfer {
    /// Queue-local identifier.
    pub id: TransferId,
    /// File to upload.
    pub file: FileHandle,
    /// Destination metadata.
    pub target: UploadTarget,
    /// Completed fraction in `0.0..=1.0`.
    pub progress: f64,
    /// Current lifecycle state.
    pub status: TransferStatus,
}

/// Outcome counts reported when the queue drains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Transfers that succeeded.
    pub succeeded: usize,
    /// Transfers that failed.
    pub failed: usize,
}

/// Sliding-window admission over an ordered queue.
#[derive(Debug)]
pub struct Admission {
    cap: NonZeroUsize,
    queue: VecDeque<PendingTransfer>,
    active: BTreeMap<TransferId, PendingTransfer>,
    next_id: u64,
    summary: DrainSummary,
}

impl Admission {
    /// Empty admission state with the given cap.
    #[must_use]
    pub const fn new(cap: NonZeroUsize) -> Self {
        Self {
            cap,
            queue: VecDeque::new(),
            active: BTreeMap::new(),
            next_id: 1,
            summary: DrainSummary {
                succeeded: 0,
                failed: 0,
            },
        }
    }

    /// Append files to the tail in selection order. Duplicates are kept as
    /// independent transfers.
    pub fn enqueue(&mut self, files: Vec<FileHandle>, target: &UploadTarget) -> Vec<PendingTransfer> {
        files
            .into_iter()
            .map(|file| {
                let id = TransferId(self.next_id);
                self.next_id += 1;
                let pending = PendingTransfer {
                    id,
                    file,
                    target: target.clone(),
                    progress: 0.0,
                    status: TransferStatus::Queued,
                };
                self.queue.push_back(pending.clone());
                pending
            })
            .collect()
    }

    /// Move transfers from the queue head into free slots and return them.
    pub fn admit(&mut self) -> Vec<PendingTransfer> {
        let mut started = Vec::new();
        while self.active.len() < self.cap.get() {
            let Some(mut next) = self.queue.pop_front() else {
                break;
            };
            next.status = TransferStatus::Active;
            self.active.insert(next.id, next.clone());
            started.push(next);
        }
        started
    }

    /// Record progress for an active transfer. Returns the new fraction, or
    /// `None` when the transfer is no longer active.
    pub fn record_progress(&mut self, id: TransferId, sample: ProgressSample) -> Option<f64> {
        let entry = self.active.get_mut(&id)?;
        entry.progress = sample.fraction();
        Some(entry.progress)
    }

    /// Release the slot held by `id`. Returns the finished transfer, or
    /// `None` when `id` was not active.
    pub fn finish(&mut self, id: TransferId, succeeded: bool) -> Option<PendingTransfer> {
        let mut done = self.active.remove(&id)?;
        if succeeded {
            done.status = TransferStatus::Succeeded;
            done.progress = 1.0;
            self.summary.succeeded += 1;
        } else {
            done.status = TransferStatus::Failed;
            self.summary.failed += 1;
        }
        Some(done)
    }

    /// Drop every queued transfer without starting it, marking each failed.
    pub fn abandon_queued(&mut self) -> Vec<PendingTransfer> {
        let abandoned: Vec<_> = self
            .queue
            .drain(..)
            .map(|mut pending| {
                pending.status = TransferStatus::Failed;
                pending
            })
            .collect();
        self.summary.failed += abandoned.len();
        abandoned
    }

    /// Counts since the last drain; resets them.
    pub fn take_summary(&mut self) -> DrainSummary {
        std::mem::take(&mut self.summary)
    }

    /// Configured cap.
    #[must_use]
    pub const fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Number of transfers holding a slot.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of transfers waiting for a slot.
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued or active.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.active.is_empty()
    }

    /// Snapshot of queued and active transfers in start order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PendingTransfer> {
        self.active
            .values()
            .chain(self.queue.iter())
            .cloned()
            .collect()
    }
}
