//! Per-file progress rows for queued uploads.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use nas_queue::{QueueEvent, TransferId};
use serde::Serialize;

use super::ViewEffect;
use crate::notify::NotificationKind;

/// How long a successful row stays before it is removed.
pub const SUCCESS_LINGER: Duration = Duration::from_secs(2);

/// Delay before the page refresh once the queue drains.
pub const DRAIN_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Row state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    /// Waiting for a slot.
    Queued,
    /// Bytes moving.
    Uploading,
    /// Done; removed after [`SUCCESS_LINGER`].
    Succeeded,
    /// Failed; stays until dismissed.
    Failed,
}

/// One row on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardRow {
    /// Queue identifier.
    pub id: TransferId,
    /// File name.
    pub file_name: String,
    /// Bar fill, `0..=100`.
    pub percent: u8,
    /// Row state.
    pub state: RowState,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    remove_at: Option<Instant>,
}

/// Board of transfer rows keyed by queue id.
#[derive(Debug, Default)]
pub struct TransferBoard {
    rows: BTreeMap<TransferId, BoardRow>,
}

impl TransferBoard {
    /// Empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Apply a queue event observed at `now`.
    ///
    /// Events for rows that were dismissed or already removed never
    /// recreate or mutate them; terminal outcomes are still notified.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(&mut self, event: &QueueEvent, now: Instant) -> Vec<ViewEffect> {
        match event {
            QueueEvent::Queued { id, file, .. } => {
                self.rows.insert(
                    *id,
                    BoardRow {
                        id: *id,
                        file_name: file.name.clone(),
                        percent: 0,
                        state: RowState::Queued,
                        message: None,
                        remove_at: None,
                    },
                );
                Vec::new()
            }
            QueueEvent::Started { id } => {
                if let Some(row) = self.live_row(*id) {
                    row.state = RowState::Uploading;
                }
                Vec::new()
            }
            QueueEvent::Progress { id, sample } => {
                if let Some(row) = self.live_row(*id) {
                    row.percent = (sample.fraction() * 100.0).round() as u8;
                }
                Vec::new()
            }
            QueueEvent::Succeeded { id, file_name, .. } => {
                if let Some(row) = self.live_row(*id) {
                    row.percent = 100;
                    row.state = RowState::Succeeded;
                    row.remove_at = Some(now + SUCCESS_LINGER);
                }
                vec![ViewEffect::notify(
                    NotificationKind::Success,
                    format!("{file_name} uploaded successfully"),
                )]
            }
            QueueEvent::Failed {
                id,
                file_name,
                message,
            } => {
                if let Some(row) = self.live_row(*id) {
                    row.percent = 0;
                    row.state = RowState::Failed;
                    row.message = Some(message.clone());
                }
                vec![ViewEffect::notify(
                    NotificationKind::Error,
                    format!("Failed to upload {file_name}: {message}"),
                )]
            }
            QueueEvent::Drained { .. } => vec![ViewEffect::Refresh {
                after: DRAIN_REFRESH_DELAY,
            }],
        }
    }

    /// Remove successful rows whose linger time has passed.
    pub fn sweep(&mut self, now: Instant) -> Vec<TransferId> {
        let expired: Vec<TransferId> = self
            .rows
            .values()
            .filter(|row| row.remove_at.is_some_and(|at| at <= now))
            .map(|row| row.id)
            .collect();
        for id in &expired {
            self.rows.remove(id);
        }
        expired
    }

    /// Remove a row at the user's request.
    pub fn dismiss(&mut self, id: TransferId) -> bool {
        self.rows.remove(&id).is_some()
    }

    /// Rows in queue order.
    pub fn rows(&self) -> impl Iterator<Item = &BoardRow> {
        self.rows.values()
    }

    /// A single row.
    #[must_use]
    pub fn row(&self, id: TransferId) -> Option<&BoardRow> {
        self.rows.get(&id)
    }

    fn live_row(&mut self, id: TransferId) -> Option<&mut BoardRow> {
        self.rows
            .get_mut(&id)
            .filter(|row| !matches!(row.state, RowState::Succeeded | RowState::Failed))
    }
}
