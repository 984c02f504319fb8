//! Single-file upload form.

use std::time::{Duration, Instant};

use nas_transfer::{Acknowledgement, FileHandle, ProgressSample, TransferResult};
use thiserror::Error;

use super::ViewEffect;
use crate::notify::NotificationKind;
use crate::progress::ProgressReadout;

/// Delay between a successful upload and the form reset.
pub const RESET_DELAY: Duration = Duration::from_secs(1);

/// Submission rejected before any request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    /// No file chosen.
    #[error("Please select a file first.")]
    EmptySelection,
    /// The form is disabled while an upload runs.
    #[error("an upload is already in progress")]
    Busy,
}

/// Form lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Ready for input.
    Idle,
    /// Inputs disabled, progress visible.
    Uploading,
    /// Bar complete; waiting for the reset.
    Completed,
    /// Last attempt failed; inputs re-enabled.
    Failed,
}

/// Progress bar styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarStyle {
    /// Default.
    Neutral,
    /// Green.
    Success,
    /// Red.
    Danger,
}

/// Handle for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    attempt: u64,
    /// File to upload.
    pub file: FileHandle,
}

/// Upload form state.
#[derive(Debug)]
pub struct UploadForm {
    phase: FormPhase,
    bar: BarStyle,
    percent: u8,
    attempt: u64,
    started_at: Option<Instant>,
    readout: Option<ProgressReadout>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadForm {
    /// Idle form.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: FormPhase::Idle,
            bar: BarStyle::Neutral,
            percent: 0,
            attempt: 0,
            started_at: None,
            readout: None,
        }
    }

    /// Start uploading the first selected file.
    ///
    /// # Errors
    ///
    /// [`FormError::EmptySelection`] when nothing is selected and
    /// [`FormError::Busy`] while a previous upload is still running.
    pub fn submit(
        &mut self,
        selection: &[FileHandle],
        now: Instant,
    ) -> Result<UploadTicket, FormError> {
        if matches!(self.phase, FormPhase::Uploading | FormPhase::Completed) {
            return Err(FormError::Busy);
        }
        let file = selection.first().ok_or(FormError::EmptySelection)?.clone();
        self.attempt += 1;
        self.phase = FormPhase::Uploading;
        self.bar = BarStyle::Neutral;
        self.percent = 0;
        self.started_at = Some(now);
        self.readout = None;
        Ok(UploadTicket {
            attempt: self.attempt,
            file,
        })
    }

    /// Record a progress sample observed at `now`.
    pub fn progress(
        &mut self,
        ticket: &UploadTicket,
        sample: ProgressSample,
        now: Instant,
    ) -> Option<&ProgressReadout> {
        if !self.owns(ticket) {
            return None;
        }
        let started = self.started_at?;
        let readout = ProgressReadout::new(sample, now.saturating_duration_since(started));
        self.percent = readout.percent;
        self.readout = Some(readout);
        self.readout.as_ref()
    }

    /// Apply the upload outcome.
    pub fn finish(
        &mut self,
        ticket: &UploadTicket,
        outcome: &TransferResult<Acknowledgement>,
    ) -> Vec<ViewEffect> {
        if !self.owns(ticket) {
            return Vec::new();
        }
        match outcome {
            Ok(ack) => {
                self.phase = FormPhase::Completed;
                self.bar = BarStyle::Success;
                self.percent = 100;
                vec![
                    ViewEffect::notify(NotificationKind::Success, ack.message.clone()),
                    ViewEffect::ResetForm { after: RESET_DELAY },
                    ViewEffect::Refresh { after: RESET_DELAY },
                ]
            }
            Err(err) => {
                self.phase = FormPhase::Failed;
                self.bar = BarStyle::Danger;
                vec![ViewEffect::notify(
                    NotificationKind::Error,
                    err.user_message(),
                )]
            }
        }
    }

    /// Return to the idle state: inputs enabled, bar at zero.
    pub fn reset(&mut self) {
        self.phase = FormPhase::Idle;
        self.bar = BarStyle::Neutral;
        self.percent = 0;
        self.started_at = None;
        self.readout = None;
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Whether the inputs accept changes.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self.phase, FormPhase::Idle | FormPhase::Failed)
    }

    /// Bar styling.
    #[must_use]
    pub const fn bar(&self) -> BarStyle {
        self.bar
    }

    /// Bar fill.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.percent
    }

    /// Latest speed and ETA strings.
    #[must_use]
    pub const fn readout(&self) -> Option<&ProgressReadout> {
        self.readout.as_ref()
    }

    fn owns(&self, ticket: &UploadTicket) -> bool {
        ticket.attempt == self.attempt && self.phase == FormPhase::Uploading
    }
}
