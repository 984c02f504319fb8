//! Output renderers, terminal notifications and view-effect application.

use std::time::Instant;

use anyhow::anyhow;
use nas_transfer::{Acknowledgement, FileId, TagId};
use nas_ui::views::{BoardRow, RowState, ViewEffect};
use nas_ui::{
    NotificationCenter, NotificationInstruction, NotificationKind, NotificationSink,
    ProgressReadout, StorageWarning,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Notification sink that writes to stderr and mirrors into `tracing`.
#[derive(Debug, Default)]
pub(crate) struct TerminalNotifier {
    center: NotificationCenter,
}

impl NotificationSink for TerminalNotifier {
    fn notify(&mut self, kind: NotificationKind, message: &str) {
        let now = Instant::now();
        self.center.expire(now);
        for instruction in self.center.push(kind, message, now) {
            match instruction {
                NotificationInstruction::EnsureContainer => debug!("notification stream opened"),
                NotificationInstruction::Show(notification) => {
                    match notification.kind {
                        NotificationKind::Error | NotificationKind::Warning => {
                            warn!(kind = notification.kind.label(), message = %notification.message, "notification");
                        }
                        NotificationKind::Success => {
                            info!(kind = notification.kind.label(), message = %notification.message, "notification");
                        }
                    }
                    eprintln!("[{}] {}", notification.kind.label(), notification.message);
                }
                NotificationInstruction::Remove { .. } => {}
            }
        }
    }
}

/// Apply controller effects. Row removal, form reset and refresh have no
/// terminal counterpart and are only logged.
pub(crate) fn apply_effects(effects: Vec<ViewEffect>, sink: &mut impl NotificationSink) {
    for effect in effects {
        match effect {
            ViewEffect::Notify { kind, message } => sink.notify(kind, &message),
            ViewEffect::RemoveRow { key } => debug!(row = %key, "row removed"),
            ViewEffect::ResetForm { after } => debug!(?after, "form reset requested"),
            ViewEffect::Refresh { after } => debug!(?after, "refresh requested"),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_acknowledgement(ack: &Acknowledgement, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(ack)?,
        OutputFormat::Table => {
            println!("{}", ack.message);
            if let Some(file_id) = ack.file_id {
                println!("file id: {file_id}");
            }
            if let Some(filename) = &ack.filename {
                println!("stored as: {filename}");
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct TagListing<'a> {
    file_id: FileId,
    tags: &'a [TagId],
}

pub(crate) fn render_tags(file_id: FileId, tags: &[TagId], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&TagListing { file_id, tags })?,
        OutputFormat::Table => {
            if tags.is_empty() {
                println!("file {file_id}: no tags");
            } else {
                let joined = tags
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("file {file_id}: tags {joined}");
            }
        }
    }
    Ok(())
}

/// Final line for one queued transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TransferReport {
    pub(crate) file: String,
    pub(crate) status: RowState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) file_id: Option<FileId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

pub(crate) fn render_transfer_report(
    reports: &[TransferReport],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(reports)?,
        OutputFormat::Table => {
            println!("{:<10} {:<10} FILE", "STATUS", "FILE ID");
            for report in reports {
                let file_id = report
                    .file_id
                    .map_or_else(|| "-".to_string(), |id| id.to_string());
                println!(
                    "{:<10} {:<10} {}",
                    row_state_label(report.status),
                    file_id,
                    report.file
                );
                if let Some(message) = &report.message {
                    println!("{:<21} {message}", "");
                }
            }
        }
    }
    Ok(())
}

/// Progress line for a board row, written to stderr.
pub(crate) fn render_board_row(row: &BoardRow) {
    eprintln!(
        "{:>4}% {:<10} {}",
        row.percent,
        row_state_label(row.state),
        row.file_name
    );
}

/// Progress line for the single-file form, written to stderr.
pub(crate) fn render_readout(file_name: &str, readout: &ProgressReadout) {
    let mut line = format!("{:>4}% {file_name} {}", readout.percent, readout.size);
    if !readout.speed.is_empty() {
        line.push_str(&format!(" {}", readout.speed));
    }
    if !readout.remaining.is_empty() {
        line.push_str(&format!(" {}", readout.remaining));
    }
    eprintln!("{line}");
}

#[derive(Serialize)]
struct StorageReport {
    percent: u8,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

pub(crate) fn render_storage(
    percent: u8,
    warning: Option<StorageWarning>,
    format: OutputFormat,
) -> CliResult<()> {
    let level = match warning {
        Some(StorageWarning::Critical) => "critical",
        Some(StorageWarning::Low) => "low",
        None => "ok",
    };
    match format {
        OutputFormat::Json => print_json(&StorageReport {
            percent,
            level,
            message: warning.map(StorageWarning::message),
        })?,
        OutputFormat::Table => println!("storage: {percent}% used ({level})"),
    }
    Ok(())
}

#[must_use]
pub(crate) const fn row_state_label(state: RowState) -> &'static str {
    match state {
        RowState::Queued => "queued",
        RowState::Uploading => "uploading",
        RowState::Succeeded => "uploaded",
        RowState::Failed => "failed",
    }
}
