//! Queue-backed uploads shared by the file and group commands.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use nas_queue::{QueueEvent, TransferId, UploadQueue};
use nas_transfer::{FileHandle, TransferClient, UploadTarget};
use nas_ui::views::{RowState, TransferBoard};
use tracing::warn;

use crate::client::{AppContext, CliError, CliResult};
use crate::output::{
    TerminalNotifier, TransferReport, apply_effects, render_board_row, render_transfer_report,
};

/// Stat every path up front so a typo fails before anything is sent.
pub(crate) async fn resolve_files(paths: &[PathBuf]) -> CliResult<Vec<FileHandle>> {
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let handle = FileHandle::resolve(path)
            .await
            .map_err(|err| CliError::from_transfer(&err))?;
        handles.push(handle);
    }
    Ok(handles)
}

/// Push every batch through the upload queue and wait for each transfer to
/// reach a terminal state. Ctrl-C stops admitting queued files.
pub(crate) async fn run_queue(
    ctx: &AppContext,
    batches: Vec<(Vec<FileHandle>, UploadTarget)>,
) -> CliResult<Vec<TransferReport>> {
    let client: Arc<dyn TransferClient> = ctx.client.clone();
    let (queue, mut events) = UploadQueue::spawn(client, ctx.queue);

    let mut expected = 0;
    for (files, target) in batches {
        let ids = queue
            .enqueue(files, target)
            .await
            .map_err(|err| CliError::failure(anyhow!("upload queue unavailable: {err}")))?;
        expected += ids.len();
    }

    let shutdown = queue.shutdown_token();
    let mut board = TransferBoard::new();
    let mut notifier = TerminalNotifier::default();
    let mut reports: BTreeMap<TransferId, TransferReport> = BTreeMap::new();
    let mut finished = 0;

    while finished < expected {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c(), if !shutdown.is_cancelled() => {
                warn!("interrupt received; remaining queued uploads will be skipped");
                queue.shutdown();
                continue;
            }
        };
        let Some(event) = event else {
            break;
        };
        if event.is_terminal() {
            finished += 1;
        }
        record(&mut reports, &event);

        let now = Instant::now();
        let effects = board.apply(&event, now);
        if let Some(row) = event.transfer_id().and_then(|id| board.row(id)) {
            if !matches!(event, QueueEvent::Progress { .. }) {
                render_board_row(row);
            }
        }
        board.sweep(now);
        apply_effects(effects, &mut notifier);
    }

    Ok(reports.into_values().collect())
}

/// Render the reports and fail when any transfer failed.
pub(crate) fn finish_reports(ctx: &AppContext, reports: &[TransferReport]) -> CliResult<()> {
    render_transfer_report(reports, ctx.output)?;
    let failed = reports
        .iter()
        .filter(|report| report.status != RowState::Succeeded)
        .count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "{failed} of {} uploads failed",
            reports.len()
        )))
    }
}

fn record(reports: &mut BTreeMap<TransferId, TransferReport>, event: &QueueEvent) {
    match event {
        QueueEvent::Queued { id, file, .. } => {
            reports.insert(
                *id,
                TransferReport {
                    file: file.name.clone(),
                    status: RowState::Queued,
                    file_id: None,
                    message: None,
                },
            );
        }
        QueueEvent::Started { id } => {
            if let Some(report) = reports.get_mut(id) {
                report.status = RowState::Uploading;
            }
        }
        QueueEvent::Succeeded {
            id,
            acknowledgement,
            ..
        } => {
            if let Some(report) = reports.get_mut(id) {
                report.status = RowState::Succeeded;
                report.file_id = acknowledgement.file_id;
            }
        }
        QueueEvent::Failed { id, message, .. } => {
            if let Some(report) = reports.get_mut(id) {
                report.status = RowState::Failed;
                report.message = Some(message.clone());
            }
        }
        QueueEvent::Progress { .. } | QueueEvent::Drained { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use nas_transfer::GroupId;

    use crate::commands::test_support::context_for;

    #[tokio::test]
    async fn resolve_files_rejects_missing_paths() {
        let err = resolve_files(&[PathBuf::from("/definitely/not/here.txt")])
            .await
            .expect_err("missing file");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn queue_reports_every_file() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/groups/upload");
            then.status(200);
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let mut paths = Vec::new();
        for idx in 0..5 {
            let path = dir.path().join(format!("f{idx}.bin"));
            std::fs::write(&path, vec![0_u8; 64]).expect("write");
            paths.push(path);
        }
        let files = resolve_files(&paths).await.expect("resolve");
        let ctx = context_for(&server);
        let target = UploadTarget::Group {
            group_id: GroupId(3),
        };

        let reports = run_queue(&ctx, vec![(files, target)]).await.expect("queue");
        assert_eq!(reports.len(), 5);
        assert!(reports.iter().all(|r| r.status == RowState::Succeeded));
        assert_eq!(reports[0].file, "f0.bin");
        mock.assert_hits(5);
        assert!(finish_reports(&ctx, &reports).is_ok());
    }

    #[tokio::test]
    async fn failures_surface_in_reports_and_exit_code() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/groups/upload");
            then.status(500).body("disk full");
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"abc").expect("write");
        let files = resolve_files(&[path]).await.expect("resolve");
        let ctx = context_for(&server);

        let reports = run_queue(
            &ctx,
            vec![(
                files,
                UploadTarget::Group {
                    group_id: GroupId(1),
                },
            )],
        )
        .await
        .expect("queue");
        assert_eq!(reports[0].status, RowState::Failed);
        assert_eq!(reports[0].message.as_deref(), Some("disk full"));
        let err = finish_reports(&ctx, &reports).expect_err("failure");
        assert_eq!(err.exit_code(), 3);
    }
}
