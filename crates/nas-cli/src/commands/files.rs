//! `nas upload` and `nas delete`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use nas_transfer::preflight::infer_category;
use nas_transfer::{FileHandle, FileId, ProgressSink, TagId, TransferClient, UploadTarget};
use nas_ui::views::{DeleteFileDialog, FileTarget, UploadForm};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cli::{DeleteArgs, UploadArgs};
use crate::client::{AppContext, CliError, CliResult, confirm};
use crate::commands::transfers::{finish_reports, resolve_files, run_queue};
use crate::output::{TerminalNotifier, apply_effects, render_acknowledgement, render_readout};

pub(crate) async fn handle_upload(ctx: &AppContext, args: UploadArgs) -> CliResult<()> {
    let files = resolve_files(&args.files).await?;
    if files.len() <= 1 {
        return upload_single(ctx, &files, &args).await;
    }

    let batches = files
        .into_iter()
        .map(|file| {
            let target = files_target(&file, &args);
            (vec![file], target)
        })
        .collect();
    let reports = run_queue(ctx, batches).await?;
    finish_reports(ctx, &reports)
}

fn files_target(file: &FileHandle, args: &UploadArgs) -> UploadTarget {
    let category = args
        .category
        .clone()
        .unwrap_or_else(|| infer_category(&file.name).to_string());
    UploadTarget::Files {
        category,
        tags: args.tags.iter().copied().map(TagId).collect(),
    }
}

async fn upload_single(ctx: &AppContext, files: &[FileHandle], args: &UploadArgs) -> CliResult<()> {
    let mut form = UploadForm::new();
    let ticket = form
        .submit(files, Instant::now())
        .map_err(|err| CliError::validation(err.to_string()))?;
    let target = files_target(&ticket.file, args);

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let progress: ProgressSink = Arc::new(move |sample| {
        let _ = progress_tx.send(sample);
    });
    let client = Arc::clone(&ctx.client);
    let file = ticket.file.clone();
    let upload = tokio::spawn(async move { client.upload(&file, &target, progress).await });

    let mut last_percent = None;
    while let Some(sample) = progress_rx.recv().await {
        if let Some(readout) = form.progress(&ticket, sample, Instant::now()) {
            if last_percent != Some(readout.percent) {
                last_percent = Some(readout.percent);
                render_readout(&ticket.file.name, readout);
            }
        }
    }

    let outcome = upload
        .await
        .map_err(|err| CliError::failure(anyhow!("upload task failed: {err}")))?;
    let effects = form.finish(&ticket, &outcome);
    debug!(bar = ?form.bar(), phase = ?form.phase(), "upload form settled");
    match outcome {
        Ok(ack) => {
            apply_effects(effects, &mut TerminalNotifier::default());
            render_acknowledgement(&ack, ctx.output)
        }
        Err(err) => Err(CliError::from_transfer(&err)),
    }
}

pub(crate) async fn handle_delete(ctx: &AppContext, args: DeleteArgs) -> CliResult<()> {
    let mut dialog = DeleteFileDialog::new();
    dialog.open(FileTarget::new(FileId(args.file_id), args.name));
    let prompt = format!(
        "Delete {}?",
        dialog
            .modal()
            .target()
            .map_or("this file", FileTarget::display_name)
    );
    if !confirm(&prompt, args.yes)? {
        dialog.hide();
        eprintln!("cancelled");
        return Ok(());
    }
    let Some(ticket) = dialog.confirm() else {
        return Err(CliError::failure(anyhow!("delete dialog is not open")));
    };

    let outcome = ctx.client.delete_resource(ticket.target().id).await;
    let effects = dialog.resolve(ticket, &outcome);
    match outcome {
        Ok(ack) => {
            apply_effects(effects, &mut TerminalNotifier::default());
            render_acknowledgement(&ack, ctx.output)
        }
        Err(err) => Err(CliError::from_transfer(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::path::PathBuf;

    use crate::commands::test_support::context_for;

    fn upload_args(files: Vec<PathBuf>) -> UploadArgs {
        UploadArgs {
            files,
            category: None,
            tags: vec![2],
        }
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_without_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/files/upload");
            then.status(200);
        });
        let ctx = context_for(&server);
        let err = handle_upload(&ctx, upload_args(Vec::new()))
            .await
            .expect_err("empty selection");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "Please select a file first.");
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn single_upload_reports_acknowledgement() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/files/upload");
            then.status(200).json_body(json!({
                "message": "File uploaded successfully",
                "file_id": 9,
                "filename": "notes.txt"
            }));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").expect("write");
        let ctx = context_for(&server);

        handle_upload(&ctx, upload_args(vec![path]))
            .await
            .expect("upload succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn blocked_extension_is_a_validation_error() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/files/upload");
            then.status(200);
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("setup.exe");
        std::fs::write(&path, b"MZ").expect("write");
        let ctx = context_for(&server);

        let err = handle_upload(&ctx, upload_args(vec![path]))
            .await
            .expect_err("blocked");
        assert_eq!(err.exit_code(), 2);
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn multi_upload_goes_through_queue() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/files/upload");
            then.status(200)
                .json_body(json!({ "message": "File uploaded successfully" }));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let mut paths = Vec::new();
        for name in ["a.txt", "b.png", "c.mp3", "d.zip"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"data").expect("write");
            paths.push(path);
        }
        let ctx = context_for(&server);
        handle_upload(&ctx, upload_args(paths))
            .await
            .expect("all uploads succeed");
        mock.assert_hits(4);
    }

    #[test]
    fn category_is_inferred_unless_given() {
        let file = FileHandle::new("/tmp/song.mp3", "song.mp3", 1);
        let mut args = upload_args(Vec::new());
        assert_eq!(
            files_target(&file, &args),
            UploadTarget::Files {
                category: "audio".to_string(),
                tags: vec![TagId(2)],
            }
        );
        args.category = Some("document".to_string());
        assert!(matches!(
            files_target(&file, &args),
            UploadTarget::Files { category, .. } if category == "document"
        ));
    }

    #[tokio::test]
    async fn delete_with_yes_posts_to_file_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/files/delete/5");
            then.status(200)
                .json_body(json!({ "message": "File deleted successfully" }));
        });
        let ctx = context_for(&server);
        handle_delete(
            &ctx,
            DeleteArgs {
                file_id: 5,
                name: Some("report.pdf".to_string()),
                yes: true,
            },
        )
        .await
        .expect("delete succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn delete_error_body_fails_even_with_ok_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/files/delete/6");
            then.status(200).json_body(json!({ "error": "not found" }));
        });
        let ctx = context_for(&server);
        let err = handle_delete(
            &ctx,
            DeleteArgs {
                file_id: 6,
                name: None,
                yes: true,
            },
        )
        .await
        .expect_err("error body");
        assert_eq!(err.display_message(), "not found");
    }
}
