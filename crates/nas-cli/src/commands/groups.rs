//! `nas group-upload`: files dropped on a group page.

use nas_transfer::{GroupId, UploadTarget};
use nas_ui::views::{DragEvent, DropAction, DropMode, DropZone};

use crate::cli::GroupUploadArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::transfers::{finish_reports, resolve_files, run_queue};

pub(crate) async fn handle_group_upload(ctx: &AppContext, args: GroupUploadArgs) -> CliResult<()> {
    let files = resolve_files(&args.files).await?;
    let mut zone = DropZone::new(DropMode::Enqueue);
    let DropAction::Enqueue(files) = zone.handle(DragEvent::Drop(files)) else {
        return Err(CliError::validation("Please select a file first."));
    };
    let target = UploadTarget::Group {
        group_id: GroupId(args.group_id),
    };
    let reports = run_queue(ctx, vec![(files, target)]).await?;
    finish_reports(ctx, &reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    use crate::commands::test_support::context_for;

    #[tokio::test]
    async fn group_files_post_status_only() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/groups/upload")
                .header("x-requested-with", "XMLHttpRequest");
            then.status(201);
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let mut files = Vec::new();
        for name in ["one.jpg", "two.jpg"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"jpeg").expect("write");
            files.push(path);
        }
        let ctx = context_for(&server);
        handle_group_upload(&ctx, GroupUploadArgs { group_id: 4, files })
            .await
            .expect("group upload succeeds");
        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn rejected_group_upload_fails_command() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/groups/upload");
            then.status(403).body("Forbidden");
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("x.txt");
        std::fs::write(&path, b"x").expect("write");
        let ctx = context_for(&server);
        let err = handle_group_upload(
            &ctx,
            GroupUploadArgs {
                group_id: 4,
                files: vec![path],
            },
        )
        .await
        .expect_err("forbidden");
        assert_eq!(err.exit_code(), 3);
    }
}
