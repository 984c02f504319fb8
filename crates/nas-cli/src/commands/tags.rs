//! `nas tags get` and `nas tags set`.

use std::collections::BTreeSet;

use anyhow::anyhow;
use nas_transfer::{FileId, TagId, TransferClient};
use nas_ui::views::{FileTarget, TagEditor};
use tracing::info;

use crate::cli::{TagsGetArgs, TagsSetArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{TerminalNotifier, apply_effects, render_acknowledgement, render_tags};

pub(crate) async fn handle_tags_get(ctx: &AppContext, args: TagsGetArgs) -> CliResult<()> {
    let file = FileId(args.file_id);
    let tags = ctx
        .client
        .fetch_tags(file)
        .await
        .map_err(|err| CliError::from_transfer(&err))?;
    render_tags(file, &tags, ctx.output)
}

/// Load the current tags into the editor, toggle them towards the requested
/// set, then save.
pub(crate) async fn handle_tags_set(ctx: &AppContext, args: TagsSetArgs) -> CliResult<()> {
    let mut editor = TagEditor::new();
    let load = editor.open(FileTarget::new(FileId(args.file_id), None));
    let current = ctx.client.fetch_tags(load.file).await;
    editor.apply_loaded(load, &current);

    let desired: BTreeSet<TagId> = args.tags.iter().copied().map(TagId).collect();
    let toggles: Vec<TagId> = editor
        .selected()
        .symmetric_difference(&desired)
        .copied()
        .collect();
    for tag in toggles {
        editor.toggle(tag);
    }
    if let Ok(before) = &current {
        let before: BTreeSet<TagId> = before.iter().copied().collect();
        info!(
            added = desired.difference(&before).count(),
            removed = before.difference(&desired).count(),
            "tag changes computed"
        );
    }

    let Some(submission) = editor.save() else {
        return Err(CliError::failure(anyhow!("tag editor is not open")));
    };
    let outcome = ctx
        .client
        .update_tags(submission.ticket.target().id, &submission.tags)
        .await;
    let effects = editor.resolve(submission.ticket, &outcome);
    match outcome {
        Ok(ack) => {
            apply_effects(effects, &mut TerminalNotifier::default());
            render_acknowledgement(&ack, ctx.output)
        }
        Err(err) => Err(CliError::from_transfer(&err)),
    }
}
