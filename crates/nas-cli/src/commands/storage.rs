//! `nas storage-check`.

use nas_ui::{NotificationSink, storage_warning};

use crate::cli::StorageCheckArgs;
use crate::client::{AppContext, CliResult};
use crate::output::{TerminalNotifier, render_storage};

pub(crate) fn handle_storage_check(ctx: &AppContext, args: &StorageCheckArgs) -> CliResult<()> {
    let warning = storage_warning(args.percent);
    if let Some(warning) = warning {
        TerminalNotifier::default().notify(warning.kind(), warning.message());
    }
    render_storage(args.percent, warning, ctx.output)
}
