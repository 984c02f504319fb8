//! `nas users delete`.

use anyhow::anyhow;
use nas_transfer::{TransferClient, UserId};
use nas_ui::views::{DeleteUserDialog, UserTarget};

use crate::cli::UserDeleteArgs;
use crate::client::{AppContext, CliError, CliResult, confirm};
use crate::output::{TerminalNotifier, apply_effects, render_acknowledgement};

pub(crate) async fn handle_user_delete(ctx: &AppContext, args: UserDeleteArgs) -> CliResult<()> {
    let id = UserId(args.user_id);
    let username = args.username.unwrap_or_else(|| format!("user {id}"));
    let mut dialog = DeleteUserDialog::new();
    dialog.open(UserTarget { id, username });

    let prompt = format!(
        "Delete {}?",
        dialog
            .modal()
            .target()
            .map_or("this user", |target| target.username.as_str())
    );
    if !confirm(&prompt, args.yes)? {
        dialog.hide();
        eprintln!("cancelled");
        return Ok(());
    }
    let Some(ticket) = dialog.confirm() else {
        return Err(CliError::failure(anyhow!("delete dialog is not open")));
    };

    let outcome = ctx.client.delete_user(ticket.target().id).await;
    let effects = dialog.resolve(ticket, &outcome);
    match outcome {
        Ok(ack) => {
            apply_effects(effects, &mut TerminalNotifier::default());
            render_acknowledgement(&ack, ctx.output)
        }
        Err(err) => {
            let message = dialog
                .modal()
                .error()
                .map_or_else(|| err.user_message(), str::to_string);
            dialog.hide();
            match CliError::from_transfer(&err) {
                CliError::Validation(_) => Err(CliError::validation(message)),
                CliError::Failure(_) => Err(CliError::failure(anyhow!(message))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::commands::test_support::{context_at, context_for};

    #[tokio::test]
    async fn delete_user_uses_delete_verb() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/admin/users/delete/12");
            then.status(200)
                .json_body(json!({ "message": "User alice deleted" }));
        });
        let ctx = context_for(&server);
        handle_user_delete(
            &ctx,
            UserDeleteArgs {
                user_id: 12,
                username: Some("alice".to_string()),
                yes: true,
            },
        )
        .await
        .expect("user deleted");
        mock.assert();
    }

    #[tokio::test]
    async fn forbidden_delete_surfaces_server_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path("/admin/users/delete/1");
            then.status(403)
                .json_body(json!({ "error": "Cannot delete your own account" }));
        });
        let ctx = context_for(&server);
        let err = handle_user_delete(
            &ctx,
            UserDeleteArgs {
                user_id: 1,
                username: None,
                yes: true,
            },
        )
        .await
        .expect_err("forbidden");
        assert_eq!(err.display_message(), "Cannot delete your own account");
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn unreachable_server_reports_transport_error() {
        let ctx = context_at("http://127.0.0.1:9".parse().expect("valid URL"));
        let err = handle_user_delete(
            &ctx,
            UserDeleteArgs {
                user_id: 2,
                username: None,
                yes: true,
            },
        )
        .await
        .expect_err("unreachable");
        assert_eq!(err.exit_code(), 3);
        assert!(!err.display_message().is_empty());
        assert_ne!(
            err.display_message(),
            "Error deleting user. Please try again."
        );
    }
}
