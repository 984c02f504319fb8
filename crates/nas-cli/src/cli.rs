//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nas_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::{Instrument, Span, info_span};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliDependencies, CliResult, parse_url};
use crate::commands::{files, groups, storage, tags, users};

const DEFAULT_NAS_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CONCURRENCY: usize = 3;
const BUILD_ID: &str = env!("CARGO_PKG_VERSION");

/// Parses CLI arguments, executes the requested command, and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: LogFormat::from_name(cli.log_format.as_deref()).unwrap_or_else(LogFormat::infer),
        build_id: BUILD_ID,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let span = command_span(command_name, &trace_id);

    let result = async {
        let deps = CliDependencies::from_cli(&cli, &trace_id)?;
        dispatch(cli, deps).await
    }
    .instrument(span)
    .await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

/// Root span for one invocation, tagged with the build that produced it.
fn command_span(command: &'static str, trace_id: &str) -> Span {
    info_span!(
        "nas",
        command,
        trace_id = %trace_id,
        build = nas_telemetry::build_id()
    )
}

async fn dispatch(cli: Cli, deps: CliDependencies) -> CliResult<()> {
    let ctx = AppContext {
        client: deps.client,
        queue: deps.queue,
        output: cli.output,
    };

    match cli.command {
        Command::Upload(args) => files::handle_upload(&ctx, args).await,
        Command::GroupUpload(args) => groups::handle_group_upload(&ctx, args).await,
        Command::Delete(args) => files::handle_delete(&ctx, args).await,
        Command::Tags(command) => match command {
            TagsCommand::Get(args) => tags::handle_tags_get(&ctx, args).await,
            TagsCommand::Set(args) => tags::handle_tags_set(&ctx, args).await,
        },
        Command::Users(command) => match command {
            UsersCommand::Delete(args) => users::handle_user_delete(&ctx, args).await,
        },
        Command::StorageCheck(args) => storage::handle_storage_check(&ctx, &args),
    }
}

#[derive(Parser)]
#[command(name = "nas", about = "Command-line client for the NAS web service")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "NAS_URL",
        value_parser = parse_url,
        default_value = DEFAULT_NAS_URL
    )]
    pub(crate) url: Url,
    #[arg(
        long,
        global = true,
        env = "NAS_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "NAS_UPLOAD_TIMEOUT_SECS",
        default_value_t = DEFAULT_UPLOAD_TIMEOUT_SECS
    )]
    pub(crate) upload_timeout: u64,
    #[arg(
        long,
        global = true,
        env = "NAS_UPLOAD_CONCURRENCY",
        default_value_t = DEFAULT_CONCURRENCY,
        help = "Maximum number of uploads in flight"
    )]
    pub(crate) concurrency: usize,
    #[arg(
        long,
        global = true,
        env = "NAS_LOG_LEVEL",
        default_value = nas_telemetry::DEFAULT_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[arg(long, global = true, env = "NAS_LOG_FORMAT", help = "pretty or json")]
    pub(crate) log_format: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Upload files to the library.
    Upload(UploadArgs),
    /// Upload files into a group.
    GroupUpload(GroupUploadArgs),
    /// Delete a file.
    Delete(DeleteArgs),
    /// Read or replace a file's tags.
    #[command(subcommand)]
    Tags(TagsCommand),
    /// User administration.
    #[command(subcommand)]
    Users(UsersCommand),
    /// Report whether a storage usage percentage needs attention.
    StorageCheck(StorageCheckArgs),
}

#[derive(Subcommand)]
pub(crate) enum TagsCommand {
    /// Print the tag ids assigned to a file.
    Get(TagsGetArgs),
    /// Replace the tags assigned to a file.
    Set(TagsSetArgs),
}

#[derive(Subcommand)]
pub(crate) enum UsersCommand {
    /// Delete a user account.
    Delete(UserDeleteArgs),
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    #[arg(help = "Files to upload")]
    pub(crate) files: Vec<PathBuf>,
    #[arg(long, help = "Category (inferred from the extension when omitted)")]
    pub(crate) category: Option<String>,
    #[arg(long = "tag", help = "Tag id to attach; repeatable")]
    pub(crate) tags: Vec<u64>,
}

#[derive(Args)]
pub(crate) struct GroupUploadArgs {
    #[arg(help = "Group identifier")]
    pub(crate) group_id: u64,
    #[arg(help = "Files to upload", required = true)]
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Args)]
pub(crate) struct DeleteArgs {
    #[arg(help = "File identifier")]
    pub(crate) file_id: u64,
    #[arg(long, help = "Display name used in the confirmation prompt")]
    pub(crate) name: Option<String>,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Args)]
pub(crate) struct TagsGetArgs {
    #[arg(help = "File identifier")]
    pub(crate) file_id: u64,
}

#[derive(Args)]
pub(crate) struct TagsSetArgs {
    #[arg(help = "File identifier")]
    pub(crate) file_id: u64,
    #[arg(long = "tag", help = "Tag id to keep or add; repeatable. Omit to clear")]
    pub(crate) tags: Vec<u64>,
}

#[derive(Args)]
pub(crate) struct UserDeleteArgs {
    #[arg(help = "User identifier")]
    pub(crate) user_id: u64,
    #[arg(long, help = "Display name used in the confirmation prompt")]
    pub(crate) username: Option<String>,
    #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
    pub(crate) yes: bool,
}

#[derive(Args)]
pub(crate) struct StorageCheckArgs {
    #[arg(
        help = "Storage usage percentage",
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub(crate) percent: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Upload(_) => "upload",
        Command::GroupUpload(_) => "group_upload",
        Command::Delete(_) => "delete",
        Command::Tags(TagsCommand::Get(_)) => "tags_get",
        Command::Tags(TagsCommand::Set(_)) => "tags_set",
        Command::Users(UsersCommand::Delete(_)) => "users_delete",
        Command::StorageCheck(_) => "storage_check",
    }
}
