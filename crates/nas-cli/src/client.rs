//! Shared transfer client, error types and confirmation prompts for the CLI.

use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use nas_queue::QueueConfig;
use nas_transfer::{HttpTransferClient, TransferConfig, TransferError};
use url::Url;

use crate::cli::{Cli, OutputFormat};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }

    /// Classify a transfer failure. Local pre-flight problems and client-side
    /// rejections are validation errors; everything else is operational.
    pub(crate) fn from_transfer(err: &TransferError) -> Self {
        match err {
            TransferError::Io { .. }
            | TransferError::InvalidInput { .. }
            | TransferError::Endpoint { .. } => Self::validation(err.user_message()),
            TransferError::Rejected {
                status: 400 | 409 | 413 | 415 | 422,
                ..
            } => Self::validation(err.user_message()),
            _ => Self::failure(anyhow!(err.user_message())),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Dependencies constructed from environment flags and CLI options.
pub(crate) struct CliDependencies {
    pub(crate) client: Arc<HttpTransferClient>,
    pub(crate) queue: QueueConfig,
}

impl CliDependencies {
    /// Construct the transfer client and queue settings.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let config = TransferConfig::new(cli.url.clone())
            .with_request_timeout(Duration::from_secs(cli.timeout))
            .with_upload_timeout(Duration::from_secs(cli.upload_timeout))
            .with_request_id(trace_id);
        let client = HttpTransferClient::new(config).map_err(|err| {
            CliError::failure(anyhow!("failed to build HTTP client: {}", err.user_message()))
        })?;
        let queue = QueueConfig::new(cli.concurrency)
            .map_err(|_| CliError::validation("--concurrency must be at least 1"))?;
        Ok(Self {
            client: Arc::new(client),
            queue,
        })
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Arc<HttpTransferClient>,
    pub(crate) queue: QueueConfig,
    pub(crate) output: OutputFormat,
}

/// Parse the server URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Ask for confirmation unless `assume_yes` is set.
///
/// Refuses to act when stdin is not a terminal, so scripted runs must pass
/// `--yes` explicitly.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> CliResult<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(CliError::validation(
            "confirmation required; pass --yes when stdin is not a terminal",
        ));
    }
    eprint!("{prompt} [y/N] ");
    io::stderr()
        .flush()
        .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(|err| CliError::failure(anyhow!("failed to read confirmation: {err}")))?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
