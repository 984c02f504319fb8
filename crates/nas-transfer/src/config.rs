//! Transfer client configuration.

use std::time::Duration;

use url::Url;

/// Default timeout for metadata calls (delete, tags, user management).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for uploads, which may stream large files.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);
/// Default server location.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Settings used to build an [`HttpTransferClient`](crate::HttpTransferClient).
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Root URL of the NAS web application.
    pub base_url: Url,
    /// Timeout applied to short metadata requests.
    pub request_timeout: Duration,
    /// Timeout applied to uploads.
    pub upload_timeout: Duration,
    /// Optional correlation id sent as `x-request-id`.
    pub request_id: Option<String>,
}

impl TransferConfig {
    /// Configuration for `base_url` with default timeouts.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            request_id: None,
        }
    }

    /// Override the metadata request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the upload timeout.
    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Attach a correlation id to every request.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
