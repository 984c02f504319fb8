//! `TransferClient` seam and its reqwest-backed implementation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, StatusCode, Url};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use crate::config::TransferConfig;
use crate::endpoints::{self, HEADER_REQUEST_ID, HEADER_REQUESTED_WITH, REQUESTED_WITH_XHR};
use crate::error::{Operation, TransferError, TransferResult};
use crate::model::{
    Acknowledgement, FileHandle, FileId, ProgressSample, ProgressSink, TagId, UploadTarget, UserId,
};
use crate::preflight::validate_upload;
use crate::response::{interpret_message, interpret_status, interpret_tags};

/// One request per file operation against the NAS server.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Upload `file` to `target`, reporting byte progress to `progress`.
    async fn upload(
        &self,
        file: &FileHandle,
        target: &UploadTarget,
        progress: ProgressSink,
    ) -> TransferResult<Acknowledgement>;

    /// Delete a stored file.
    async fn delete_resource(&self, id: FileId) -> TransferResult<Acknowledgement>;

    /// Fetch the tag ids currently applied to a file.
    async fn fetch_tags(&self, id: FileId) -> TransferResult<Vec<TagId>>;

    /// Replace the tags applied to a file.
    async fn update_tags(&self, id: FileId, tags: &BTreeSet<TagId>)
    -> TransferResult<Acknowledgement>;

    /// Delete a user account.
    async fn delete_user(&self, id: UserId) -> TransferResult<Acknowledgement>;
}

/// [`TransferClient`] speaking HTTP via `reqwest`.
#[derive(Clone)]
pub struct HttpTransferClient {
    client: Client,
    config: TransferConfig,
}

impl HttpTransferClient {
    /// Build a client with the programmatic-request marker and optional
    /// correlation id installed as default headers.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidInput`] when the request id is not a
    /// valid header value, or [`TransferError::ClientBuild`] when `reqwest`
    /// cannot construct the client.
    pub fn new(config: TransferConfig) -> TransferResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HEADER_REQUESTED_WITH,
            HeaderValue::from_static(REQUESTED_WITH_XHR),
        );
        if let Some(request_id) = &config.request_id {
            let value =
                HeaderValue::from_str(request_id).map_err(|_| TransferError::InvalidInput {
                    field: "request_id",
                    reason: "request identifier contains invalid characters",
                    value: Some(request_id.clone()),
                })?;
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| TransferError::ClientBuild { source })?;

        Ok(Self { client, config })
    }

    /// Configuration the client was built with.
    #[must_use]
    pub const fn config(&self) -> &TransferConfig {
        &self.config
    }

    fn url(&self, path: &str) -> TransferResult<Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|source| TransferError::Endpoint {
                path: path.to_string(),
                source,
            })
    }

    async fn read_body(
        operation: Operation,
        response: Response,
    ) -> TransferResult<(StatusCode, Vec<u8>)> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransferError::from_transport(operation, source))?;
        debug!(
            operation = operation.label(),
            status = status.as_u16(),
            bytes = bytes.len(),
            "server response received"
        );
        Ok((status, bytes.to_vec()))
    }

    async fn file_part(
        file: &FileHandle,
        operation: Operation,
        progress: ProgressSink,
    ) -> TransferResult<Part> {
        let handle = tokio::fs::File::open(&file.path)
            .await
            .map_err(|source| TransferError::Io {
                operation,
                path: file.path.clone(),
                source,
            })?;
        let total = file.size;
        let mut transferred = 0_u64;
        let stream = ReaderStream::new(handle).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                transferred = transferred.saturating_add(bytes.len() as u64);
                progress(ProgressSample { transferred, total });
            }
            chunk
        });
        Ok(Part::stream_with_length(Body::wrap_stream(stream), total).file_name(file.name.clone()))
    }
}

#[async_trait]
impl TransferClient for HttpTransferClient {
    async fn upload(
        &self,
        file: &FileHandle,
        target: &UploadTarget,
        progress: ProgressSink,
    ) -> TransferResult<Acknowledgement> {
        let operation = target.operation();
        validate_upload(file)?;

        let path = match target {
            UploadTarget::Files { .. } => endpoints::FILE_UPLOAD,
            UploadTarget::Group { .. } => endpoints::GROUP_UPLOAD,
        };
        let url = self.url(path)?;

        let part = Self::file_part(file, operation, progress).await?;
        let mut form = Form::new().part("file", part);
        match target {
            UploadTarget::Files { category, tags } => {
                form = form.text("category", category.clone());
                for tag in tags {
                    form = form.text("tags", tag.to_string());
                }
            }
            UploadTarget::Group { group_id } => {
                form = form.text("group_id", group_id.to_string());
            }
        }

        info!(
            operation = operation.label(),
            file = %file.name,
            size = file.size,
            "starting upload"
        );
        let response = self
            .client
            .post(url)
            .timeout(self.config.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|source| TransferError::from_transport(operation, source))?;
        let (status, body) = Self::read_body(operation, response).await?;

        let outcome = match target {
            UploadTarget::Files { .. } => interpret_message(operation, status, &body),
            UploadTarget::Group { .. } => interpret_status(operation, status, &body),
        };
        if let Err(err) = &outcome {
            warn!(
                operation = operation.label(),
                file = %file.name,
                error = %err.user_message(),
                "upload failed"
            );
        }
        outcome
    }

    async fn delete_resource(&self, id: FileId) -> TransferResult<Acknowledgement> {
        let operation = Operation::Delete;
        let url = self.url(&endpoints::delete_file(id))?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|source| TransferError::from_transport(operation, source))?;
        let (status, body) = Self::read_body(operation, response).await?;
        interpret_message(operation, status, &body)
    }

    async fn fetch_tags(&self, id: FileId) -> TransferResult<Vec<TagId>> {
        let operation = Operation::FetchTags;
        let url = self.url(&endpoints::file_tags(id))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| TransferError::from_transport(operation, source))?;
        let (status, body) = Self::read_body(operation, response).await?;
        interpret_tags(status, &body)
    }

    async fn update_tags(
        &self,
        id: FileId,
        tags: &BTreeSet<TagId>,
    ) -> TransferResult<Acknowledgement> {
        let operation = Operation::UpdateTags;
        let url = self.url(&endpoints::tag_file(id))?;
        let form = tags
            .iter()
            .fold(Form::new(), |form, tag| form.text("tags", tag.to_string()));
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| TransferError::from_transport(operation, source))?;
        let (status, body) = Self::read_body(operation, response).await?;
        interpret_message(operation, status, &body)
    }

    async fn delete_user(&self, id: UserId) -> TransferResult<Acknowledgement> {
        let operation = Operation::DeleteUser;
        let url = self.url(&endpoints::delete_user(id))?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|source| TransferError::from_transport(operation, source))?;
        let (status, body) = Self::read_body(operation, response).await?;
        interpret_message(operation, status, &body)
    }
}
