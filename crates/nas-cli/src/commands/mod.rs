//! Command handlers grouped by concern.

pub(crate) mod files;
pub(crate) mod groups;
pub(crate) mod storage;
pub(crate) mod tags;
pub(crate) mod transfers;
pub(crate) mod users;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use httpmock::MockServer;
    use nas_queue::QueueConfig;
    use nas_transfer::{HttpTransferClient, TransferConfig};
    use url::Url;

    use crate::cli::OutputFormat;
    use crate::client::AppContext;

    pub(crate) fn context_for(server: &MockServer) -> AppContext {
        context_at(server.base_url().parse().expect("valid URL"))
    }

    pub(crate) fn context_at(base: Url) -> AppContext {
        let config = TransferConfig::new(base).with_request_id("trace-test");
        AppContext {
            client: Arc::new(HttpTransferClient::new(config).expect("client builds")),
            queue: QueueConfig::default(),
            output: OutputFormat::Json,
        }
    }
}
