#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! HTTP transfer client for the NAS file endpoints.
//!
//! Each operation maps to exactly one request. Uploads stream the file from
//! disk and report byte-level progress; metadata calls return the parsed
//! acknowledgement or a classified [`TransferError`].
//!
//! Layout: `model.rs` (ids, file handles, targets), `config.rs`
//! (`TransferConfig`), `endpoints.rs` (fixed server paths), `preflight.rs`
//! (local validation before any request), `response.rs` (status/body
//! interpretation), `client.rs` (`TransferClient` + reqwest implementation).

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod model;
pub mod preflight;
pub mod response;

pub use client::{HttpTransferClient, TransferClient};
pub use config::TransferConfig;
pub use error::{Operation, TransferError, TransferResult};
pub use model::{
    Acknowledgement, FileHandle, FileId, GroupId, ProgressSample, ProgressSink, TagId,
    UploadTarget, UserId, noop_progress,
};
