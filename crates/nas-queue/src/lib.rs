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

//! Bounded upload queue.
//!
//! Files are appended in selection order and drained through a
//! [`TransferClient`](nas_transfer::TransferClient) under a concurrency cap.
//! Each terminal outcome frees a slot that is refilled immediately from the
//! queue head (sliding window, not batches).
//!
//! Layout: `admission.rs` (pure slot accounting), `event.rs` (published
//! lifecycle events), `worker.rs` (async driver and the `UploadQueue`
//! handle), `config.rs`, `error.rs`.

pub mod admission;
pub mod config;
pub mod error;
pub mod event;
pub mod worker;

pub use admission::{Admission, DrainSummary, PendingTransfer, TransferStatus};
pub use config::QueueConfig;
pub use error::{QueueError, QueueResult};
pub use event::{QueueEvent, TransferId};
pub use worker::UploadQueue;
