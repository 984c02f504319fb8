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

//! Pure view controllers for the NAS client.
//!
//! Nothing here touches a terminal, a DOM or the network. Controllers take
//! user intents and transfer outcomes and return render instructions that a
//! front end applies; that keeps every flow testable without a renderer.

pub mod format;
pub mod notify;
pub mod progress;
pub mod views;

pub use format::{format_file_size, format_time};
pub use notify::{
    AUTO_DISMISS, Notification, NotificationCenter, NotificationInstruction, NotificationKind,
    NotificationSink, StorageWarning, storage_warning,
};
pub use progress::{ProgressReadout, RateEstimate};
