//! Queue configuration.

use std::num::NonZeroUsize;

use crate::error::{QueueError, QueueResult};

/// Default number of simultaneously active uploads.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Settings for an [`UploadQueue`](crate::UploadQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Admission cap: maximum number of active transfers.
    pub concurrency: NonZeroUsize,
}

impl QueueConfig {
    /// Validate a raw concurrency value.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfig`] when `concurrency` is zero.
    pub fn new(concurrency: usize) -> QueueResult<Self> {
        NonZeroUsize::new(concurrency)
            .map(|concurrency| Self { concurrency })
            .ok_or(QueueError::InvalidConfig {
                field: "concurrency",
                reason: "must be at least 1",
            })
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: NonZeroUsize::MIN.saturating_add(DEFAULT_CONCURRENCY - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_is_three() {
        assert_eq!(QueueConfig::default().concurrency.get(), 3);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(matches!(
            QueueConfig::new(0),
            Err(QueueError::InvalidConfig {
                field: "concurrency",
                ..
            })
        ));
        assert_eq!(QueueConfig::new(5).map(|cfg| cfg.concurrency.get()), Ok(5));
    }
}
