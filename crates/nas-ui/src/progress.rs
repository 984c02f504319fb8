//! Rate and time-remaining estimates derived from progress samples.

use std::time::Duration;

use nas_transfer::ProgressSample;
use serde::Serialize;

use crate::format::{format_bytes, format_rate, format_time};

/// Average throughput since the transfer started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    /// Mean bytes per second.
    pub bytes_per_sec: f64,
    /// Estimated time until completion; `None` while nothing has moved.
    pub remaining: Option<Duration>,
}

impl RateEstimate {
    /// Estimate from a sample and the time elapsed since the upload began.
    ///
    /// Returns `None` when no time has elapsed, so the first sample never
    /// divides by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn derive(sample: ProgressSample, elapsed: Duration) -> Option<Self> {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }
        let bytes_per_sec = sample.transferred as f64 / secs;
        let remaining = (bytes_per_sec > 0.0)
            .then(|| {
                let left = sample.total.saturating_sub(sample.transferred) as f64;
                Duration::try_from_secs_f64(left / bytes_per_sec).ok()
            })
            .flatten();
        Some(Self {
            bytes_per_sec,
            remaining,
        })
    }
}

/// Display strings for a progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReadout {
    /// Whole percentage, `0..=100`.
    pub percent: u8,
    /// `transferred / total` in human units.
    pub size: String,
    /// Average speed; empty until a rate is known.
    pub speed: String,
    /// `Time remaining: ...`; empty until a rate is known.
    pub remaining: String,
}

impl ProgressReadout {
    /// Build the readout for a sample observed `elapsed` after start.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(sample: ProgressSample, elapsed: Duration) -> Self {
        let percent = (sample.fraction() * 100.0).round().clamp(0.0, 100.0) as u8;
        let size = format!(
            "{} / {}",
            format_bytes(sample.transferred),
            format_bytes(sample.total)
        );
        let (speed, remaining) = RateEstimate::derive(sample, elapsed).map_or_else(
            || (String::new(), String::new()),
            |estimate| {
                let remaining = estimate.remaining.map_or_else(String::new, |left| {
                    format!("Time remaining: {}", format_time(left.as_secs_f64()))
                });
                (format_rate(estimate.bytes_per_sec), remaining)
            },
        );
        Self {
            percent,
            size,
            speed,
            remaining,
        }
    }
}
