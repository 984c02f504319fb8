//! Human-friendly formatting for sizes, rates and durations.

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const STEP: f64 = 1024.0;

/// Format a byte quantity in 1024-based units with up to two decimals.
///
/// Trailing zeros are dropped, so 1536 bytes render as `1.5 KB` and 1024 as
/// `1 KB`. Zero, negative and non-finite inputs render as `0 Bytes`.
#[must_use]
pub fn format_file_size(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes;
    let mut unit = 0;
    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }
    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// [`format_file_size`] for integral byte counts.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    format_file_size(bytes as f64)
}

/// Transfer speed such as `2.5 MB/s`.
#[must_use]
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_file_size(bytes_per_sec))
}

/// Format a duration in seconds as `1h 2m 3s`, rounding up to whole seconds.
///
/// Hours are omitted when zero; minutes are omitted only when hours are too.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.ceil() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_scale_through_units() {
        assert_eq!(format_file_size(0.0), "0 Bytes");
        assert_eq!(format_file_size(512.0), "512 Bytes");
        assert_eq!(format_file_size(1024.0), "1 KB");
        assert_eq!(format_file_size(1536.0), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 1024 * 256), "5.25 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(format_bytes(2048 * 1024 * 1024 * 1024 * 1024), "2048 TB");
    }

    #[test]
    fn sizes_ignore_nonsense_inputs() {
        assert_eq!(format_file_size(-4.0), "0 Bytes");
        assert_eq!(format_file_size(f64::NAN), "0 Bytes");
        assert_eq!(format_file_size(f64::INFINITY), "0 Bytes");
    }

    #[test]
    fn rate_appends_per_second() {
        assert_eq!(format_rate(2048.0), "2 KB/s");
    }

    #[test]
    fn time_omits_empty_leading_units() {
        assert_eq!(format_time(0.0), "0s");
        assert_eq!(format_time(4.2), "5s");
        assert_eq!(format_time(61.0), "1m 1s");
        assert_eq!(format_time(3723.0), "1h 2m 3s");
        assert_eq!(format_time(3600.0), "1h 0m 0s");
        assert_eq!(format_time(f64::INFINITY), "0s");
    }
}
