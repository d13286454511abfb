// Human-readable time formatting for summaries and axis labels
use chrono::{DateTime, FixedOffset, Offset, Utc};

fn to_local(epoch: i64, utc_offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix());
    DateTime::<Utc>::from_timestamp(epoch, 0).map(|t| t.with_timezone(&offset))
}

/// Full timestamp, e.g. `2024-03-01 14:05`.
pub fn format_epoch(epoch: i64, utc_offset_minutes: i32) -> String {
    match to_local(epoch, utc_offset_minutes) {
        Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Compact timestamp for chart axes, e.g. `03-01 14:05`.
pub fn format_axis_time(epoch: i64, utc_offset_minutes: i32) -> String {
    match to_local(epoch, utc_offset_minutes) {
        Some(t) => t.format("%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// `45s`, `12m`, `3h`, `3h 20m`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    if rest == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(-5), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(720), "12m");
        assert_eq!(format_duration(3 * 3600), "3h");
        assert_eq!(format_duration(3 * 3600 + 20 * 60 + 7), "3h 20m");
        assert_eq!(format_duration(50 * 3600), "50h");
    }

    #[test]
    fn test_format_epoch_with_offset() {
        // 2024-03-01T00:00:00Z
        let epoch = 1_709_251_200;
        assert_eq!(format_epoch(epoch, 0), "2024-03-01 00:00");
        assert_eq!(format_epoch(epoch, 480), "2024-03-01 08:00");
        assert_eq!(format_axis_time(epoch, -60), "02-29 23:00");
    }
}
