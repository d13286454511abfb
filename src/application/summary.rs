// One-line narrative for the power panel
use crate::domain::discharge::{DischargeReport, EndReason};
use crate::domain::format::{format_duration, format_epoch};

fn percent(value: Option<u8>) -> String {
    match value {
        Some(p) => format!("{}%", p),
        None => "?%".to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn cadence_text(cadence_seconds: Option<i64>) -> String {
    match cadence_seconds {
        Some(seconds) => format!("cadence ~{}", format_duration(seconds)),
        None => "cadence unknown".to_string(),
    }
}

pub fn build_summary(
    report: &DischargeReport,
    cadence_seconds: Option<i64>,
    threshold_percent: u8,
    utc_offset_minutes: i32,
) -> String {
    let cadence = cadence_text(cadence_seconds);
    let at = |epoch: i64| format_epoch(epoch, utc_offset_minutes);

    let episode = match report {
        DischargeReport::Episode(episode) => episode,
        DischargeReport::Inconclusive { reason } => {
            return format!("{} ({}).", capitalize(reason.message()), cadence);
        }
    };

    let duration = format_duration(episode.duration_seconds);
    match episode.end_reason {
        EndReason::Threshold => format!(
            "Unplugged {} at {}, reached {} (threshold {}%) at {} after {}; min {} ({}).",
            at(episode.start_epoch),
            percent(episode.start_percent),
            percent(episode.end_percent),
            threshold_percent,
            at(episode.end_epoch),
            duration,
            percent(episode.min_percent),
            cadence,
        ),
        EndReason::Plugged { plug_epoch } => format!(
            "Unplugged {} at {}, plugged back in {} after {}; min {} ({}).",
            at(episode.start_epoch),
            percent(episode.start_percent),
            at(plug_epoch),
            duration,
            percent(episode.min_percent),
            cadence,
        ),
        EndReason::Ongoing => format!(
            "On battery since {} ({}) for {} so far; latest {} at {}, min {} ({}).",
            at(episode.start_epoch),
            percent(episode.start_percent),
            duration,
            percent(episode.last_percent),
            at(episode.last_epoch),
            percent(episode.min_percent),
            cadence,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discharge::analyze;
    use crate::domain::power::Sample;

    fn series() -> Vec<Sample> {
        vec![
            Sample::new(1_709_251_200).with_percent(Some(80)).with_vbus(Some(true)),
            Sample::new(1_709_254_800).with_percent(Some(80)).with_vbus(Some(false)),
            Sample::new(1_709_258_400).with_percent(Some(40)).with_vbus(Some(false)),
            Sample::new(1_709_262_000).with_percent(Some(9)).with_vbus(Some(false)),
        ]
    }

    #[test]
    fn test_threshold_summary() {
        let report = analyze(&series(), 10);
        let text = build_summary(&report, Some(3600), 10, 0);

        assert!(text.starts_with("Unplugged 2024-03-01 01:00 at 80%"));
        assert!(text.contains("reached 9% (threshold 10%)"));
        assert!(text.contains("after 2h"));
        assert!(text.contains("cadence ~1h"));
    }

    #[test]
    fn test_ongoing_summary() {
        let report = analyze(&series(), 5);
        let text = build_summary(&report, None, 5, 0);

        assert!(text.starts_with("On battery since 2024-03-01 01:00 (80%)"));
        assert!(text.contains("latest 9% at 2024-03-01 03:00"));
        assert!(text.contains("cadence unknown"));
    }

    #[test]
    fn test_plugged_summary() {
        let mut samples = series();
        samples[3] = Sample::new(1_709_262_000).with_vbus(Some(true));
        let report = analyze(&samples, 10);
        let text = build_summary(&report, Some(3600), 10, 0);

        assert!(text.contains("plugged back in 2024-03-01 03:00 after 2h"));
        assert!(text.contains("min 40%"));
    }

    #[test]
    fn test_inconclusive_summaries() {
        let battery_only = vec![Sample::new(100).with_vbus(Some(false))];
        let text = build_summary(&analyze(&battery_only, 10), None, 10, 0);
        assert!(text.contains("widen window"));

        let unknown = vec![Sample::new(100).with_percent(Some(50))];
        let text = build_summary(&analyze(&unknown, 10), None, 10, 0);
        assert!(text.starts_with("No unplug event observed"));

        let text = build_summary(&analyze(&[], 10), None, 10, 0);
        assert_eq!(text, "No samples (cadence unknown).");
    }
}
