// Discharge episode detection
use super::power::Sample;
use serde::Serialize;

/// How the latest discharge episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndReason {
    /// Battery percent dropped to or below the threshold.
    Threshold,
    /// External power returned.
    Plugged { plug_epoch: i64 },
    /// Still on battery at the end of the window.
    Ongoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DischargeEpisode {
    pub start_epoch: i64,
    pub start_percent: Option<u8>,
    pub end_epoch: i64,
    pub end_percent: Option<u8>,
    pub end_reason: EndReason,
    pub duration_seconds: i64,
    /// Lowest percent observed between unplug and the end of the episode.
    pub min_percent: Option<u8>,
    pub last_epoch: i64,
    pub last_percent: Option<u8>,
}

impl DischargeEpisode {
    pub fn plug_epoch(&self) -> Option<i64> {
        match self.end_reason {
            EndReason::Plugged { plug_epoch } => Some(plug_epoch),
            _ => None,
        }
    }
}

/// Why no episode could be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inconclusive {
    NoSamples,
    /// Battery-only samples exist but no 1 -> 0 transition is in the window.
    StuckOnBattery,
    NoUnplugEvent,
}

impl Inconclusive {
    pub fn message(&self) -> &'static str {
        match self {
            Inconclusive::NoSamples => "no samples",
            Inconclusive::StuckOnBattery => {
                "stuck on battery or no transition in window, widen window"
            }
            Inconclusive::NoUnplugEvent => "no unplug event observed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DischargeReport {
    Episode(DischargeEpisode),
    Inconclusive { reason: Inconclusive },
}

impl DischargeReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, DischargeReport::Episode(_))
    }

    pub fn episode(&self) -> Option<&DischargeEpisode> {
        match self {
            DischargeReport::Episode(episode) => Some(episode),
            DischargeReport::Inconclusive { .. } => None,
        }
    }
}

/// Find the most recent unplug event and classify how it ended.
pub fn analyze(samples: &[Sample], threshold_percent: u8) -> DischargeReport {
    let threshold = threshold_percent.min(100);

    if samples.is_empty() {
        return DischargeReport::Inconclusive {
            reason: Inconclusive::NoSamples,
        };
    }

    // Keep scanning after a match: the latest unplug wins.
    let mut previous_vbus: Option<bool> = None;
    let mut unplug_index: Option<usize> = None;
    for i in 0..samples.len() {
        if let Some(vbus) = samples[i].vbus_good {
            if previous_vbus == Some(true) && !vbus {
                unplug_index = Some(i);
            }
            previous_vbus = Some(vbus);
        }
    }

    let Some(start) = unplug_index else {
        let reason = if samples.iter().any(|s| s.vbus_good == Some(false)) {
            Inconclusive::StuckOnBattery
        } else {
            Inconclusive::NoUnplugEvent
        };
        return DischargeReport::Inconclusive { reason };
    };

    let last = samples[samples.len() - 1];
    let last_percent = samples.iter().rev().find_map(|s| s.battery_percent);

    let unplug = samples[start];
    let mut min_percent: Option<u8> = None;
    let mut end: Option<(i64, Option<u8>, EndReason)> = None;

    for j in start..samples.len() {
        let sample = samples[j];

        if j > start && sample.vbus_good == Some(true) {
            end = Some((
                sample.sample_epoch,
                sample.battery_percent,
                EndReason::Plugged {
                    plug_epoch: sample.sample_epoch,
                },
            ));
            break;
        }

        if let Some(percent) = sample.battery_percent {
            min_percent = Some(min_percent.map_or(percent, |m| m.min(percent)));
            if percent <= threshold {
                end = Some((sample.sample_epoch, Some(percent), EndReason::Threshold));
                break;
            }
        }
    }

    let (end_epoch, end_percent, end_reason) =
        end.unwrap_or((last.sample_epoch, last_percent, EndReason::Ongoing));

    DischargeReport::Episode(DischargeEpisode {
        start_epoch: unplug.sample_epoch,
        start_percent: unplug.battery_percent,
        end_epoch,
        end_percent,
        end_reason,
        duration_seconds: (end_epoch - unplug.sample_epoch).max(0),
        min_percent,
        last_epoch: last.sample_epoch,
        last_percent,
    })
}
