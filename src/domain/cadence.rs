// Sampling cadence estimate
use super::power::Sample;

/// Gaps this long are treated as clock rollover or a long offline period.
const MAX_GAP_SECONDS: i64 = 365 * 24 * 3600;

/// Estimate the typical interval between consecutive samples.
///
/// Uses the lower median of the positive gaps, so a device that slept for
/// days does not skew the hint. Returns `None` when no usable gap exists.
pub fn estimate(samples: &[Sample]) -> Option<i64> {
    let mut gaps: Vec<i64> = samples
        .windows(2)
        .map(|pair| pair[1].sample_epoch - pair[0].sample_epoch)
        .filter(|gap| *gap > 0 && *gap < MAX_GAP_SECONDS)
        .collect();

    if gaps.is_empty() {
        return None;
    }

    gaps.sort_unstable();
    Some(gaps[gaps.len() / 2])
}
