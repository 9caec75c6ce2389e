// ── Congestion model ──
//
// Maps one Wi-Fi scan snapshot onto the fixed Zigbee channel universe.
// Pure and synchronous: no shared state, safe from any thread.

use tracing::trace;

use crate::error::CoreError;
use crate::model::{
    CHANNEL_COUNT, ChannelCongestion, NetworkObservation, ZIGBEE_CHANNELS, ZigbeeChannel,
};

/// Approximate spectral width of a 20 MHz 2.4 GHz Wi-Fi channel.
pub const WIFI_BANDWIDTH_MHZ: f64 = 22.0;

/// Extra margin for the Zigbee channel's own width.
pub const ZIGBEE_WIDTH_SAFETY_MHZ: f64 = 2.0;

/// Clamp range for reported signal strengths. Scanners occasionally emit
/// garbage; a clamped value keeps every power term finite.
pub const MIN_SIGNAL_DBM: i32 = -127;
pub const MAX_SIGNAL_DBM: i32 = 20;

/// Half-width of the window in which a Wi-Fi network counts as interfering.
pub fn overlap_window_mhz() -> f64 {
    WIFI_BANDWIDTH_MHZ / 2.0 + ZIGBEE_WIDTH_SAFETY_MHZ
}

/// Whether `observation` overlaps `channel`. Binary: no distance falloff.
pub fn interferes(channel: ZigbeeChannel, observation: &NetworkObservation) -> bool {
    let distance = observation
        .center_frequency_mhz
        .abs_diff(channel.center_frequency_mhz);
    f64::from(distance) < overlap_window_mhz()
}

/// Linear power (proportional to mW) of a dBm reading.
pub fn linear_power(signal_strength_dbm: i32) -> f64 {
    let clamped = signal_strength_dbm.clamp(MIN_SIGNAL_DBM, MAX_SIGNAL_DBM);
    10f64.powf(f64::from(clamped) / 10.0)
}

/// Score every Zigbee channel against `observations`.
///
/// Always returns 16 entries in ascending channel order, including for an
/// empty scan. Duplicate identifiers are scored independently.
pub fn score_channels(observations: &[NetworkObservation]) -> Vec<ChannelCongestion> {
    ZIGBEE_CHANNELS
        .iter()
        .map(|&channel| score_channel(channel, observations))
        .collect()
}

fn score_channel(channel: ZigbeeChannel, observations: &[NetworkObservation]) -> ChannelCongestion {
    let mut entry = ChannelCongestion::quiet(channel);

    for observation in observations.iter().filter(|o| interferes(channel, o)) {
        entry.congestion_score += linear_power(observation.signal_strength_dbm);
        entry.interfering_networks.push(observation.clone());
    }
    entry.congestion_dbm = to_dbm(entry.congestion_score);

    trace!(
        channel = channel.number,
        score = entry.congestion_score,
        interferers = entry.interfering_networks.len(),
        "scored channel"
    );
    entry
}

#[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
fn to_dbm(score: f64) -> Option<i32> {
    (score > 0.0).then(|| (10.0 * score.log10()).round() as i32)
}

/// Check that a scored list honours the channel universe: one entry per
/// channel, ascending, with at least one ZLL channel.
pub fn check_channel_plan(scored: &[ChannelCongestion]) -> Result<(), CoreError> {
    if scored.len() != CHANNEL_COUNT {
        return Err(CoreError::InvalidChannelPlan {
            reason: format!("expected {CHANNEL_COUNT} channels, got {}", scored.len()),
        });
    }
    for (entry, channel) in scored.iter().zip(ZIGBEE_CHANNELS.iter()) {
        if entry.channel_number != channel.number {
            return Err(CoreError::InvalidChannelPlan {
                reason: format!(
                    "channel {} found where {} was expected",
                    entry.channel_number, channel.number
                ),
            });
        }
        if !(entry.congestion_score.is_finite() && entry.congestion_score >= 0.0) {
            return Err(CoreError::InvalidChannelPlan {
                reason: format!("channel {} has score {}", entry.channel_number, entry.congestion_score),
            });
        }
    }
    if !scored.iter().any(|c| c.is_zll_recommended) {
        return Err(CoreError::InvalidChannelPlan {
            reason: "no ZLL-recommended channel".into(),
        });
    }
    Ok(())
}
