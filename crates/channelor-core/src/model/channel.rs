// ── Zigbee channel domain types ──

use serde::{Deserialize, Serialize};

use super::observation::NetworkObservation;

pub const FIRST_CHANNEL: u8 = 11;
pub const LAST_CHANNEL: u8 = 26;
pub const CHANNEL_COUNT: usize = 16;

/// Channels recommended by the Zigbee Light Link profile.
pub const ZLL_CHANNELS: [u8; 4] = [11, 15, 20, 25];

/// Channel 26 is quiet but restricted in transmit power and device support.
pub const WARNING_CHANNEL: u8 = 26;

/// Channel 11 sits underneath Wi-Fi channel 1.
const CROWDED_CHANNEL: u8 = 11;

/// A fixed IEEE 802.15.4 channel in the 2.4 GHz band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZigbeeChannel {
    pub number: u8,
    pub center_frequency_mhz: i32,
}

impl ZigbeeChannel {
    /// `2405 + 5 * (number - 11)` MHz.
    #[allow(clippy::as_conversions)]
    pub const fn new(number: u8) -> Self {
        Self {
            number,
            center_frequency_mhz: 2405 + 5 * (number as i32 - FIRST_CHANNEL as i32),
        }
    }

    pub fn lookup(number: u8) -> Option<Self> {
        ZIGBEE_CHANNELS.iter().copied().find(|c| c.number == number)
    }

    pub fn is_zll_recommended(self) -> bool {
        ZLL_CHANNELS.contains(&self.number)
    }

    pub fn is_warning(self) -> bool {
        self.number == WARNING_CHANNEL
    }

    /// Static pros for this channel; independent of any scan.
    pub fn pros(self) -> Vec<ChannelTag> {
        let mut pros = Vec::new();
        if self.is_zll_recommended() {
            pros.push(ChannelTag::ZllRecommended);
        }
        if self.number == WARNING_CHANNEL {
            pros.push(ChannelTag::LowWifiInterference);
        }
        pros
    }

    /// Static cons for this channel. Channel-specific tags come first.
    pub fn cons(self) -> Vec<ChannelTag> {
        let mut cons = Vec::new();
        match self.number {
            CROWDED_CHANNEL => cons.push(ChannelTag::FrequentlyCongested),
            WARNING_CHANNEL => {
                cons.push(ChannelTag::LowTransmitPower);
                cons.push(ChannelTag::PoorDeviceSupport);
            }
            _ => {}
        }
        if !self.is_zll_recommended() {
            cons.push(ChannelTag::NonStandard);
            cons.push(ChannelTag::CompatibilityRisk);
        }
        cons
    }
}

/// The whole channel universe, ascending by channel number.
pub const ZIGBEE_CHANNELS: [ZigbeeChannel; CHANNEL_COUNT] = channel_table();

#[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
const fn channel_table() -> [ZigbeeChannel; CHANNEL_COUNT] {
    let mut table = [ZigbeeChannel::new(FIRST_CHANNEL); CHANNEL_COUNT];
    let mut i = 0;
    while i < CHANNEL_COUNT {
        table[i] = ZigbeeChannel::new(FIRST_CHANNEL + i as u8);
        i += 1;
    }
    table
}

/// Static annotation attached to a channel as a pro or a con.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum ChannelTag {
    #[strum(to_string = "Zigbee Light Link (ZLL) recommended channel")]
    ZllRecommended,
    #[strum(to_string = "Little to no Wi-Fi interference")]
    LowWifiInterference,
    #[strum(to_string = "Lower transmission power allowed in some regions")]
    LowTransmitPower,
    #[strum(to_string = "Poor device support")]
    PoorDeviceSupport,
    #[strum(to_string = "Usually occupied by Wi-Fi (Channel 1)")]
    FrequentlyCongested,
    #[strum(to_string = "Not a standard ZLL channel")]
    NonStandard,
    #[strum(to_string = "Possible compatibility issues (Hue, IKEA, etc.)")]
    CompatibilityRisk,
}

/// Interference computed for one Zigbee channel from one scan snapshot.
///
/// Always rebuilt in full; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCongestion {
    pub channel_number: u8,
    pub center_frequency_mhz: i32,
    /// Summed linear power of every overlapping network. Unitless, `>= 0`.
    pub congestion_score: f64,
    pub is_zll_recommended: bool,
    pub is_warning_channel: bool,
    pub pros: Vec<ChannelTag>,
    pub cons: Vec<ChannelTag>,
    /// Overlapping networks in scan order.
    pub interfering_networks: Vec<NetworkObservation>,
    /// `congestion_score` in dB, for display only.
    pub congestion_dbm: Option<i32>,
}

impl ChannelCongestion {
    /// An interference-free entry for `channel`.
    pub fn quiet(channel: ZigbeeChannel) -> Self {
        Self {
            channel_number: channel.number,
            center_frequency_mhz: channel.center_frequency_mhz,
            congestion_score: 0.0,
            is_zll_recommended: channel.is_zll_recommended(),
            is_warning_channel: channel.is_warning(),
            pros: channel.pros(),
            cons: channel.cons(),
            interfering_networks: Vec::new(),
            congestion_dbm: None,
        }
    }

    /// Interferers ordered strongest first, for detail views.
    pub fn interferers_by_strength(&self) -> Vec<&NetworkObservation> {
        let mut sorted: Vec<_> = self.interfering_networks.iter().collect();
        sorted.sort_by(|a, b| b.signal_strength_dbm.cmp(&a.signal_strength_dbm));
        sorted
    }
}
