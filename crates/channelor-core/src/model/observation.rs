// ── Wi-Fi observation domain type ──

use serde::{Deserialize, Serialize};

/// Lowest frequency (MHz) of the 2.4 GHz ISM band the scanner reports.
pub const BAND_24GHZ_START_MHZ: i32 = 2400;
/// Highest frequency (MHz) of the 2.4 GHz ISM band the scanner reports.
pub const BAND_24GHZ_END_MHZ: i32 = 2484;

/// One access point seen during a single scan.
///
/// Produced by the scanning collaborator; each scan yields a fresh list and
/// nothing ties an observation to one from a previous scan. The serde aliases
/// accept the field names platform scanners use (`ssid`, `frequency`,
/// `rssi`/`level`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkObservation {
    #[serde(alias = "ssid")]
    pub identifier: String,
    #[serde(alias = "frequency", alias = "center_frequency")]
    pub center_frequency_mhz: i32,
    #[serde(alias = "rssi", alias = "level")]
    pub signal_strength_dbm: i32,
}

impl NetworkObservation {
    pub fn new(identifier: impl Into<String>, center_frequency_mhz: i32, signal_strength_dbm: i32) -> Self {
        Self {
            identifier: identifier.into(),
            center_frequency_mhz,
            signal_strength_dbm,
        }
    }

    /// Whether the access point sits in the 2.4 GHz band.
    pub fn is_24ghz(&self) -> bool {
        (BAND_24GHZ_START_MHZ..=BAND_24GHZ_END_MHZ).contains(&self.center_frequency_mhz)
    }
}

/// Drop every observation outside the 2.4 GHz band, keeping scan order.
pub fn retain_24ghz(mut observations: Vec<NetworkObservation>) -> Vec<NetworkObservation> {
    observations.retain(NetworkObservation::is_24ghz);
    observations
}
