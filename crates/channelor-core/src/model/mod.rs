// ── Domain model ──
//
// Value types shared by the scoring model, the recommendation selector,
// and the pipeline. All are plain data: cloneable, serde-ready, immutable
// once built.

pub mod channel;
pub mod observation;

pub use channel::{
    CHANNEL_COUNT, ChannelCongestion, ChannelTag, FIRST_CHANNEL, LAST_CHANNEL, WARNING_CHANNEL,
    ZIGBEE_CHANNELS, ZLL_CHANNELS, ZigbeeChannel,
};
pub use observation::{BAND_24GHZ_END_MHZ, BAND_24GHZ_START_MHZ, NetworkObservation, retain_24ghz};
